use wgpu::util::DeviceExt;

use super::frame::{Color, Vertex};
use super::pipeline::as_bytes;
use crate::assets::{ImageData, Model};
use crate::error::AssetError;

/// Byte length of an RGBA8 texture, or an error when either side exceeds
/// `max_dimension`.
fn texture_byte_len(width: u32, height: u32, max_dimension: u32) -> Result<usize, AssetError> {
    let too_large = AssetError::TextureTooLarge {
        width,
        height,
        max: max_dimension,
    };
    if width > max_dimension || height > max_dimension {
        return Err(too_large);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(too_large)
}

/// Texture uploaded to the GPU together with its bind group.
#[derive(Debug)]
pub struct GpuTexture {
    _texture: wgpu::Texture,
    _view: wgpu::TextureView,
    pub(super) bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl GpuTexture {
    pub(super) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &ImageData,
        label: &str,
    ) -> Result<Self, AssetError> {
        let width = image.width.max(1);
        let height = image.height.max(1);
        let byte_len = texture_byte_len(width, height, device.limits().max_texture_dimension_2d)?;
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if image.pixels.len() == byte_len {
            queue.write_texture(
                texture.as_image_copy(),
                &image.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
                extent,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Ok(Self {
            _texture: texture,
            _view: view,
            bind_group,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug)]
pub(super) struct GpuMesh {
    pub(super) vertex_buffer: wgpu::Buffer,
    pub(super) index_buffer: wgpu::Buffer,
    pub(super) index_count: u32,
}

/// Model meshes uploaded as vertex/index buffers.
#[derive(Debug)]
pub struct GpuModel {
    pub(super) meshes: Vec<GpuMesh>,
}

impl GpuModel {
    pub(super) fn new(device: &wgpu::Device, model: &Model, label: &str) -> Self {
        let meshes = model
            .meshes
            .iter()
            .filter(|mesh| {
                let vertex_count = mesh.positions.len() as u32;
                !mesh.indices.is_empty() && mesh.indices.iter().all(|&index| index < vertex_count)
            })
            .map(|mesh| {
                let vertices: Vec<Vertex> = mesh
                    .positions
                    .iter()
                    .enumerate()
                    .map(|(index, &position)| Vertex::new(position, mesh.uv(index), Color::WHITE))
                    .collect();
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: as_bytes(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: as_bytes(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                }
            })
            .collect();
        Self { meshes }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_within_limit_has_rgba_length() {
        assert_eq!(texture_byte_len(96, 96, 8192).unwrap(), 96 * 96 * 4);
        assert_eq!(texture_byte_len(8192, 1, 8192).unwrap(), 8192 * 4);
    }

    #[test]
    fn oversized_texture_is_rejected() {
        let err = texture_byte_len(10_000, 10_000, 8192).unwrap_err();
        assert!(matches!(
            err,
            AssetError::TextureTooLarge {
                width: 10_000,
                height: 10_000,
                max: 8192
            }
        ));
        assert!(texture_byte_len(1, 8193, 8192).is_err());
    }

    #[test]
    fn byte_length_overflow_is_rejected() {
        assert!(texture_byte_len(u32::MAX, u32::MAX, u32::MAX).is_err());
    }
}
