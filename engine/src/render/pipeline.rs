use std::borrow::Cow;

use super::frame::Vertex;
use super::shapes::Topology;

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x4];

const VERTEX_LAYOUT: wgpu::VertexBufferLayout = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &VERTEX_ATTRIBUTES,
};

/// Types whose every byte is initialised: no padding, no niches.
///
/// Implementors must be `#[repr(C)]` (or primitive) and made only of `f32`
/// or `u32` fields.
pub(super) unsafe trait PlainData: Copy {}

unsafe impl PlainData for f32 {}
unsafe impl PlainData for u32 {}
// `#[repr(C)]` with nine `f32` fields.
unsafe impl PlainData for Vertex {}

const _: () = assert!(std::mem::size_of::<Vertex>() == 9 * std::mem::size_of::<f32>());

/// Views a slice as bytes for buffer uploads.
pub(super) fn as_bytes<T: PlainData>(data: &[T]) -> &[u8] {
    // SAFETY: `PlainData` types contain no padding, so all
    // `size_of_val(data)` bytes behind the pointer are initialised, and `u8`
    // has no alignment requirement. The lifetime is tied to `data`.
    unsafe { std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), std::mem::size_of_val(data)) }
}

/// Bind group layouts and the four pipelines built from the shared shader.
pub(super) struct Pipelines {
    pub(super) globals_layout: wgpu::BindGroupLayout,
    pub(super) texture_layout: wgpu::BindGroupLayout,
    world_triangles: wgpu::RenderPipeline,
    world_lines: wgpu::RenderPipeline,
    overlay_triangles: wgpu::RenderPipeline,
    overlay_lines: wgpu::RenderPipeline,
}

impl Pipelines {
    pub(super) fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let build = |topology, depth, label| {
            build_pipeline(device, &layout, &shader, format, topology, depth, label)
        };

        Self {
            world_triangles: build(Topology::Triangles, true, "World Triangles"),
            world_lines: build(Topology::Lines, true, "World Lines"),
            overlay_triangles: build(Topology::Triangles, false, "Overlay Triangles"),
            overlay_lines: build(Topology::Lines, false, "Overlay Lines"),
            globals_layout,
            texture_layout,
        }
    }

    pub(super) fn world(&self, topology: Topology) -> &wgpu::RenderPipeline {
        match topology {
            Topology::Triangles => &self.world_triangles,
            Topology::Lines => &self.world_lines,
        }
    }

    pub(super) fn overlay(&self, topology: Topology) -> &wgpu::RenderPipeline {
        match topology {
            Topology::Triangles => &self.overlay_triangles,
            Topology::Lines => &self.overlay_lines,
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: Topology,
    depth: bool,
    label: &str,
) -> wgpu::RenderPipeline {
    let topology = match topology {
        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
    };
    let depth_stencil = depth.then(|| wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[VERTEX_LAYOUT],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        assert_eq!(VERTEX_ATTRIBUTES[2].offset, 20);
    }

    #[test]
    fn vertex_bytes_follow_field_order() {
        let vertex = Vertex::new([1.5, 0.0, 0.0], [0.0, 0.0], crate::render::Color::WHITE);
        let bytes = as_bytes(std::slice::from_ref(&vertex));
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..4], &1.5f32.to_ne_bytes());
        assert_eq!(&bytes[32..], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn bytes_cover_whole_slice() {
        let indices = [1u32, 2, 3];
        assert_eq!(as_bytes(&indices).len(), 12);
        assert_eq!(&as_bytes(&indices)[..4], &1u32.to_ne_bytes());
    }
}
