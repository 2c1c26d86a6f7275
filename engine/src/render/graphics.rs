use std::sync::Arc;

use anyhow::Context;
use glam::Mat4;
use log::{error, info};
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, event_loop::EventLoopProxy, window::Window};

use super::frame::{Batch, Frame};
use super::pipeline::{as_bytes, Pipelines, DEPTH_FORMAT};
use super::resources::{GpuModel, GpuTexture};
use super::shapes::Topology;
use crate::assets::{ImageData, Model};
use crate::error::AssetError;

/// A view-projection uniform and its bind group.
struct Globals {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Globals {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: as_bytes(&Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, matrix: Mat4) {
        queue.write_buffer(&self.buffer, 0, as_bytes(&matrix.to_cols_array()));
    }
}

#[derive(Default)]
struct DepthTarget {
    attachment: Option<(wgpu::Texture, wgpu::TextureView, (u32, u32))>,
}

impl DepthTarget {
    fn ensure(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if matches!(&self.attachment, Some((_, _, current)) if *current == size) {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.attachment = Some((texture, view, size));
    }

    fn view(&self) -> Option<&wgpu::TextureView> {
        self.attachment.as_ref().map(|(_, view, _)| view)
    }
}

/// A batch whose vertices have been uploaded for the current frame.
struct PreparedBatch<'a> {
    topology: Topology,
    texture: Option<&'a GpuTexture>,
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Window surface, device and everything needed to draw a [`Frame`].
pub struct Graphics {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: Pipelines,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    world_globals: Globals,
    overlay_globals: Globals,
    depth: DepthTarget,
}

/// Builds [`Graphics`] for `window` and hands it to the event loop.
pub async fn create_graphics(window: Arc<Window>, vsync: bool, proxy: EventLoopProxy<Graphics>) {
    match Graphics::new(window, vsync).await {
        Ok(graphics) => {
            if proxy.send_event(graphics).is_err() {
                error!("event loop closed before graphics were ready");
            }
        }
        Err(err) => error!("failed to initialise graphics: {err:#}"),
    }
}

impl Graphics {
    pub async fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;
        info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        let desired_present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::Immediate
        };
        let present_mode = if caps.present_modes.contains(&desired_present_mode) {
            desired_present_mode
        } else {
            caps.present_modes[0]
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = Pipelines::new(&device, format);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let white = GpuTexture::new(
            &device,
            &queue,
            &pipelines.texture_layout,
            &sampler,
            &ImageData::solid(1, 1, [255, 255, 255, 255]),
            "White Texture",
        )?;
        let world_globals = Globals::new(&device, &pipelines.globals_layout, "World Globals");
        let overlay_globals = Globals::new(&device, &pipelines.globals_layout, "Overlay Globals");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipelines,
            sampler,
            white,
            world_globals,
            overlay_globals,
            depth: DepthTarget::default(),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Uploads `image`; fails when it is larger than the device allows.
    pub fn create_texture(&self, image: &ImageData, label: &str) -> Result<GpuTexture, AssetError> {
        GpuTexture::new(
            &self.device,
            &self.queue,
            &self.pipelines.texture_layout,
            &self.sampler,
            image,
            label,
        )
    }

    pub fn create_model(&self, model: &Model, label: &str) -> GpuModel {
        GpuModel::new(&self.device, model, label)
    }

    fn prepare<'a>(&self, batches: &[Batch<'a>], label: &str) -> Vec<PreparedBatch<'a>> {
        batches
            .iter()
            .filter(|batch| !batch.vertices.is_empty())
            .map(|batch| PreparedBatch {
                topology: batch.topology,
                texture: batch.texture,
                buffer: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: as_bytes(&batch.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                vertex_count: batch.vertices.len() as u32,
            })
            .collect()
    }

    fn texture_bind_group<'t>(&'t self, texture: Option<&'t GpuTexture>) -> &'t wgpu::BindGroup {
        &texture.unwrap_or(&self.white).bind_group
    }

    pub fn render(&mut self, frame: &Frame<'_>) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (width, height) = self.size();
        self.world_globals.write(&self.queue, frame.view_projection);
        self.overlay_globals.write(
            &self.queue,
            Mat4::orthographic_rh(0.0, width as f32, height as f32, 0.0, -1.0, 1.0),
        );
        self.depth.ensure(&self.device, (width, height));

        let world = self.prepare(&frame.world, "World Batch");
        let overlay = self.prepare(&frame.overlay, "Overlay Batch");

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let world_visible = frame.overlay_clear.is_none();
        if let (true, Some(depth_view)) = (world_visible, self.depth.view()) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("World Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_bind_group(0, &self.world_globals.bind_group, &[]);
            pass.set_pipeline(self.pipelines.world(Topology::Triangles));
            for draw in &frame.models {
                pass.set_bind_group(1, self.texture_bind_group(draw.texture), &[]);
                for mesh in &draw.model.meshes {
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
            for batch in &world {
                pass.set_pipeline(self.pipelines.world(batch.topology));
                pass.set_bind_group(1, self.texture_bind_group(batch.texture), &[]);
                pass.set_vertex_buffer(0, batch.buffer.slice(..));
                pass.draw(0..batch.vertex_count, 0..1);
            }
        }

        {
            let load = match frame.overlay_clear {
                Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
                None if world_visible => wgpu::LoadOp::Load,
                None => wgpu::LoadOp::Clear(frame.clear_color.to_wgpu()),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_bind_group(0, &self.overlay_globals.bind_group, &[]);
            for batch in &overlay {
                pass.set_pipeline(self.pipelines.overlay(batch.topology));
                pass.set_bind_group(1, self.texture_bind_group(batch.texture), &[]);
                pass.set_vertex_buffer(0, batch.buffer.slice(..));
                pass.draw(0..batch.vertex_count, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}
