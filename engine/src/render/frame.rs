use glam::Mat4;

use super::resources::{GpuModel, GpuTexture};
use super::shapes::Topology;

/// 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const RAYWHITE: Color = Color::new(245, 245, 245, 255);
    pub const GRID_AXIS: Color = Color::new(128, 128, 128, 255);
    pub const GRID_LINE: Color = Color::new(191, 191, 191, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|channel| f32::from(channel) / 255.0)
    }

    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_array().map(f64::from);
        wgpu::Color { r, g, b, a }
    }
}

/// Vertex layout shared by every pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], color: Color) -> Self {
        Self {
            position,
            uv,
            color: color.to_array(),
        }
    }
}

/// Unindexed geometry drawn with one texture (white when `None`).
#[derive(Debug)]
pub struct Batch<'a> {
    pub topology: Topology,
    pub texture: Option<&'a GpuTexture>,
    pub vertices: Vec<Vertex>,
}

#[derive(Debug)]
pub struct ModelDraw<'a> {
    pub model: &'a GpuModel,
    pub texture: Option<&'a GpuTexture>,
}

/// Everything the renderer needs for one frame.
///
/// World geometry is depth tested under `view_projection`; overlay geometry
/// is in window pixels with the origin top-left. When `overlay_clear` is set
/// the world pass is skipped and the overlay starts from that colour.
#[derive(Debug)]
pub struct Frame<'a> {
    pub clear_color: Color,
    pub view_projection: Mat4,
    pub models: Vec<ModelDraw<'a>>,
    pub world: Vec<Batch<'a>>,
    pub overlay_clear: Option<Color>,
    pub overlay: Vec<Batch<'a>>,
}

impl Default for Frame<'_> {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            view_projection: Mat4::IDENTITY,
            models: Vec::new(),
            world: Vec::new(),
            overlay_clear: None,
            overlay: Vec::new(),
        }
    }
}
