//! wgpu renderer: surface/device ownership, pipelines and per-frame
//! submission of [`Frame`] descriptions.

mod frame;
mod graphics;
mod pipeline;
mod resources;
pub mod shapes;

pub use frame::{Batch, Color, Frame, ModelDraw, Vertex};
pub use graphics::{create_graphics, Graphics};
pub use resources::{GpuModel, GpuTexture};
pub use shapes::Topology;
