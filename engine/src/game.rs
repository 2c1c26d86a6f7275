use std::path::Path;

use crate::input::InputState;
use crate::render::{Frame, Graphics};

/// Callbacks the frame loop drives once graphics are available.
pub trait Game {
    /// Called once, right after the window and device are ready.
    fn init(&mut self, graphics: &Graphics);

    fn update(&mut self, input: &InputState, dt: f32);

    /// Called when exactly one file was dropped onto the window.
    fn file_dropped(&mut self, _graphics: &Graphics, _path: &Path) {}

    /// Describes what to draw this frame; `screen` is the surface size in pixels.
    fn frame(&self, screen: (u32, u32)) -> Frame<'_>;
}
