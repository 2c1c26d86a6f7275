use std::collections::HashSet;
use std::path::PathBuf;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixels of trackpad scrolling that count as one wheel notch.
const PIXELS_PER_NOTCH: f32 = 20.0;

/// Keyboard and mouse state accumulated between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    cursor: Option<Vec2>,
    cursor_delta: Vec2,
    wheel: f32,
    dropped: Vec<PathBuf>,
}

impl InputState {
    pub fn handle_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat && self.keys_down.insert(code) {
                    self.keys_pressed.insert(code);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
            }
        }
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => self.buttons_down.insert(button),
            ElementState::Released => self.buttons_down.remove(&button),
        };
    }

    pub fn handle_cursor(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(previous) = self.cursor {
            self.cursor_delta += position - previous;
        }
        self.cursor = Some(position);
    }

    pub fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_NOTCH,
        };
    }

    pub fn handle_dropped_file(&mut self, path: PathBuf) {
        self.dropped.push(path);
    }

    /// Focus loss drops every held key so nothing stays stuck down.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.buttons_down.clear();
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }

    /// `true` only during the frame in which the key went down.
    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.keys_pressed.contains(&code)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    pub fn wheel(&self) -> f32 {
        self.wheel
    }

    pub fn take_dropped(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.dropped)
    }

    /// Clears the per-frame edges: presses, cursor motion and wheel.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.cursor_delta = Vec2::ZERO;
        self.wheel = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_an_edge_and_down_is_a_level() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::Space, ElementState::Pressed, false);
        assert!(input.is_key_pressed(KeyCode::Space));
        assert!(input.is_key_down(KeyCode::Space));

        input.end_frame();
        assert!(!input.is_key_pressed(KeyCode::Space));
        assert!(input.is_key_down(KeyCode::Space));

        input.handle_key(KeyCode::Space, ElementState::Pressed, true);
        assert!(!input.is_key_pressed(KeyCode::Space));

        input.handle_key(KeyCode::Space, ElementState::Released, false);
        assert!(!input.is_key_down(KeyCode::Space));
    }

    #[test]
    fn cursor_delta_accumulates_until_end_of_frame() {
        let mut input = InputState::default();
        input.handle_cursor(10.0, 10.0);
        assert_eq!(input.cursor_delta(), Vec2::ZERO);
        input.handle_cursor(13.0, 8.0);
        input.handle_cursor(15.0, 8.0);
        assert_eq!(input.cursor_delta(), Vec2::new(5.0, -2.0));
        input.end_frame();
        assert_eq!(input.cursor_delta(), Vec2::ZERO);
    }

    #[test]
    fn wheel_lines_and_pixels() {
        let mut input = InputState::default();
        input.handle_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.handle_wheel(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 40.0),
        ));
        assert_eq!(input.wheel(), 3.0);
    }

    #[test]
    fn dropped_files_are_drained() {
        let mut input = InputState::default();
        input.handle_dropped_file(PathBuf::from("a.obj"));
        assert_eq!(input.take_dropped(), vec![PathBuf::from("a.obj")]);
        assert!(input.take_dropped().is_empty());
    }
}
