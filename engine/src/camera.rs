use glam::{Mat4, Vec3};
use winit::event::MouseButton;

use crate::input::InputState;

const NEAR: f32 = 0.01;
const FAR: f32 = 1000.0;
const ORBIT_SPEED: f32 = 0.005;
const ZOOM_STEP: f32 = 1.0;
const MIN_DISTANCE: f32 = 0.5;
const MAX_PITCH: f32 = 1.5;

/// Perspective camera looking at a target; right-drag orbits, wheel zooms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.0, 0.0, 2.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy: 45.0,
        }
    }
}

impl FreeCamera {
    pub fn update(&mut self, input: &InputState) {
        if input.is_button_down(MouseButton::Right) {
            let delta = input.cursor_delta();
            self.orbit(-delta.x * ORBIT_SPEED, -delta.y * ORBIT_SPEED);
        }
        let wheel = input.wheel();
        if wheel != 0.0 {
            self.zoom(wheel * ZOOM_STEP);
        }
    }

    /// Rotates the eye around the target by `yaw` and `pitch` radians.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let current_yaw = offset.z.atan2(offset.x);
        let current_pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();

        let yaw = current_yaw + yaw;
        let pitch = (current_pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
        let horizontal = distance * pitch.cos();
        self.position = self.target
            + Vec3::new(horizontal * yaw.cos(), distance * pitch.sin(), horizontal * yaw.sin());
    }

    /// Moves the eye towards the target; positive `amount` gets closer.
    pub fn zoom(&mut self, amount: f32) {
        let offset = self.position - self.target;
        let distance = (offset.length() - amount).max(MIN_DISTANCE);
        self.position = self.target + offset.normalize_or_zero() * distance;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy.to_radians(), aspect.max(f32::EPSILON), NEAR, FAR)
    }

    pub fn view_projection(&self, screen: (u32, u32)) -> Mat4 {
        let aspect = screen.0.max(1) as f32 / screen.1.max(1) as f32;
        self.projection(aspect) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4Swizzles;

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = FreeCamera::default();
        let clip = camera.view_projection((1024, 800)) * camera.target.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = FreeCamera::default();
        let before = camera.position.distance(camera.target);
        camera.orbit(0.7, 0.3);
        assert!((camera.position.distance(camera.target) - before).abs() < 1e-4);
        assert_ne!(camera.position, FreeCamera::default().position);
    }

    #[test]
    fn zoom_stops_short_of_target() {
        let mut camera = FreeCamera::default();
        camera.zoom(100.0);
        assert!((camera.position.distance(camera.target) - MIN_DISTANCE).abs() < 1e-5);
    }
}
