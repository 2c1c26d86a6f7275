use engine::{InputState, KeyCode};
use glam::Vec3;

use crate::settings::CubeSettings;

/// Keyboard-driven cube with a crude gravity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
    pub position: Vec3,
    settings: CubeSettings,
}

/// Controls held or pressed during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CubeControls {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl CubeControls {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            forward: input.is_key_down(KeyCode::KeyW),
            back: input.is_key_down(KeyCode::KeyS),
            left: input.is_key_down(KeyCode::KeyA),
            right: input.is_key_down(KeyCode::KeyD),
            jump: input.is_key_pressed(KeyCode::Space),
        }
    }
}

impl Cube {
    pub fn new(settings: CubeSettings) -> Self {
        Self {
            position: Vec3::ZERO,
            settings,
        }
    }

    pub fn size(&self) -> Vec3 {
        Vec3::splat(self.settings.size)
    }

    /// Advances one frame. Gravity is per frame, not per second.
    pub fn step(&mut self, controls: CubeControls) {
        let CubeSettings {
            step,
            gravity,
            jump_impulse,
            jump_block_height,
            ..
        } = self.settings;

        if self.position.y != 0.0 {
            self.position.y = (self.position.y - gravity).max(0.0);
        }
        if controls.forward {
            self.position.x += step;
        }
        if controls.back {
            self.position.x -= step;
        }
        if controls.left {
            self.position.z -= step;
        }
        if controls.right {
            self.position.z += step;
        }
        if self.position.y != jump_block_height && controls.jump {
            self.position.y += jump_impulse;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Cube {
        Cube::new(CubeSettings::default())
    }

    #[test]
    fn wasd_moves_on_ground_plane() {
        let mut cube = cube();
        cube.step(CubeControls {
            forward: true,
            right: true,
            ..Default::default()
        });
        assert_eq!(cube.position, Vec3::new(0.5, 0.0, 0.5));

        cube.step(CubeControls {
            back: true,
            left: true,
            ..Default::default()
        });
        assert_eq!(cube.position, Vec3::ZERO);
    }

    #[test]
    fn jump_then_fall_back_to_ground() {
        let mut cube = cube();
        cube.step(CubeControls {
            jump: true,
            ..Default::default()
        });
        assert_eq!(cube.position.y, 15.0);

        for _ in 0..30 {
            cube.step(CubeControls::default());
        }
        assert_eq!(cube.position.y, 0.0);
    }

    #[test]
    fn jump_refused_at_block_height() {
        let mut cube = cube();
        cube.position.y = 10.5;
        cube.step(CubeControls {
            jump: true,
            ..Default::default()
        });
        assert_eq!(cube.position.y, 10.0);
        cube.step(CubeControls::default());
        assert_eq!(cube.position.y, 9.5);
    }

    #[test]
    fn gravity_never_pushes_below_ground() {
        let mut cube = Cube::new(CubeSettings {
            gravity: 4.0,
            ..CubeSettings::default()
        });
        cube.position.y = 3.0;
        cube.step(CubeControls::default());
        assert_eq!(cube.position.y, 0.0);
    }
}
