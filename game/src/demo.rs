//! The cottage scene: a textured model, a movable cube, a reference grid,
//! a downloaded watermark and a Lua overlay.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use engine::assets::{load_image, load_model, DroppedAsset, Model};
use engine::fetch;
use engine::render::{shapes, Batch, Color, Frame, GpuModel, GpuTexture, Graphics, ModelDraw, Topology};
use engine::script::{overlay_batches, DrawCommand, ScriptHost};
use engine::{DebugLog, FreeCamera, Game, InputState, LogLevel, Module};
use glam::Vec2;
use log::{debug, info};

use crate::cube::{Cube, CubeControls};
use crate::settings::{DemoSettings, WatermarkSettings};

const GRID_SLICES: i32 = 20;
const GRID_SPACING: f32 = 10.0;

/// Top-left corner that puts a `size` texture drawn at `scale` in the
/// bottom-right corner of `screen`, `margin` pixels from both edges.
pub fn watermark_position(screen: (u32, u32), size: (u32, u32), settings: WatermarkSettings) -> Vec2 {
    let screen = Vec2::new(screen.0 as f32, screen.1 as f32);
    let size = Vec2::new(size.0 as f32, size.1 as f32);
    screen - size * settings.scale - Vec2::splat(settings.margin)
}

pub struct DemoGame {
    settings: DemoSettings,
    resources: PathBuf,
    log: Rc<RefCell<DebugLog>>,
    camera: FreeCamera,
    cube: Cube,
    script: Option<ScriptHost>,
    script_commands: Vec<DrawCommand>,
    model: Option<GpuModel>,
    model_texture: Option<GpuTexture>,
    cube_texture: Option<GpuTexture>,
    watermark: Option<GpuTexture>,
}

impl DemoGame {
    /// Everything that does not need a window: remote files and the script.
    pub fn new(settings: DemoSettings, resources: PathBuf, log: Rc<RefCell<DebugLog>>) -> Self {
        let mut game = Self {
            camera: FreeCamera::default(),
            cube: Cube::new(settings.cube),
            script: None,
            script_commands: Vec::new(),
            model: None,
            model_texture: None,
            cube_texture: None,
            watermark: None,
            settings,
            resources,
            log,
        };
        game.start_script();
        game.fetch_remote_files();
        game
    }

    fn resource(&self, name: &str) -> PathBuf {
        self.resources.join(name)
    }

    fn report(&self, level: LogLevel, module: Module, message: impl AsRef<str>) {
        self.log.borrow_mut().log(level, module, message);
    }

    fn start_script(&mut self) {
        let mut host = match ScriptHost::new(Rc::clone(&self.log)) {
            Ok(host) => host,
            Err(err) => {
                self.report(LogLevel::Error, Module::Render, format!("Lua state unavailable: {err}"));
                return;
            }
        };
        match host.load_file(&self.settings.script) {
            Ok(()) => info!("lua file loaded: {}", self.settings.script.display()),
            Err(err) => self.report(LogLevel::Error, Module::Files, format!("Error loading script: {err}")),
        }
        if let Err(err) = host.watch() {
            debug!("script hot reload disabled: {err}");
        }
        self.script = Some(host);
    }

    fn fetch_remote_files(&mut self) {
        if !self.settings.remote.enabled {
            return;
        }
        let watermark = self.resource(&self.settings.assets.watermark);
        if let Err(err) = fetch::download_if_missing(&self.settings.remote.watermark_url, &watermark) {
            self.report(LogLevel::Warning, Module::Network, format!("watermark download failed: {err}"));
        }

        let fact = self.resource(&self.settings.assets.fact);
        if let Err(err) = fetch::download(&self.settings.remote.fact_url, &fact) {
            self.report(LogLevel::Warning, Module::Network, format!("fact download failed: {err}"));
        }
        match fetch::read_fact(&fact) {
            Ok(Some(text)) => self.report(LogLevel::Info, Module::Network, format!("Random Fact: {text}")),
            Ok(None) => {}
            Err(_) => self.report(
                LogLevel::Warning,
                Module::Files,
                format!("Failed to open {}", self.settings.assets.fact),
            ),
        }
    }

    fn load_texture(&self, graphics: &Graphics, path: &Path) -> Option<GpuTexture> {
        let image = match load_image(path) {
            Ok(image) => image,
            Err(err) => {
                self.report(LogLevel::Warning, Module::Files, err.to_string());
                return None;
            }
        };
        match graphics.create_texture(&image, &path.display().to_string()) {
            Ok(texture) => Some(texture),
            Err(err) => {
                self.report(LogLevel::Error, Module::Files, format!("{}: {err}", path.display()));
                None
            }
        }
    }

    /// Loads a model file; a model without meshes counts as a failure.
    fn load_model(&self, path: &Path) -> Option<Model> {
        match load_model(path) {
            Ok(model) if model.mesh_count() > 0 => {
                if let Some((min, max)) = model.meshes[0].bounds() {
                    debug!("{} bounds {min} .. {max}", path.display());
                }
                Some(model)
            }
            Ok(_) => {
                self.report(
                    LogLevel::Error,
                    Module::Files,
                    format!("Error: could not load the meshes of {}", path.display()),
                );
                None
            }
            Err(err) => {
                self.report(LogLevel::Error, Module::Files, err.to_string());
                None
            }
        }
    }

    /// Loads and uploads a model; meshes with broken indices are dropped on
    /// upload, so an upload left with nothing to draw also fails.
    fn upload_model(&self, graphics: &Graphics, path: &Path, label: &str) -> Option<GpuModel> {
        let model = graphics.create_model(&self.load_model(path)?, label);
        if model.mesh_count() == 0 {
            self.report(
                LogLevel::Error,
                Module::Files,
                format!("Error: no drawable meshes in {}", path.display()),
            );
            return None;
        }
        Some(model)
    }

    fn overlay(&self, screen: (u32, u32)) -> (Option<Color>, Vec<Batch<'_>>) {
        let (clear, script_batches) = overlay_batches(&self.script_commands);
        let mut batches = Vec::new();
        // A script clear also wipes the watermark drawn before it.
        if let (None, Some(watermark)) = (clear, &self.watermark) {
            let size = watermark.size();
            let scale = self.settings.watermark.scale;
            batches.push(Batch {
                topology: Topology::Triangles,
                texture: Some(watermark),
                vertices: shapes::sprite(
                    watermark_position(screen, size, self.settings.watermark),
                    Vec2::new(size.0 as f32, size.1 as f32) * scale,
                    Color::WHITE,
                ),
            });
        }
        batches.extend(script_batches);
        (clear, batches)
    }
}

impl Game for DemoGame {
    fn init(&mut self, graphics: &Graphics) {
        let model_path = self.resource(&self.settings.assets.model);
        self.model = self.upload_model(graphics, &model_path, "Scene Model");

        let texture_path = self.resource(&self.settings.assets.model_texture);
        self.model_texture = self.load_texture(graphics, &texture_path);
        let cube_path = self.resource(&self.settings.assets.cube_texture);
        self.cube_texture = self.load_texture(graphics, &cube_path);
        let watermark_path = self.resource(&self.settings.assets.watermark);
        self.watermark = self.load_texture(graphics, &watermark_path);

        self.report(LogLevel::Info, Module::Render, "scene ready");
    }

    fn update(&mut self, input: &InputState, dt: f32) {
        self.camera.update(input);
        self.cube.step(CubeControls::from_input(input));

        if let Some(script) = &mut self.script {
            script.reload_if_changed();
            self.script_commands = script.draw(dt);
        }
    }

    fn file_dropped(&mut self, graphics: &Graphics, path: &Path) {
        match DroppedAsset::classify(path) {
            Some(DroppedAsset::Model) => {
                if let Some(model) = self.upload_model(graphics, path, &path.display().to_string()) {
                    self.model = Some(model);
                    self.report(LogLevel::Info, Module::Files, format!("model replaced by {}", path.display()));
                }
            }
            Some(DroppedAsset::Texture) => {
                if let Some(texture) = self.load_texture(graphics, path) {
                    self.model_texture = Some(texture);
                    self.report(LogLevel::Info, Module::Files, format!("texture replaced by {}", path.display()));
                }
            }
            None => debug!("ignoring dropped file {}", path.display()),
        }
    }

    fn frame(&self, screen: (u32, u32)) -> Frame<'_> {
        let models = self
            .model
            .iter()
            .map(|model| ModelDraw {
                model,
                texture: self.model_texture.as_ref(),
            })
            .collect();
        let world = vec![
            Batch {
                topology: Topology::Triangles,
                texture: self.cube_texture.as_ref(),
                vertices: shapes::textured_cube(self.cube.position, self.cube.size(), Color::RAYWHITE),
            },
            Batch {
                topology: Topology::Lines,
                texture: None,
                vertices: shapes::grid(GRID_SLICES, GRID_SPACING),
            },
        ];
        let (overlay_clear, overlay) = self.overlay(screen);

        Frame {
            clear_color: Color::BLACK,
            view_projection: self.camera.view_projection(screen),
            models,
            world,
            overlay_clear,
            overlay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_sits_in_bottom_right_corner() {
        let position = watermark_position((1024, 800), (96, 96), WatermarkSettings::default());
        assert_eq!(position, Vec2::new(1024.0 - 48.0 - 10.0, 800.0 - 48.0 - 10.0));
    }

    #[test]
    fn watermark_follows_scale_and_margin() {
        let settings = WatermarkSettings {
            scale: 1.0,
            margin: 0.0,
        };
        assert_eq!(watermark_position((640, 480), (40, 20), settings), Vec2::new(600.0, 460.0));
    }
}
