pub mod assets;
pub mod camera;
pub mod config;
pub mod context;
pub mod debug_log;
pub mod error;
pub mod fetch;
pub mod game;
pub mod input;
pub mod logging;
pub mod render;
pub mod resource_dir;
pub mod script;

pub use camera::FreeCamera;
pub use config::VideoConfig;
pub use context::EngineContext;
pub use debug_log::{DebugLog, LogLevel, Module};
pub use error::{AssetError, EngineError, ScriptError};
pub use game::Game;
pub use input::InputState;
pub use winit::keyboard::KeyCode;
