use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the window/event-loop layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Failures while reading models and images from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported model format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("failed to load OBJ model {}: {source}", .path.display())]
    Obj {
        path: PathBuf,
        source: tobj::LoadError,
    },
    #[error("failed to load glTF model {}: {source}", .path.display())]
    Gltf {
        path: PathBuf,
        source: gltf::Error,
    },
    #[error("failed to load image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("texture of {width}x{height} exceeds the device limit of {max} pixels per side")]
    TextureTooLarge { width: u32, height: u32, max: u32 },
}

/// Failures of the embedded Lua host.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("lua: {0}")]
    Lua(#[from] mlua::Error),
    #[error("no script loaded")]
    NoScript,
    #[error("failed to watch script: {0}")]
    Watch(#[from] notify::Error),
}
