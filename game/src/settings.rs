//! Demo settings read from `demo.toml`. Every field is optional.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::LogLevel;
use log::info;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoSettings {
    pub title: String,
    pub log_level: LogLevel,
    pub log_file: PathBuf,
    pub config_file: PathBuf,
    pub script: PathBuf,
    /// Directory searched for by name next to the working directory and the executable.
    pub resource_dir: String,
    pub assets: AssetSettings,
    pub cube: CubeSettings,
    pub watermark: WatermarkSettings,
    pub remote: RemoteSettings,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            title: "Game Engine".to_string(),
            log_level: LogLevel::Debug,
            log_file: PathBuf::from("debug.log"),
            config_file: PathBuf::from("config.ini"),
            script: PathBuf::from("main.lua"),
            resource_dir: "resources".to_string(),
            assets: AssetSettings::default(),
            cube: CubeSettings::default(),
            watermark: WatermarkSettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

/// File names inside the resource directory.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetSettings {
    pub model: String,
    pub model_texture: String,
    pub cube_texture: String,
    pub watermark: String,
    pub fact: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            model: "cottage_obj.obj".to_string(),
            model_texture: "cottage_diffuse.png".to_string(),
            cube_texture: "wood.png".to_string(),
            watermark: "watermark.png".to_string(),
            fact: "fact.txt".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CubeSettings {
    pub size: f32,
    pub step: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    /// Height at which a jump is refused.
    pub jump_block_height: f32,
}

impl Default for CubeSettings {
    fn default() -> Self {
        Self {
            size: 5.0,
            step: 0.5,
            gravity: 0.5,
            jump_impulse: 15.0,
            jump_block_height: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatermarkSettings {
    pub scale: f32,
    pub margin: f32,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            scale: 0.5,
            margin: 10.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSettings {
    pub enabled: bool,
    pub watermark_url: String,
    pub fact_url: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            watermark_url: "https://avatars.githubusercontent.com/u/139177589?s=96&v=4".to_string(),
            fact_url: "https://uselessfacts.jsph.pl/api/v2/facts/random".to_string(),
        }
    }
}

impl DemoSettings {
    pub fn parse(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using built-in settings", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
