//! Models and images loaded from disk into CPU-side buffers.

mod bitmap;
mod model;

use std::path::Path;

pub use self::bitmap::{load_image, ImageData};
pub use self::model::{load_model, MeshData, Model};

/// Extensions accepted as model files when dropped on the window.
pub const MODEL_EXTENSIONS: [&str; 6] = ["obj", "gltf", "glb", "vox", "iqm", "m3d"];

/// What a file dropped on the window should replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DroppedAsset {
    Model,
    Texture,
}

impl DroppedAsset {
    pub fn classify(path: &Path) -> Option<Self> {
        let extension = extension_lowercase(path)?;
        if MODEL_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Model)
        } else if extension == "png" {
            Some(Self::Texture)
        } else {
            None
        }
    }
}

pub(crate) fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_dropped_files() {
        assert_eq!(DroppedAsset::classify(Path::new("a/house.OBJ")), Some(DroppedAsset::Model));
        assert_eq!(DroppedAsset::classify(Path::new("scene.glb")), Some(DroppedAsset::Model));
        assert_eq!(DroppedAsset::classify(Path::new("bot.m3d")), Some(DroppedAsset::Model));
        assert_eq!(DroppedAsset::classify(Path::new("wood.png")), Some(DroppedAsset::Texture));
        assert_eq!(DroppedAsset::classify(Path::new("wood.jpg")), None);
        assert_eq!(DroppedAsset::classify(Path::new("README")), None);
    }
}
