use std::path::Path;

use crate::error::AssetError;

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData, AssetError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.to_rgba8();
    Ok(ImageData {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trips_through_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        let mut buffer = image::RgbaImage::new(3, 2);
        buffer.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));
        buffer.save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(&loaded.pixels[loaded.pixels.len() - 4..], &[10, 20, 30, 40]);
    }

    #[test]
    fn missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_image(dir.path().join("watermark.png")),
            Err(AssetError::Image { .. })
        ));
    }

    #[test]
    fn solid_fills_every_pixel() {
        let image = ImageData::solid(2, 2, [255, 255, 255, 255]);
        assert_eq!(image.pixels.len(), 16);
        assert!(image.pixels.iter().all(|&byte| byte == 255));
    }
}
