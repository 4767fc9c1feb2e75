use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::ImageReader;

use crate::models::MediaData;

/// Pixel size of an image item without decoding it fully.
pub fn media_dimensions(data: &MediaData) -> Result<(u32, u32)> {
    match data {
        MediaData::Asset(path) => read_dimensions(path),
        MediaData::Inline { bytes, .. } => dimensions_from_bytes(bytes),
    }
}

pub fn read_dimensions(path: &Path) -> Result<(u32, u32)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    dimensions_from_bytes(&bytes).with_context(|| format!("Failed to read dimensions: {:?}", path))
}

pub fn dimensions_from_bytes(bytes: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to guess image format")?
        .into_dimensions()
        .context("Failed to read image header")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use tempfile::tempdir;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::new(w, h)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_dimensions_from_inline_payload() {
        let data = MediaData::Inline {
            mime: "image/png".into(),
            bytes: png_bytes(40, 25),
        };
        assert_eq!(media_dimensions(&data).unwrap(), (40, 25));
    }

    #[test]
    fn test_dimensions_from_asset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, png_bytes(3, 7)).unwrap();
        assert_eq!(
            media_dimensions(&MediaData::Asset(path)).unwrap(),
            (3, 7)
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(dimensions_from_bytes(b"not an image").is_err());
    }
}
