//! Texture loading and data structures.
//! RGBA8 pixels decoded from PNG/JPEG files.

use std::path::Path;

use anyhow::{Context, Result, ensure};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            data.len() == (width as usize) * (height as usize) * 4,
            "Data size {} doesn't match RGBA8 {}x{}",
            data.len(),
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Decode an image file (format picked from the contents).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Decoding texture {:?}", path);

        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::debug!("Decoded texture {}x{} with {} bytes", width, height, data.len());

        Self::new_rgba8(width, height, data)
    }

    /// One-color texture, handy as a placeholder binding.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.to_vec(),
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
        }
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size =
            (self.width as usize) * (self.height as usize) * self.bytes_per_pixel() as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_size_is_checked() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 16]).is_ok());
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn solid_texture_is_valid() {
        let t = TextureData::solid([255, 0, 0, 255]);
        assert!(t.is_valid());
        assert_eq!(t.bytes_per_pixel(), 4);
    }

    #[test]
    fn load_missing_file_fails_with_path() {
        let err = TextureData::load("/definitely/not/here.png").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.png"));
    }

    #[test]
    fn load_decodes_png_from_disk() {
        let dir = std::env::temp_dir().join(format!("asset-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pixel.png");
        image::RgbaImage::from_raw(1, 1, vec![10, 20, 30, 255])
            .unwrap()
            .save(&path)
            .unwrap();

        let tex = TextureData::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (1, 1));
        assert_eq!(tex.data, vec![10, 20, 30, 255]);
        std::fs::remove_dir_all(&dir).ok();
    }
}
