//! CPU-side texture decoding and resampling

use std::path::Path;
use std::time::Instant;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{AssetError, AssetResult};

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// A 1x1 texture of a single colour.
    pub fn solid(name: &str, rgba: [u8; 4]) -> Self {
        Self {
            name: name.to_string(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    fn from_image(name: &str, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.to_string(),
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Decodes an encoded image held in memory, such as a texture embedded in a GLB.
    pub fn from_encoded(name: &str, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::from_image(name, image))
    }

    /// Returns a copy no larger than `max_dimension` on either side.
    pub fn fit_within(&self, max_dimension: u32) -> Self {
        let (width, height) = fit_within(self.width, self.height, max_dimension);
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }
        log::info!(
            "Downscaling '{}' from {}x{} to {}x{}",
            self.name,
            self.width,
            self.height,
            width,
            height
        );
        match self.to_image() {
            Some(image) => Self::from_image(
                &self.name,
                image::imageops::resize(&image, width, height, FilterType::Triangle),
            ),
            None => self.clone(),
        }
    }

    /// Full mip chain starting with this image, each level half the size of the previous.
    pub fn mip_chain(&self) -> Vec<TextureData> {
        let levels = mip_level_count(self.width, self.height);
        let mut chain = Vec::with_capacity(levels as usize);
        chain.push(self.clone());

        let Some(mut image) = self.to_image() else {
            return chain;
        };
        for _ in 1..levels {
            let width = (image.width() / 2).max(1);
            let height = (image.height() / 2).max(1);
            image = image::imageops::resize(&image, width, height, FilterType::Triangle);
            chain.push(Self::from_image(&self.name, image.clone()));
        }
        chain
    }
}

/// Decodes a JPEG or PNG file to RGBA8.
pub fn load_texture(path: &Path) -> AssetResult<TextureData> {
    if !path.exists() {
        return Err(AssetError::FileNotFound(path.to_path_buf()));
    }

    let started = Instant::now();
    let image = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let data = TextureData::from_image(&name, image);
    log::info!(
        "Loaded texture '{}' ({}x{}) in {:.0?}",
        name,
        data.width,
        data.height,
        started.elapsed()
    );
    Ok(data)
}

/// Largest size with the same aspect ratio that fits in `max_dimension`.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    if width <= max_dimension && height <= max_dimension {
        return (width.max(1), height.max(1));
    }
    let scale = max_dimension as f64 / width.max(height) as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
    (scaled(width), scaled(height))
}

/// Number of mip levels down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within_keeps_aspect() {
        assert_eq!(fit_within(8192, 4096, 4096), (4096, 2048));
        assert_eq!(fit_within(2048, 1024, 4096), (2048, 1024));
        assert_eq!(fit_within(1000, 3000, 300), (100, 300));
        assert_eq!(fit_within(0, 0, 16), (1, 1));
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(4096, 2048), 13);
        assert_eq!(mip_level_count(5, 3), 3);
    }

    #[test]
    fn test_mip_chain_halves_down_to_one() {
        let texture = TextureData {
            name: "checker".to_string(),
            width: 8,
            height: 4,
            pixels: vec![255; 8 * 4 * 4],
        };
        let chain = texture.mip_chain();
        let sizes: Vec<(u32, u32)> = chain.iter().map(|t| (t.width, t.height)).collect();
        assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
        for level in &chain {
            assert_eq!(level.pixels.len(), (level.width * level.height * 4) as usize);
        }
    }

    #[test]
    fn test_fit_within_resamples_pixels() {
        let texture = TextureData {
            name: "wide".to_string(),
            width: 64,
            height: 32,
            pixels: vec![128; 64 * 32 * 4],
        };
        let small = texture.fit_within(16);
        assert_eq!((small.width, small.height), (16, 8));
        assert_eq!(small.pixels.len(), 16 * 8 * 4);
        assert!(small.pixels.iter().all(|&p| p == 128));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = load_texture(Path::new("definitely/not/here.jpg"));
        assert!(matches!(result, Err(AssetError::FileNotFound(_))));
    }

    #[test]
    fn test_load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        image.save(&path).unwrap();

        let texture = load_texture(&path).unwrap();
        assert_eq!(texture.name, "tiny.png");
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(&texture.pixels[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_undecodable_file_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        assert!(matches!(load_texture(&path), Err(AssetError::Image { .. })));
    }
}
