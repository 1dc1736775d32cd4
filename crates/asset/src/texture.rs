//! Texture data and the collaborators that locate and decode texture files.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};

/// Decoded texture in CPU-friendly format before GPU upload.
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
    /// Wrap RGBA8 pixels; fails if `data` does not hold `width * height` pixels.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        ensure!(
            data.len() == expected,
            "RGBA8 {width}x{height} needs {expected} bytes, got {}",
            data.len()
        );
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
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
            self.width as usize * self.height as usize * self.bytes_per_pixel() as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

/// Turns encoded image bytes into RGBA8 pixels.
pub trait TextureDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<TextureData>;
}

/// Finds the bytes behind a `map_Kd` path. `None` means the file does not exist.
pub trait TextureResolver: Send + Sync {
    fn resolve(&self, path: &str) -> Option<Vec<u8>>;
}

/// Decoder backed by the `image` crate (PNG and JPEG).
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDecoder;

impl TextureDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TextureData> {
        let img = image::load_from_memory(bytes).context("Failed to decode texture image")?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();
        log::info!("Decoded texture {}x{} with {} bytes", width, height, data.len());
        TextureData::new_rgba8(width, height, data)
    }
}

/// Resolves relative texture paths against a root directory.
#[derive(Clone, Debug, Default)]
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextureResolver for DirResolver {
    fn resolve(&self, path: &str) -> Option<Vec<u8>> {
        let full = self.root.join(path);
        if !full.is_file() {
            log::debug!("Texture {:?} not found", full);
            return None;
        }
        match std::fs::read(&full) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Texture {:?} exists but cannot be read: {}", full, e);
                None
            }
        }
    }
}

/// A resolver/decoder pair handed to the mesh builder.
#[derive(Clone, Copy)]
pub struct TextureLoader<'a> {
    pub resolver: &'a dyn TextureResolver,
    pub decoder: &'a dyn TextureDecoder,
}

impl<'a> TextureLoader<'a> {
    pub fn new(resolver: &'a dyn TextureResolver, decoder: &'a dyn TextureDecoder) -> Self {
        Self { resolver, decoder }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a solid-color PNG in memory.
    pub(crate) fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .expect("encode png");
        out
    }

    #[test]
    fn rgba8_size_is_checked() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 16]).is_ok());
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn image_decoder_reads_png() {
        let tex = ImageDecoder
            .decode(&png_bytes(3, 2, [10, 20, 30, 255]))
            .expect("decode png");
        assert_eq!((tex.width, tex.height), (3, 2));
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn image_decoder_rejects_garbage() {
        assert!(ImageDecoder.decode(b"definitely not an image").is_err());
    }

    #[test]
    fn dir_resolver_misses_nonexistent_file() {
        let resolver = DirResolver::new(std::env::temp_dir());
        assert!(resolver.resolve("no-such-texture-4b1d9e.png").is_none());
    }

    #[test]
    fn dir_resolver_reads_existing_file() {
        let dir = std::env::temp_dir().join(format!("asset-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("t.png"), b"bytes").unwrap();
        let resolver = DirResolver::new(&dir);
        assert_eq!(resolver.resolve("t.png").as_deref(), Some(&b"bytes"[..]));
        std::fs::remove_dir_all(&dir).ok();
    }
}
