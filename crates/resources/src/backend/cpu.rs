use anyhow::{Result, bail};
use image::imageops;

use super::{Bitmap, GraphicsBackend, PixelBuffer};
use crate::{IntRect, UVec2};

/// Largest edge a bitmap may have, matching common GPU limits.
pub const MAX_TEXTURE_SIZE: u32 = 16384;

/// Bitmap stored in CPU memory, decoded with the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct CpuBitmap {
    pixels: PixelBuffer,
    smooth: bool,
    repeated: bool,
}

impl CpuBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    fn replace(&mut self, pixels: PixelBuffer) -> Result<()> {
        let (width, height) = pixels.dimensions();
        check_size(width, height)?;
        self.pixels = pixels;
        Ok(())
    }
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("invalid bitmap size {width}x{height}");
    }
    if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
        bail!("bitmap size {width}x{height} exceeds the maximum of {MAX_TEXTURE_SIZE}");
    }
    Ok(())
}

impl Bitmap for CpuBitmap {
    fn create(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        self.pixels = PixelBuffer::new(width, height);
        Ok(())
    }

    fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        self.replace(decoded)
    }

    fn load_from_region(&mut self, bytes: &[u8], region: IntRect) -> Result<()> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        if region.is_empty() {
            return self.replace(decoded);
        }
        let (width, height) = decoded.dimensions();
        let area = region.clamped_to(UVec2::new(width, height));
        let cropped = imageops::crop_imm(
            &decoded,
            area.position.x,
            area.position.y,
            area.size.x,
            area.size.y,
        )
        .to_image();
        self.replace(cropped)
    }

    fn load_from_pixels(&mut self, pixels: &PixelBuffer) -> Result<()> {
        self.replace(pixels.clone())
    }

    fn set_smooth(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    fn is_smooth(&self) -> bool {
        self.smooth
    }

    fn set_repeated(&mut self, repeated: bool) {
        self.repeated = repeated;
    }

    fn is_repeated(&self) -> bool {
        self.repeated
    }

    fn copy_to_pixel_buffer(&self) -> PixelBuffer {
        self.pixels.clone()
    }

    fn size(&self) -> UVec2 {
        let (width, height) = self.pixels.dimensions();
        UVec2::new(width, height)
    }
}

/// Allocates [`CpuBitmap`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBackend;

impl GraphicsBackend for ImageBackend {
    fn new_bitmap(&self) -> Box<dyn Bitmap> {
        Box::new(CpuBitmap::new())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = PixelBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn decode_whole_and_region() {
        let bytes = png(8, 4);
        let mut bitmap = CpuBitmap::new();
        bitmap.load_from_bytes(&bytes).unwrap();
        assert_eq!(bitmap.size(), UVec2::new(8, 4));

        bitmap.load_from_region(&bytes, IntRect::new(2, 1, 3, 2)).unwrap();
        assert_eq!(bitmap.size(), UVec2::new(3, 2));
        assert_eq!(*bitmap.pixels().get_pixel(0, 0), Rgba([2, 1, 0, 255]));

        bitmap.load_from_region(&bytes, IntRect::default()).unwrap();
        assert_eq!(bitmap.size(), UVec2::new(8, 4));
    }

    #[test]
    fn rejects_garbage_and_bad_sizes() {
        let mut bitmap = CpuBitmap::new();
        assert!(bitmap.load_from_bytes(b"not an image").is_err());
        assert!(bitmap.create(0, 4).is_err());
        assert!(bitmap.create(MAX_TEXTURE_SIZE + 1, 1).is_err());
        bitmap.create(3, 5).unwrap();
        assert_eq!(bitmap.size(), UVec2::new(3, 5));
    }

    #[test]
    fn flags_survive_reload() {
        let mut bitmap = CpuBitmap::new();
        bitmap.set_smooth(true);
        bitmap.set_repeated(true);
        bitmap.load_from_bytes(&png(2, 2)).unwrap();
        assert!(bitmap.is_smooth());
        assert!(bitmap.is_repeated());
    }
}
