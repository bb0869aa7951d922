//! Collaborators the texture and font layer delegates to.
//!
//! Native implementations live in the submodules; tests swap in counting doubles.

mod cpu;
mod font;
mod svg;

use std::{path::Path, sync::Arc};

use anyhow::Result;

use crate::{FileSystem, IntRect, Ofs, UVec2};

pub use self::cpu::*;
pub use self::font::*;
pub use self::svg::*;

/// Decoded RGBA8 pixels.
pub type PixelBuffer = image::RgbaImage;
pub type Color = image::Rgba<u8>;

/// One backend-allocated bitmap.
pub trait Bitmap {
    fn create(&mut self, width: u32, height: u32) -> Result<()>;

    fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Decodes only `region`; an empty region means the whole image.
    fn load_from_region(&mut self, bytes: &[u8], region: IntRect) -> Result<()>;

    fn load_from_pixels(&mut self, pixels: &PixelBuffer) -> Result<()>;

    fn set_smooth(&mut self, smooth: bool);

    fn is_smooth(&self) -> bool;

    fn set_repeated(&mut self, repeated: bool);

    fn is_repeated(&self) -> bool;

    fn copy_to_pixel_buffer(&self) -> PixelBuffer;

    fn size(&self) -> UVec2;
}

pub trait GraphicsBackend {
    fn new_bitmap(&self) -> Box<dyn Bitmap>;
}

/// A parsed vector document.
pub trait VectorDocument {
    fn intrinsic_size(&self) -> UVec2;

    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer>;
}

pub trait VectorRasterizer {
    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn VectorDocument>>;

    /// Whether `path` should be loaded as a vector document.
    fn handles(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontInfo {
    pub family: Option<String>,
    pub glyph_count: u16,
}

pub trait FontBackend {
    fn inspect(&self, bytes: &[u8]) -> Result<FontInfo>;
}

/// Everything a texture or font needs to load itself.
pub struct Backend {
    pub fs: Arc<dyn FileSystem>,
    pub graphics: Box<dyn GraphicsBackend>,
    pub vector: Box<dyn VectorRasterizer>,
    pub fonts: Box<dyn FontBackend>,
}

impl Backend {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        graphics: Box<dyn GraphicsBackend>,
        vector: Box<dyn VectorRasterizer>,
        fonts: Box<dyn FontBackend>,
    ) -> Self {
        Self {
            fs,
            graphics,
            vector,
            fonts,
        }
    }

    /// OS filesystem, CPU bitmaps, resvg and ttf-parser.
    pub fn native() -> Self {
        Self::with_fs(Arc::new(Ofs::native()))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self::new(
            fs,
            Box::new(ImageBackend),
            Box::new(SvgRasterizer),
            Box::new(TtfFontBackend),
        )
    }

    pub fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.read_bytes(Path::new(path))
    }
}
