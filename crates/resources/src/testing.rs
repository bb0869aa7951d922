//! Counting collaborators and fixtures shared by the unit tests.

use std::{cell::Cell, path::Path, rc::Rc, sync::Arc};

use anyhow::{Result, bail};
use image::Rgba;

use crate::{
    Backend, Bitmap, CpuBitmap, FontBackend, FontInfo, GraphicsBackend, IntRect, Ofs,
    PixelBuffer, UVec2, VectorDocument, VectorRasterizer,
};

#[derive(Default)]
pub struct Counters {
    pub decodes: Cell<usize>,
    pub renders: Cell<usize>,
    pub font_loads: Cell<usize>,
    pub pixel_copies: Cell<usize>,
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

/// CPU bitmap that counts decodes and pixel copies, and dims its alpha while smoothing is on, so pixel
/// reads can tell the two states apart.
pub struct CountingBitmap {
    inner: CpuBitmap,
    counters: Rc<Counters>,
}

impl Bitmap for CountingBitmap {
    fn create(&mut self, width: u32, height: u32) -> Result<()> {
        self.inner.create(width, height)
    }

    fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        bump(&self.counters.decodes);
        self.inner.load_from_bytes(bytes)
    }

    fn load_from_region(&mut self, bytes: &[u8], region: IntRect) -> Result<()> {
        bump(&self.counters.decodes);
        self.inner.load_from_region(bytes, region)
    }

    fn load_from_pixels(&mut self, pixels: &PixelBuffer) -> Result<()> {
        self.inner.load_from_pixels(pixels)
    }

    fn set_smooth(&mut self, smooth: bool) {
        self.inner.set_smooth(smooth)
    }

    fn is_smooth(&self) -> bool {
        self.inner.is_smooth()
    }

    fn set_repeated(&mut self, repeated: bool) {
        self.inner.set_repeated(repeated)
    }

    fn is_repeated(&self) -> bool {
        self.inner.is_repeated()
    }

    fn copy_to_pixel_buffer(&self) -> PixelBuffer {
        bump(&self.counters.pixel_copies);
        let mut pixels = self.inner.copy_to_pixel_buffer();
        if self.inner.is_smooth() {
            for pixel in pixels.pixels_mut() {
                pixel.0[3] /= 2;
            }
        }
        pixels
    }

    fn size(&self) -> UVec2 {
        self.inner.size()
    }
}

pub struct CountingGraphics(Rc<Counters>);

impl GraphicsBackend for CountingGraphics {
    fn new_bitmap(&self) -> Box<dyn Bitmap> {
        Box::new(CountingBitmap {
            inner: CpuBitmap::new(),
            counters: self.0.clone(),
        })
    }
}

/// Accepts any document starting with `<svg`, renders solid blue.
pub struct StubRasterizer(Rc<Counters>);

impl VectorRasterizer for StubRasterizer {
    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn VectorDocument>> {
        if !bytes.starts_with(b"<svg") {
            bail!("not an svg document");
        }
        Ok(Box::new(StubDocument(self.0.clone())))
    }
}

pub struct StubDocument(Rc<Counters>);

pub const STUB_DOCUMENT_SIZE: u32 = 16;
pub const STUB_BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

impl VectorDocument for StubDocument {
    fn intrinsic_size(&self) -> UVec2 {
        UVec2::new(STUB_DOCUMENT_SIZE, STUB_DOCUMENT_SIZE)
    }

    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer> {
        bump(&self.0.renders);
        Ok(PixelBuffer::from_pixel(width, height, STUB_BLUE))
    }
}

/// Accepts data starting with `FONT`; the rest of the first line is the family.
pub struct StubFonts(Rc<Counters>);

impl FontBackend for StubFonts {
    fn inspect(&self, bytes: &[u8]) -> Result<FontInfo> {
        let Some(rest) = bytes.strip_prefix(b"FONT") else {
            bail!("not a font");
        };
        bump(&self.0.font_loads);
        let family = String::from_utf8_lossy(rest).lines().next().unwrap_or("").trim().to_owned();
        Ok(FontInfo {
            family: Some(family),
            glyph_count: 1,
        })
    }
}

pub fn counting_backend() -> (Rc<Backend>, Rc<Counters>) {
    init_logger();
    let counters = Rc::new(Counters::default());
    let backend = Backend::new(
        Arc::new(Ofs::native()),
        Box::new(CountingGraphics(counters.clone())),
        Box::new(StubRasterizer(counters.clone())),
        Box::new(StubFonts(counters.clone())),
    );
    (Rc::new(backend), counters)
}

pub fn write_png(path: &Path, width: u32, height: u32, color: Rgba<u8>) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    PixelBuffer::from_pixel(width, height, color).save(path).unwrap();
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
