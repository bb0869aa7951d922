use anyhow::{Result, anyhow};
use image::Rgba;
use resvg::{tiny_skia, usvg};

use super::{PixelBuffer, VectorDocument, VectorRasterizer};
use crate::UVec2;

/// Parses SVG with `usvg` and rasterizes with `resvg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRasterizer;

impl VectorRasterizer for SvgRasterizer {
    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn VectorDocument>> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
        Ok(Box::new(SvgDocument { tree }))
    }
}

pub struct SvgDocument {
    tree: usvg::Tree,
}

impl VectorDocument for SvgDocument {
    fn intrinsic_size(&self) -> UVec2 {
        let size = self.tree.size();
        UVec2::new(size.width().ceil() as u32, size.height().ceil() as u32)
    }

    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer> {
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate a {width}x{height} pixmap"))?;
        let size = self.tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&self.tree, transform, &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha
        let mut pixels = PixelBuffer::new(width, height);
        for (dst, src) in pixels.pixels_mut().zip(pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
        }
        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_RECT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
        <rect width="8" height="4" fill="#ff0000"/>
    </svg>"##;

    #[test]
    fn parse_and_render_scaled() {
        let document = SvgRasterizer.parse(RED_RECT.as_bytes()).unwrap();
        assert_eq!(document.intrinsic_size(), UVec2::new(8, 4));

        let pixels = document.render(16, 8).unwrap();
        assert_eq!(pixels.dimensions(), (16, 8));
        assert_eq!(*pixels.get_pixel(8, 4), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn rejects_non_svg() {
        assert!(SvgRasterizer.parse(b"definitely not svg").is_err());
        assert!(SvgRasterizer.handles("ui/icon.SVG"));
        assert!(!SvgRasterizer.handles("ui/icon.png"));
    }
}
