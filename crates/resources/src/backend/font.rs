use anyhow::Result;
use ttf_parser::{Face, name_id};

use super::{FontBackend, FontInfo};

/// Validates TrueType/OpenType data with `ttf-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtfFontBackend;

impl FontBackend for TtfFontBackend {
    fn inspect(&self, bytes: &[u8]) -> Result<FontInfo> {
        let face = Face::parse(bytes, 0)?;
        let family = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::FAMILY && name.is_unicode())
            .find_map(|name| name.to_string());
        Ok(FontInfo {
            family,
            glyph_count: face.number_of_glyphs(),
        })
    }
}
