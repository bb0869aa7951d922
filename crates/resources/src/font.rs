use std::fmt;

use crate::{Backend, FontInfo, ResourceError, Result};

/// Loaded font data. Glyph rendering is left to whoever consumes the bytes.
pub struct Font {
    path: String,
    data: Vec<u8>,
    info: FontInfo,
}

impl Font {
    pub fn load_from_file(backend: &Backend, path: &str) -> Result<Self> {
        let data = backend
            .read_bytes(path)
            .map_err(|err| ResourceError::decode(path, err))?;
        let info = backend
            .fonts
            .inspect(&data)
            .map_err(|err| ResourceError::decode(path, err))?;
        Ok(Self {
            path: path.to_owned(),
            data,
            info,
        })
    }

    /// Where the font was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn family(&self) -> Option<&str> {
        self.info.family.as_deref()
    }

    pub fn glyph_count(&self) -> u16 {
        self.info.glyph_count
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("path", &self.path)
            .field("family", &self.info.family)
            .field("glyph_count", &self.info.glyph_count)
            .field("bytes", &self.data.len())
            .finish()
    }
}
