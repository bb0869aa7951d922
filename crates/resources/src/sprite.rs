use crate::{IntRect, ResourceError, ResourceManagedObject, Result, Texture, TexturePart, UVec2};

/// Sprite descriptor referencing a cached `Texture`.
/// Loads its texture through the attached resource cache, so callers only pass paths.
#[derive(Debug, Default)]
pub struct Sprite {
    pub resources: ResourceManagedObject,
    texture: Option<Texture>,
    /// Region of the texture to draw, in pixels. Defaults to the full texture.
    pub region: Option<IntRect>,
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sprite that uses an already loaded texture.
    pub fn from_texture(texture: Texture) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    /// Fetch `path` from the attached cache and keep a handle on it.
    pub fn load_texture(&mut self, path: &str) -> Result<()> {
        let resources = self
            .resources
            .resource_manager()
            .ok_or(ResourceError::NoResourceManager)?;
        let texture = resources.borrow_mut().texture(path)?.clone();
        self.texture = Some(texture);
        Ok(())
    }

    pub fn release_texture(&mut self) {
        self.texture = None;
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn texture_part(&self) -> Option<TexturePart<'_>> {
        let texture = self.texture.as_ref()?;
        Some(match self.region {
            Some(region) => TexturePart::new(texture, region),
            None => texture.make_texture_part(),
        })
    }

    /// Size of the drawn region in pixels.
    pub fn size(&self) -> UVec2 {
        self.texture_part()
            .map(|part| part.size())
            .unwrap_or_else(UVec2::zeros)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use tempfile::tempdir;

    use super::*;
    use crate::{Engine, testing::write_png};

    #[test]
    fn loads_through_attached_cache() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("hero.png"), 4, 4, Rgba([9, 9, 9, 255]));
        let engine = Engine::with_root(dir.path().to_string_lossy());

        let mut sprite = Sprite::new();
        assert!(matches!(
            sprite.load_texture("hero.png"),
            Err(ResourceError::NoResourceManager)
        ));

        sprite.resources.attach_resource_manager(&engine.resources);
        sprite.load_texture("hero.png").unwrap();
        assert_eq!(sprite.size(), UVec2::new(4, 4));
        assert_eq!(sprite.texture().unwrap().use_count(), 2);

        sprite.region = Some(IntRect::new(0, 0, 2, 1));
        assert_eq!(sprite.size(), UVec2::new(2, 1));

        // the sprite's handle keeps the texture alive across sweeps
        assert_eq!(engine.resources.borrow_mut().clean(), 0);
        sprite.release_texture();
        assert_eq!(engine.resources.borrow_mut().clean(), 1);
    }
}
