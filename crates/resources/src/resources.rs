use std::{
    cell::RefCell,
    collections::HashMap,
    path::Path,
    rc::{Rc, Weak},
};

use crate::{Backend, Font, MountTable, PathKind, ResourceError, Result, Texture, strings};

const MAX_SUGGESTIONS: usize = 3;

/// Les deux variantes (sans / avec anti-aliasing) d'une même texture.
#[derive(Default)]
struct TextureSlots {
    plain: Option<Texture>,
    smooth: Option<Texture>,
}

impl TextureSlots {
    fn get(&self, anti_aliasing: bool) -> Option<&Texture> {
        if anti_aliasing {
            self.smooth.as_ref()
        } else {
            self.plain.as_ref()
        }
    }

    fn slot_mut(&mut self, anti_aliasing: bool) -> &mut Option<Texture> {
        if anti_aliasing {
            &mut self.smooth
        } else {
            &mut self.plain
        }
    }

    fn is_empty(&self) -> bool {
        self.plain.is_none() && self.smooth.is_none()
    }
}

/// Cache de textures et de polices, indexé par chemin logique.
///
/// Une texture est décodée une seule fois par (chemin, anti-aliasing) ; les deux variantes
/// sont des copies indépendantes. `clean()` libère les textures que plus personne
/// d'autre que le cache ne référence.
pub struct ResourceCache {
    backend: Rc<Backend>,
    mounts: Rc<MountTable>,
    textures: HashMap<String, TextureSlots>,
    fonts: HashMap<String, Rc<Font>>,
    pub default_anti_aliasing: bool,
}

impl ResourceCache {
    pub fn new(backend: Rc<Backend>, mounts: Rc<MountTable>) -> Self {
        ResourceCache {
            backend,
            mounts,
            textures: HashMap::new(),
            fonts: HashMap::new(),
            default_anti_aliasing: false,
        }
    }

    pub fn with_default_anti_aliasing(mut self, anti_aliasing: bool) -> Self {
        self.default_anti_aliasing = anti_aliasing;
        self
    }

    pub fn mounts(&self) -> &Rc<MountTable> {
        &self.mounts
    }

    pub fn backend(&self) -> &Rc<Backend> {
        &self.backend
    }

    /// Texture at `path` with the default anti-aliasing.
    pub fn texture(&mut self, path: impl AsRef<str>) -> Result<&Texture> {
        let anti_aliasing = self.default_anti_aliasing;
        self.get_texture(path, anti_aliasing)
    }

    /// Texture at `path` for the given anti-aliasing variant, loaded on first request.
    ///
    /// Keep a clone of the returned texture to hold on to it across `clean()` calls.
    pub fn get_texture(&mut self, path: impl AsRef<str>, anti_aliasing: bool) -> Result<&Texture> {
        let path = path.as_ref();
        if !self.is_cached(path, anti_aliasing) {
            let texture = self.load_texture(path, anti_aliasing)?;
            *self
                .textures
                .entry(path.to_owned())
                .or_default()
                .slot_mut(anti_aliasing) = Some(texture);
        }
        self.textures
            .get(path)
            .and_then(|slots| slots.get(anti_aliasing))
            .ok_or_else(|| ResourceError::AssetNotFound {
                path: path.to_owned(),
                suggestions: Vec::new(),
            })
    }

    fn load_texture(&self, path: &str, anti_aliasing: bool) -> Result<Texture> {
        let found = self.mounts.resolve(path, PathKind::File);
        if !found.success() {
            return Err(ResourceError::AssetNotFound {
                path: path.to_owned(),
                suggestions: self.suggestions(path),
            });
        }

        let mut texture = Texture::new_shared(self.backend.clone());
        texture.load_from_file(found.path())?;
        if !texture.success() {
            return Err(ResourceError::Decode {
                path: found.path().to_owned(),
                reason: "vector document could not be parsed".into(),
            });
        }
        texture.set_anti_aliasing(anti_aliasing)?;

        log::debug!(
            "[ResourceCache] Loading <Texture> {} from {}",
            path,
            found.path()
        );
        Ok(texture)
    }

    /// Font at `path`, loaded on first request and kept for the cache's lifetime.
    pub fn get_font(&mut self, path: impl AsRef<str>) -> Result<Rc<Font>> {
        let path = path.as_ref();
        if let Some(font) = self.fonts.get(path) {
            return Ok(font.clone());
        }

        let found = self.mounts.resolve(path, PathKind::File);
        if !found.success() {
            return Err(ResourceError::FontNotFound {
                path: path.to_owned(),
                searched_roots: self.mounts.base_paths(),
            });
        }

        let font = Rc::new(Font::load_from_file(&self.backend, found.path())?);
        log::debug!(
            "[ResourceCache] Loading <Font> {} from {}",
            path,
            found.path()
        );
        self.fonts.insert(path.to_owned(), font.clone());
        Ok(font)
    }

    /// Drops every texture slot the cache is the last holder of.
    /// Returns the number of slots released.
    pub fn clean(&mut self) -> usize {
        let mut released = 0;
        for (path, slots) in self.textures.iter_mut() {
            for anti_aliasing in [false, true] {
                let slot = slots.slot_mut(anti_aliasing);
                if slot.as_ref().is_some_and(|texture| texture.use_count() == 1) {
                    log::debug!(
                        "[ResourceCache] Releasing <Texture> {} (anti-aliasing: {})",
                        path,
                        anti_aliasing
                    );
                    *slot = None;
                    released += 1;
                }
            }
        }
        self.textures.retain(|_, slots| !slots.is_empty());
        released
    }

    pub fn is_cached(&self, path: &str, anti_aliasing: bool) -> bool {
        self.textures
            .get(path)
            .is_some_and(|slots| slots.get(anti_aliasing).is_some())
    }

    /// Number of logical paths with at least one cached texture.
    pub fn texture_entries(&self) -> usize {
        self.textures.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Files next to the requested one, in every mount, closest names first.
    fn suggestions(&self, path: &str) -> Vec<String> {
        let parent = path.rfind('/').map_or("", |index| &path[..index]);
        let mut candidates: Vec<String> = Vec::new();
        for mount in self.mounts.mounts() {
            let directory = mount.compose(parent);
            let directory = if directory.is_empty() { "." } else { directory.as_str() };
            if !self.mounts.fs().directory_exists(Path::new(directory)) {
                continue;
            }
            let Ok(entries) = self.mounts.fs().list_directory(Path::new(directory)) else {
                continue;
            };
            for entry in entries {
                let candidate = if parent.is_empty() {
                    entry
                } else {
                    format!("{parent}/{entry}")
                };
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        strings::sort_by_distance(path, &candidates, MAX_SUGGESTIONS)
    }
}

/// Référence non possédante vers un `ResourceCache`.
///
/// Un objet qui charge ses ressources lui-même embarque ce champ ; le cache ne possède
/// pas l'objet et l'objet ne maintient pas le cache en vie.
#[derive(Debug, Default, Clone)]
pub struct ResourceManagedObject {
    resources: Option<Weak<RefCell<ResourceCache>>>,
}

impl ResourceManagedObject {
    pub fn attach_resource_manager(&mut self, resources: &Rc<RefCell<ResourceCache>>) {
        self.resources = Some(Rc::downgrade(resources));
    }

    pub fn remove_resource_manager(&mut self) {
        self.resources = None;
    }

    /// The attached cache, if any and still alive.
    pub fn resource_manager(&self) -> Option<Rc<RefCell<ResourceCache>>> {
        self.resources.as_ref().and_then(Weak::upgrade)
    }

    pub fn has_resource_manager(&self) -> bool {
        self.resource_manager().is_some()
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("mounts", &self.mounts)
            .field("textures", &self.textures.len())
            .field("fonts", &self.fonts.len())
            .field("default_anti_aliasing", &self.default_anti_aliasing)
            .finish()
    }
}
