use std::{cell::RefCell, rc::Rc, sync::Arc};

use crate::{Backend, FileSystem, MountPoint, MountTable, ResourceCache, ResourceConfig};

/// Engine : point d'entrée qui assemble backend, table de montage et cache de ressources.
///
/// Le cache est partagé (`Rc<RefCell<_>>`) pour que les objets puissent s'y attacher
/// via `ResourceManagedObject`.
pub struct Engine {
    pub backend: Rc<Backend>,
    pub mounts: Rc<MountTable>,
    pub resources: Rc<RefCell<ResourceCache>>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::from_config(ResourceConfig::default())
    }
}

impl Engine {
    pub const NAME: &str = "Gena";

    /// Backend natif (système de fichiers de l'OS).
    pub fn from_config(config: ResourceConfig) -> Self {
        Engine::with_backend(Backend::native(), config)
    }

    pub fn with_backend(backend: Backend, config: ResourceConfig) -> Self {
        log::info!("Starting {} resources...", Self::NAME);

        let fs: Arc<dyn FileSystem> = backend.fs.clone();
        let mut mounts = MountTable::new(fs);
        for mount in config.mounts {
            mounts.mount(mount);
        }

        let backend = Rc::new(backend);
        let mounts = Rc::new(mounts);
        let resources = ResourceCache::new(backend.clone(), mounts.clone())
            .with_default_anti_aliasing(config.default_anti_aliasing);

        log::info!("Resources ready ({} mounts).", mounts.mounts().len());
        Engine {
            backend,
            mounts,
            resources: Rc::new(RefCell::new(resources)),
        }
    }

    /// Raccourci : monte uniquement `root` (utile pour les outils et les tests).
    pub fn with_root(root: impl Into<String>) -> Self {
        let config = ResourceConfig {
            mounts: vec![MountPoint::new("Root", root)],
            ..ResourceConfig::default()
        };
        Engine::from_config(config)
    }
}
