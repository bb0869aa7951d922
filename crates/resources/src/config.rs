use std::path::Path;

use serde::Deserialize;

use crate::{MountPoint, Result};

/// Startup configuration of the resource layer.
///
/// ```json
/// {
///     "default_anti_aliasing": true,
///     "mounts": [
///         { "name": "Mods", "base_path": "mods/foo" },
///         { "name": "Assets", "base_path": "assets" }
///     ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub default_anti_aliasing: bool,
    /// Highest priority first.
    pub mounts: Vec<MountPoint>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            default_anti_aliasing: false,
            mounts: vec![
                MountPoint::new("Assets", "assets"),
                MountPoint::new("Engine", "engine"),
            ],
        }
    }
}

impl ResourceConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&source)
    }
}
