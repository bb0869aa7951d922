//! Accès au système de fichiers utilisé par la résolution de chemins et le chargement.
//!
//! - `FileSystem` est un trait objet (Send + Sync) : tests d'existence, lecture d'octets,
//!   listing de répertoires (pour les suggestions "did you mean").
//! - `Ofs` mappe vers le système de fichiers de l'OS, sous une racine optionnelle.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Trait minimal pour un filesystem.
/// Les chemins relatifs sont résolus depuis la racine du filesystem.
pub trait FileSystem: Send + Sync + 'static {
    /// Vrai si un fichier régulier existe à ce chemin.
    fn file_exists(&self, path: &Path) -> bool;

    /// Vrai si un répertoire existe à ce chemin.
    fn directory_exists(&self, path: &Path) -> bool;

    /// Lis un fichier en tant que bytes bruts.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Noms des entrées d'un répertoire (triés).
    fn list_directory(&self, path: &Path) -> Result<Vec<String>>;

    /// Nom (pour debug).
    fn name(&self) -> &str;
}

/// Implementation basique qui mappe vers le système de fichiers OS.
/// Le `root` définit le répertoire racine de ce filesystem ("" = répertoire courant).
pub struct Ofs {
    root: PathBuf,
    name: String,
}

impl Ofs {
    /// Crée un Ofs pointant vers `root`.
    /// Exemple : `Ofs::new("/home/me/game", "game")`
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Ofs {
            root: root.into(),
            name: name.into(),
        }
    }

    /// Ofs sans racine : les chemins sont utilisés tels quels.
    pub fn native() -> Self {
        Ofs::new(PathBuf::new(), "os")
    }

    /// Résout un chemin relatif en chemin sur le FS.
    fn resolve_path(&self, rel: &Path) -> PathBuf {
        if rel.is_absolute() || self.root.as_os_str().is_empty() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl FileSystem for Ofs {
    fn file_exists(&self, path: &Path) -> bool {
        self.resolve_path(path).is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.resolve_path(path).is_dir()
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let abs = self.resolve_path(path);
        std::fs::read(&abs).with_context(|| format!("Ofs({}) failed to read {:?}", self.name, abs))
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<String>> {
        let abs = self.resolve_path(path);
        let entries = std::fs::read_dir(&abs)
            .with_context(|| format!("Ofs({}) failed to list {:?}", self.name, abs))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Ofs({}) failed to list {:?}", self.name, abs))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
