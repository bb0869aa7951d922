//! Logical asset paths resolved against an ordered table of mount points.
//!
//! The first mount (in registration order) holding a matching entry wins.

use std::{fmt, path::Path, rc::Rc, sync::Arc};

use serde::Deserialize;

use crate::{FileSystem, ResourceError, Result, strings};

pub const SEPARATOR: char = '/';

/// A named search root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MountPoint {
    pub name: String,
    pub base_path: String,
}

impl MountPoint {
    pub fn new(name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
        }
    }

    /// `base_path/relative`, without a leading separator when the base is empty.
    pub fn compose(&self, relative: &str) -> String {
        if self.base_path.is_empty() {
            relative.to_owned()
        } else {
            format!("{}{}{}", self.base_path, SEPARATOR, relative)
        }
    }
}

/// What kind of entry a resolution accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    Either,
}

impl PathKind {
    fn accepts_file(self) -> bool {
        matches!(self, PathKind::File | PathKind::Either)
    }

    fn accepts_directory(self) -> bool {
        matches!(self, PathKind::Directory | PathKind::Either)
    }
}

/// Outcome of resolving a logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindResult {
    query: String,
    found: Option<(String, String)>,
}

impl FindResult {
    fn not_found(query: &str) -> Self {
        Self {
            query: query.to_owned(),
            found: None,
        }
    }

    pub fn success(&self) -> bool {
        self.found.is_some()
    }

    /// The resolved location, or `""` when nothing matched.
    pub fn path(&self) -> &str {
        self.found.as_ref().map_or("", |(_, path)| path.as_str())
    }

    /// Name of the mount that provided the match.
    pub fn mount(&self) -> Option<&str> {
        self.found.as_ref().map(|(mount, _)| mount.as_str())
    }

    /// The logical path that was searched for.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Ordered list of mount points plus the filesystem used to probe them.
pub struct MountTable {
    mounts: Vec<MountPoint>,
    fs: Arc<dyn FileSystem>,
}

impl MountTable {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            mounts: Vec::new(),
            fs,
        }
    }

    pub fn with_mounts(fs: Arc<dyn FileSystem>, mounts: impl IntoIterator<Item = MountPoint>) -> Self {
        Self {
            mounts: mounts.into_iter().collect(),
            fs,
        }
    }

    /// Registers a mount with the lowest priority so far.
    pub fn mount(&mut self, mount: MountPoint) {
        log::debug!("[MountTable] Mounting {} at {:?}", mount.name, mount.base_path);
        self.mounts.push(mount);
    }

    pub fn mounts(&self) -> &[MountPoint] {
        &self.mounts
    }

    pub fn base_paths(&self) -> Vec<String> {
        self.mounts.iter().map(|m| m.base_path.clone()).collect()
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn resolve(&self, logical: &str, kind: PathKind) -> FindResult {
        for mount in &self.mounts {
            let candidate = mount.compose(logical);
            let path = Path::new(&candidate);
            if (kind.accepts_file() && self.fs.file_exists(path))
                || (kind.accepts_directory() && self.fs.directory_exists(path))
            {
                return FindResult {
                    query: logical.to_owned(),
                    found: Some((mount.name.clone(), candidate)),
                };
            }
        }
        FindResult::not_found(logical)
    }
}

impl fmt::Debug for MountTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountTable")
            .field("mounts", &self.mounts)
            .field("fs", &self.fs.name())
            .finish()
    }
}

/// Engine-level asset identifier bound to a mount table.
#[derive(Clone)]
pub struct LogicalPath {
    path: String,
    mounts: Rc<MountTable>,
}

impl LogicalPath {
    pub fn new(mounts: Rc<MountTable>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mounts,
        }
    }

    pub fn set(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    /// A new path with `segment` appended, inserting a separator only if needed.
    pub fn add(&self, segment: &str) -> LogicalPath {
        let needs_separator = !self.path.is_empty() && !self.path.ends_with(SEPARATOR);
        let mut path = self.path.clone();
        if needs_separator {
            path.push(SEPARATOR);
        }
        path.push_str(segment);
        LogicalPath::new(self.mounts.clone(), path)
    }

    /// Final segment of the path, `""` for an empty path.
    pub fn last(&self) -> &str {
        strings::split(&self.path, "/").last().copied().unwrap_or("")
    }

    /// This path prefixed by the base path of the mount at `index`.
    pub fn path_at(&self, index: usize) -> Result<LogicalPath> {
        let mount = self
            .mounts
            .mounts()
            .get(index)
            .ok_or_else(|| ResourceError::UnknownMountIndex {
                index,
                path: self.path.clone(),
            })?;
        Ok(LogicalPath::new(self.mounts.clone(), mount.base_path.clone()).add(&self.path))
    }

    pub fn find(&self, kind: PathKind) -> FindResult {
        self.mounts.resolve(&self.path, kind)
    }

    pub fn find_file(&self) -> FindResult {
        self.find(PathKind::File)
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn mounts(&self) -> &Rc<MountTable> {
        &self.mounts
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl PartialEq for LogicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for LogicalPath {}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl fmt::Debug for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LogicalPath").field(&self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::Ofs;

    fn table(roots: &[(&str, &Path)]) -> Rc<MountTable> {
        Rc::new(MountTable::with_mounts(
            Arc::new(Ofs::native()),
            roots
                .iter()
                .map(|(name, root)| MountPoint::new(*name, root.to_string_lossy())),
        ))
    }

    #[test]
    fn first_mount_wins() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        std::fs::write(dir_a.path().join("x.png"), "from_a").unwrap();
        std::fs::write(dir_b.path().join("x.png"), "from_b").unwrap();

        let mounts = table(&[("A", dir_a.path()), ("B", dir_b.path())]);
        let found = mounts.resolve("x.png", PathKind::File);

        assert!(found.success());
        assert_eq!(found.mount(), Some("A"));
        assert_eq!(std::fs::read_to_string(found.path()).unwrap(), "from_a");
    }

    #[test]
    fn falls_through_to_later_mounts() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        std::fs::write(dir_b.path().join("only_b.png"), "b").unwrap();

        let mounts = table(&[("A", dir_a.path()), ("B", dir_b.path())]);
        let found = LogicalPath::new(mounts, "only_b.png").find_file();
        assert_eq!(found.mount(), Some("B"));
    }

    #[test]
    fn kind_filters_entries() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sprites")).unwrap();
        std::fs::write(dir.path().join("hero.png"), "h").unwrap();
        let mounts = table(&[("A", dir.path())]);

        assert!(!mounts.resolve("sprites", PathKind::File).success());
        assert!(mounts.resolve("sprites", PathKind::Directory).success());
        assert!(mounts.resolve("sprites", PathKind::Either).success());
        assert!(!mounts.resolve("hero.png", PathKind::Directory).success());
        assert!(mounts.resolve("hero.png", PathKind::Either).success());

        let missing = mounts.resolve("nope.png", PathKind::Either);
        assert!(!missing.success());
        assert_eq!(missing.path(), "");
        assert_eq!(missing.query(), "nope.png");
    }

    #[test]
    fn empty_base_path_has_no_separator() {
        assert_eq!(MountPoint::new("root", "").compose("a/b.png"), "a/b.png");
        assert_eq!(MountPoint::new("game", "game").compose("a/b.png"), "game/a/b.png");
    }

    #[test]
    fn add_set_and_last() {
        let mounts = Rc::new(MountTable::new(Arc::new(Ofs::native())));
        let root = LogicalPath::new(mounts.clone(), "");
        assert_eq!(root.add("sprites").as_str(), "sprites");

        let sprites = LogicalPath::new(mounts.clone(), "sprites/");
        assert_eq!(sprites.add("hero.png").as_str(), "sprites/hero.png");

        let mut path = LogicalPath::new(mounts, "sprites").add("hero.png");
        assert_eq!(path.last(), "hero.png");
        assert_eq!(path, path.clone());

        path.set("fonts/arial.ttf");
        assert_eq!(path.to_string(), "fonts/arial.ttf");
        assert_eq!(path.last(), "arial.ttf");

        path.set("");
        assert_eq!(path.last(), "");
    }

    #[test]
    fn path_at_mount_index() {
        let mounts = Rc::new(MountTable::with_mounts(
            Arc::new(Ofs::native()),
            [MountPoint::new("Assets", "assets"), MountPoint::new("Root", "")],
        ));
        let path = LogicalPath::new(mounts, "sprites/hero.png");
        assert_eq!(path.path_at(0).unwrap().as_str(), "assets/sprites/hero.png");
        assert_eq!(path.path_at(1).unwrap().as_str(), "sprites/hero.png");
        assert!(matches!(
            path.path_at(2),
            Err(ResourceError::UnknownMountIndex { index: 2, .. })
        ));
    }
}
