//! Source hosts: where program files come from

use super::FileId;
use super::resolver::normalize_path;
use crate::error::{ConfError, ConfResult};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Read-only access to source files
pub trait SourceHost {
    /// Whether a file exists at `path`
    fn file_exists(&self, path: &Path) -> bool;

    /// Read the whole file at `path`
    fn read_file(&self, path: &Path) -> ConfResult<String>;

    /// Files matching an absolute glob pattern, in a stable order
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;
}

/// Host backed by the file system
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskHost;

impl SourceHost for DiskHost {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_file(&self, path: &Path) -> ConfResult<String> {
        std::fs::read_to_string(path).map_err(|e| ConfError::io(FileId::from(path), &e))
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let Ok(paths) = glob::glob(pattern) else {
            log::warn!("Ignoring invalid include pattern: {pattern}");
            return Vec::new();
        };
        let mut matches: Vec<PathBuf> = paths
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .map(|p| normalize_path(&p))
            .collect();
        matches.sort();
        matches
    }
}

/// Host serving an in-memory file map
///
/// File names are normalized on insertion, so `./a.ts` and `a.ts` name the
/// same file.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    files: IndexMap<PathBuf, String>,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, name: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(normalize_path(name.as_ref()), text.into());
    }

    /// Add a file, builder style
    pub fn with_file(mut self, name: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Names of all files, in insertion order
    pub fn file_names(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the host holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryHost
where
    K: AsRef<Path>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut host = MemoryHost::new();
        for (name, text) in iter {
            host.insert(name, text);
        }
        host
    }
}

impl SourceHost for MemoryHost {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn read_file(&self, path: &Path) -> ConfResult<String> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| {
                let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
                ConfError::io(FileId::from(path), &error)
            })
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let Ok(pattern) = glob::Pattern::new(pattern) else {
            log::warn!("Ignoring invalid include pattern: {pattern}");
            return Vec::new();
        };
        let mut matches: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|name| pattern.matches_path(name))
            .cloned()
            .collect();
        matches.sort();
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_memory_host_normalizes_names() {
        let host = MemoryHost::new()
            .with_file("./src/index.ts", "export default 1;")
            .with_file("/abs/b.ts", "");
        assert!(host.file_exists(Path::new("src/index.ts")));
        assert!(host.file_exists(Path::new("src/../src/./index.ts")));
        assert!(host.file_exists(Path::new("/abs/b.ts")));
        assert_eq!(
            host.read_file(Path::new("src/index.ts")).unwrap(),
            "export default 1;"
        );
        let err = host.read_file(Path::new("missing.ts")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_memory_host_glob() {
        let host: MemoryHost = [
            ("/p/src/a.ts", ""),
            ("/p/src/nested/b.ts", ""),
            ("/p/readme.md", ""),
        ]
        .into_iter()
        .collect();
        let found = host.glob("/p/**/*.ts");
        assert_eq!(
            found,
            vec![PathBuf::from("/p/src/a.ts"), PathBuf::from("/p/src/nested/b.ts")]
        );
    }

    #[test]
    fn test_disk_host_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("conf.ts");
        std::fs::write(&file, "export default {};").unwrap();
        let host = DiskHost;
        assert!(host.file_exists(&file));
        assert!(!host.file_exists(&dir.path().join("other.ts")));
        assert_eq!(host.read_file(&file).unwrap(), "export default {};");
        let pattern = format!("{}/**/*.ts", dir.path().display());
        assert_eq!(host.glob(&pattern).len(), 1);
    }
}
