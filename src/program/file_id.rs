//! Source file identifiers

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Identifier of a source file inside a program graph.
///
/// For disk programs this is the normalized absolute path; for in-memory
/// programs it is the virtual file name. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Create a file identifier
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Identifier used for errors that are not tied to a source file
    pub fn unknown() -> Self {
        Self::new("unknown")
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as a path
    pub fn as_path(&self) -> &Path {
        Path::new(self.as_str())
    }

    /// Whether this is a TypeScript declaration file (`.d.ts`, `.d.mts`, `.d.cts`)
    pub fn is_declaration(&self) -> bool {
        let name = self.as_str();
        name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FileId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Path> for FileId {
    fn from(value: &Path) -> Self {
        Self::new(value.to_string_lossy())
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl serde::Serialize for FileId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_detection() {
        assert!(FileId::new("/project/types.d.ts").is_declaration());
        assert!(FileId::new("/project/types.d.mts").is_declaration());
        assert!(!FileId::new("/project/index.ts").is_declaration());
        assert!(!FileId::new("/project/d.ts.backup.ts").is_declaration());
    }
}
