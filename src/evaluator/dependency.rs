//! Dependency tracking

use crate::program::FileId;
use indexmap::IndexSet;
use serde::Serialize;

/// Insertion-ordered set of the files consulted during one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencySet {
    files: IndexSet<FileId>,
}

impl DependencySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file; returns false if it was already present
    pub fn insert(&mut self, file: &FileId) -> bool {
        if self.files.contains(file) {
            return false;
        }
        self.files.insert(file.clone())
    }

    /// Merge another set, keeping this set's order for known files
    pub fn extend(&mut self, other: &DependencySet) {
        for file in &other.files {
            self.insert(file);
        }
    }

    /// Whether `file` was recorded
    pub fn contains(&self, file: &FileId) -> bool {
        self.files.contains(file)
    }

    /// Recorded files, in first-use order
    pub fn iter(&self) -> impl Iterator<Item = &FileId> {
        self.files.iter()
    }

    /// Number of recorded files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File names as strings, in first-use order
    pub fn to_strings(&self) -> Vec<String> {
        self.files.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a FileId;
    type IntoIter = indexmap::set::Iter<'a, FileId>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl IntoIterator for DependencySet {
    type Item = FileId;
    type IntoIter = indexmap::set::IntoIter<FileId>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<FileId> for DependencySet {
    fn from_iter<I: IntoIterator<Item = FileId>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut deps = DependencySet::new();
        assert!(deps.insert(&FileId::new("b.ts")));
        assert!(deps.insert(&FileId::new("a.ts")));
        assert!(!deps.insert(&FileId::new("b.ts")));

        let other: DependencySet = [FileId::new("c.ts"), FileId::new("a.ts")].into_iter().collect();
        deps.extend(&other);
        assert_eq!(deps.to_strings(), vec!["b.ts", "a.ts", "c.ts"]);
    }
}
