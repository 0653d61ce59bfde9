//! File registry: every artifact accepted during one compilation.
//!
//! The registry is keyed by logical path, so at most one artifact is
//! accepted per path. Whether a new submission may be accepted is decided by
//! the [`ConflictResolver`](crate::ConflictResolver); the registry itself only
//! stores.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = FileRegistry::new();
//! match ConflictResolver.resolve(&registry, &artifact)? {
//!     Resolution::New => registry.commit(artifact),
//!     Resolution::Identical => {}
//! }
//! ```

use indexmap::IndexMap;

use crate::RegisteredArtifact;

/// Registry of committed artifacts, in commit order.
#[derive(Debug, Default)]
pub struct FileRegistry {
    entries: IndexMap<String, RegisteredArtifact>,
}

impl FileRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an accepted artifact.
    ///
    /// Callers must have resolved conflicts first; committing a path twice
    /// keeps the first entry.
    pub fn commit(&mut self, artifact: RegisteredArtifact) {
        self.entries
            .entry(artifact.logical_path.clone())
            .or_insert(artifact);
    }

    /// Get the artifact registered under a logical path.
    pub fn get(&self, logical_path: &str) -> Option<&RegisteredArtifact> {
        self.entries.get(logical_path)
    }

    pub fn contains(&self, logical_path: &str) -> bool {
        self.entries.contains_key(logical_path)
    }

    /// All artifacts in commit order.
    pub fn artifacts(&self) -> impl Iterator<Item = &RegisteredArtifact> {
        self.entries.values()
    }

    /// Artifacts committed during `round`.
    pub fn committed_in(&self, round: usize) -> impl Iterator<Item = &RegisteredArtifact> {
        self.entries.values().filter(move |a| a.round == round)
    }

    /// Get the number of registered artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the registry, yielding artifacts in commit order.
    pub fn into_artifacts(self) -> Vec<RegisteredArtifact> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::ArtifactSpec;

    fn artifact(package: &str, name: &str, content: &str, round: usize) -> RegisteredArtifact {
        RegisteredArtifact::new(
            ArtifactSpec::new(package, name, content),
            "Gen",
            Path::new("/out"),
            round,
        )
        .unwrap()
    }

    #[test]
    fn test_commit_and_lookup() {
        let mut registry = FileRegistry::new();
        registry.commit(artifact("a.b", "A.kt", "class A", 0));

        assert!(registry.contains("a/b/A.kt"));
        assert_eq!(registry.get("a/b/A.kt").map(|a| a.content.as_str()), Some("class A"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_commit_order_preserved() {
        let mut registry = FileRegistry::new();
        registry.commit(artifact("z", "Z.kt", "", 0));
        registry.commit(artifact("a", "A.kt", "", 0));
        registry.commit(artifact("m", "M.kt", "", 1));

        let paths: Vec<_> = registry.artifacts().map(|a| a.logical_path.as_str()).collect();
        assert_eq!(paths, vec!["z/Z.kt", "a/A.kt", "m/M.kt"]);

        let round_one: Vec<_> = registry.committed_in(1).map(|a| a.logical_path.as_str()).collect();
        assert_eq!(round_one, vec!["m/M.kt"]);
    }

    #[test]
    fn test_second_commit_keeps_first() {
        let mut registry = FileRegistry::new();
        registry.commit(artifact("a", "A.kt", "first", 0));
        registry.commit(artifact("a", "A.kt", "second", 1));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a/A.kt").map(|a| a.content.as_str()), Some("first"));
    }
}
