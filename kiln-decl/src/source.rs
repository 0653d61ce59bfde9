use std::path::Path;

use eyre::Result;
use kiln_core::FileRef;

use crate::DeclarationDraft;

/// A source file handed to a [`DeclarationSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: FileRef,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        Self {
            path: FileRef::new(path),
            content: content.into(),
        }
    }

    /// Read a source file from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(path, content))
    }
}

/// Turns source text into declarations.
///
/// The merge driver calls [`ingest`](DeclarationSource::ingest) once for
/// every original source before the first round, and again for every newly
/// committed artifact between rounds. Implementations must not retain
/// mutable state that changes already returned declarations.
pub trait DeclarationSource: Send + Sync {
    /// Parse `file` and return the top-level declarations it contains.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be understood at all.
    fn ingest(&self, file: &SourceFile) -> Result<Vec<DeclarationDraft>>;
}
