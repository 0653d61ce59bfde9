//! Conflict resolution for artifacts written to the same logical path.

use crate::{Error, FileRegistry, RegisteredArtifact};

/// Outcome of submitting an artifact to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No artifact exists at this path yet; the candidate should be committed.
    New,
    /// An artifact with byte-identical content already exists.
    Identical,
}

/// Decides whether a candidate may be committed.
///
/// Identical content at the same path is accepted so several generators can
/// derive the same boilerplate. Divergent content is always an error: there
/// is no last-writer-wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    /// Compare `candidate` against what the registry holds at its path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateArtifact`] naming the candidate's producer
    /// when content differs.
    pub fn resolve(
        &self,
        registry: &FileRegistry,
        candidate: &RegisteredArtifact,
    ) -> Result<Resolution, Error> {
        let Some(existing) = registry.get(&candidate.logical_path) else {
            return Ok(Resolution::New);
        };

        if existing.content_hash == candidate.content_hash && existing.content == candidate.content
        {
            Ok(Resolution::Identical)
        } else {
            Err(Error::DuplicateArtifact {
                generator: candidate.producer.clone(),
                existing_generator: existing.producer.clone(),
                path: candidate.path.clone(),
            })
        }
    }
}
