use std::path::Path;

use eyre::Result;

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already held the exact same bytes and was left untouched
    Unchanged,
}

/// Write `content` to `path`, creating parent directories as needed.
///
/// Identical content already on disk is not rewritten so that repeated
/// generation rounds keep modification times stable.
pub fn write_file(path: &Path, content: &str) -> Result<WriteResult> {
    if let Ok(existing) = std::fs::read(path)
        && existing == content.as_bytes()
    {
        return Ok(WriteResult::Unchanged);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(WriteResult::Written)
}
