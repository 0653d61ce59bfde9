//! Generated-sources directory layout.
//!
//! Every generated file is addressed by a package and a file name. Both are
//! validated once and the registry key and the on-disk path are derived
//! from the same segments, so two keys never name the same file and nothing
//! is written outside the generated root.

use std::path::PathBuf;

use thiserror::Error;

/// Why a package or file name cannot be placed below the generated root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("file name is empty")]
    EmptyFileName,
    #[error("file name '{0}' must be a single path component")]
    FileNameNotAComponent(String),
    #[error("package segment '{0}' is not an identifier")]
    InvalidPackageSegment(String),
}

/// A validated location below the generated-sources root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactLocation {
    segments: Vec<String>,
    file_name: String,
}

impl ArtifactLocation {
    /// Validate a dotted package and a file name.
    ///
    /// The root package (empty string) has no directories. Every other
    /// package segment must be an identifier; the file name must be one
    /// plain path component.
    pub fn new(package: &str, file_name: &str) -> Result<Self, LayoutError> {
        let segments = if package.is_empty() {
            Vec::new()
        } else {
            package
                .split('.')
                .map(|segment| {
                    if is_identifier(segment) {
                        Ok(segment.to_string())
                    } else {
                        Err(LayoutError::InvalidPackageSegment(segment.to_string()))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        if file_name.is_empty() {
            return Err(LayoutError::EmptyFileName);
        }
        if matches!(file_name, "." | "..")
            || file_name.contains(['/', '\\', ':', '\0'])
        {
            return Err(LayoutError::FileNameNotAComponent(file_name.to_string()));
        }

        Ok(Self {
            segments,
            file_name: file_name.to_string(),
        })
    }

    /// Logical path: package directories plus file name, always joined with
    /// `/` so the key is identical on every platform.
    pub fn logical_path(&self) -> String {
        self.segments
            .iter()
            .map(String::as_str)
            .chain([self.file_name.as_str()])
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Path relative to the generated root.
    pub fn relative_path(&self) -> PathBuf {
        self.segments
            .iter()
            .map(String::as_str)
            .chain([self.file_name.as_str()])
            .collect()
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
