//! Generated artifacts, before and after registration.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use eyre::Result;
use kiln_core::{ArtifactLocation, ContentHash, FileRef, LayoutError};
use kiln_decl::{SourceLanguage, SourceScanner};
use serde::Serialize;

use crate::Error;

/// A file a generator wants to emit.
///
/// `originating_files` is deliberately tri-state:
/// - `None`: the generator does not take part in source tracking,
/// - `Some(∅)`: tracked, derived from no source file,
/// - `Some(files)`: tracked, invalidated when any of `files` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    /// Dotted package (namespace) of the generated file.
    pub package: String,
    /// File name including extension, e.g. `Abc.kt`.
    pub file_name: String,
    pub content: String,
    pub originating_files: Option<BTreeSet<FileRef>>,
}

impl ArtifactSpec {
    /// Create an untracked artifact.
    pub fn new(
        package: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            file_name: file_name.into(),
            content: content.into(),
            originating_files: None,
        }
    }

    /// Derive package and file name from generated source text: the file is
    /// named after its first top-level declaration.
    ///
    /// Returns `Ok(None)` when the text declares no type.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar for `extension` cannot be loaded.
    pub fn from_source(content: impl Into<String>, extension: &str) -> Result<Option<Self>> {
        let content = content.into();
        let language = SourceLanguage::from_extension(extension);
        let Some((package, short_name)) = SourceScanner.primary_type(&content, language)? else {
            return Ok(None);
        };
        Ok(Some(Self::new(
            package,
            format!("{short_name}.{extension}"),
            content,
        )))
    }

    /// Track the given originating files.
    pub fn tracking(mut self, files: impl IntoIterator<Item = FileRef>) -> Self {
        self.originating_files
            .get_or_insert_with(BTreeSet::new)
            .extend(files);
        self
    }

    /// Take part in source tracking without deriving from any file.
    pub fn tracking_nothing(mut self) -> Self {
        self.originating_files.get_or_insert_with(BTreeSet::new);
        self
    }

    /// Validated location below the generated-sources root.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] for package segments that are not
    /// identifiers and file names that are not a single path component.
    pub fn location(&self) -> Result<ArtifactLocation, LayoutError> {
        ArtifactLocation::new(&self.package, &self.file_name)
    }
}

/// An artifact accepted (or about to be judged) by the file registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredArtifact {
    pub logical_path: String,
    /// Absolute location below the generated-sources root.
    pub path: PathBuf,
    pub content_hash: ContentHash,
    #[serde(skip)]
    pub content: String,
    /// Name of the generator that produced it.
    pub producer: String,
    pub originating_files: Option<BTreeSet<FileRef>>,
    /// The round in which the artifact was committed.
    pub round: usize,
}

impl RegisteredArtifact {
    /// Place `spec` below `output_root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArtifactPath`] when the spec's package or file
    /// name cannot be laid out.
    pub fn new(
        spec: ArtifactSpec,
        producer: &str,
        output_root: &Path,
        round: usize,
    ) -> std::result::Result<Self, Error> {
        let location = spec.location().map_err(|reason| Error::InvalidArtifactPath {
            generator: producer.to_string(),
            package: spec.package.clone(),
            file_name: spec.file_name.clone(),
            reason,
        })?;

        Ok(Self {
            logical_path: location.logical_path(),
            path: output_root.join(location.relative_path()),
            content_hash: ContentHash::of(&spec.content),
            content: spec.content,
            producer: producer.to_string(),
            originating_files: spec.originating_files,
            round,
        })
    }

    pub fn is_tracked(&self) -> bool {
        self.originating_files.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(spec: ArtifactSpec) -> std::result::Result<RegisteredArtifact, Error> {
        RegisteredArtifact::new(spec, "Gen", Path::new("/project/build/kiln"), 0)
    }

    #[test]
    fn test_location() {
        let spec = ArtifactSpec::new("generated.com.squareup.test", "Abc.kt", "class Abc");
        let location = spec.location().unwrap();
        assert_eq!(location.logical_path(), "generated/com/squareup/test/Abc.kt");
        assert_eq!(
            location.relative_path(),
            PathBuf::from("generated").join("com/squareup/test/Abc.kt")
        );
    }

    #[test]
    fn test_tracking_states() {
        let untracked = ArtifactSpec::new("a", "A.kt", "");
        assert_eq!(untracked.originating_files, None);

        let empty = ArtifactSpec::new("a", "A.kt", "").tracking_nothing();
        assert_eq!(empty.originating_files, Some(BTreeSet::new()));

        let tracked = ArtifactSpec::new("a", "A.kt", "")
            .tracking([FileRef::new("/src/B.kt")])
            .tracking([FileRef::new("/src/C.kt")]);
        assert_eq!(tracked.originating_files.map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_from_source_uses_first_declaration() {
        let spec = ArtifactSpec::from_source(
            "package generated.com.squareup.test\n\nclass Abc\n\nprivate const val abc = \"x\"\n",
            "kt",
        )
        .unwrap()
        .unwrap();

        assert_eq!(spec.package, "generated.com.squareup.test");
        assert_eq!(spec.file_name, "Abc.kt");
    }

    #[test]
    fn test_from_source_reads_string_templates() {
        let spec = ArtifactSpec::from_source(
            "package a\n\nprivate val x = \"${listOf(\"}\").size} class Fake {\"\n\nclass Real\n",
            "kt",
        )
        .unwrap()
        .unwrap();

        assert_eq!(spec.file_name, "Real.kt");
    }

    #[test]
    fn test_from_source_java() {
        let spec = ArtifactSpec::from_source("package a.b;\n\npublic final class Impl {}\n", "java")
            .unwrap()
            .unwrap();

        assert_eq!(spec.package, "a.b");
        assert_eq!(spec.file_name, "Impl.java");
    }

    #[test]
    fn test_from_source_without_declaration() {
        let spec = ArtifactSpec::from_source("package a\n\nfun main() {}\n", "kt").unwrap();
        assert!(spec.is_none());
    }

    #[test]
    fn test_registered_artifact_resolves_absolute_path() {
        let spec = ArtifactSpec::new("com.squareup.test", "Abc.kt", "class Abc");
        let artifact = register(spec).unwrap();

        assert_eq!(artifact.logical_path, "com/squareup/test/Abc.kt");
        assert_eq!(
            artifact.path,
            Path::new("/project/build/kiln/com/squareup/test/Abc.kt")
        );
        assert_eq!(artifact.content_hash, ContentHash::of("class Abc"));
        assert!(!artifact.is_tracked());
    }

    #[test]
    fn test_parent_traversal_is_rejected() {
        let err = register(ArtifactSpec::new("a.b", "../C.kt", "// two")).unwrap_err();

        match err {
            Error::InvalidArtifactPath {
                generator,
                file_name,
                reason,
                ..
            } => {
                assert_eq!(generator, "Gen");
                assert_eq!(file_name, "../C.kt");
                assert_eq!(reason, LayoutError::FileNameNotAComponent("../C.kt".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_absolute_file_name_is_rejected() {
        let err = register(ArtifactSpec::new("a", "/tmp/outside.kt", "")).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifactPath { .. }));
    }
}
