//! Source-tracking validation.

use crate::{Error, RegisteredArtifact};

/// Enforces that every generated file reports its originating sources when
/// incremental tracking is enabled.
///
/// A tracked artifact with an empty originating set is valid; only an
/// artifact that does not track at all is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTrackingValidator {
    enabled: bool,
}

impl SourceTrackingValidator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// # Errors
    ///
    /// Returns [`Error::MissingSourceTracking`] when tracking is enabled and
    /// the artifact has no originating-file set.
    pub fn validate(&self, artifact: &RegisteredArtifact) -> Result<(), Error> {
        if !self.enabled || artifact.is_tracked() {
            return Ok(());
        }
        Err(Error::MissingSourceTracking {
            generator: artifact.producer.clone(),
            path: artifact.path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use kiln_core::FileRef;

    use super::*;
    use crate::ArtifactSpec;

    fn artifact(spec: ArtifactSpec) -> RegisteredArtifact {
        RegisteredArtifact::new(spec, "Gen", Path::new("/out"), 0).unwrap()
    }

    #[test]
    fn test_disabled_accepts_untracked() {
        let validator = SourceTrackingValidator::new(false);
        assert!(validator.validate(&artifact(ArtifactSpec::new("a", "A.kt", ""))).is_ok());
    }

    #[test]
    fn test_enabled_rejects_untracked() {
        let validator = SourceTrackingValidator::new(true);
        let err = validator
            .validate(&artifact(ArtifactSpec::new("a", "A.kt", "")))
            .unwrap_err();

        match err {
            Error::MissingSourceTracking { generator, path } => {
                assert_eq!(generator, "Gen");
                assert_eq!(path, Path::new("/out/a/A.kt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_enabled_accepts_empty_tracking() {
        let validator = SourceTrackingValidator::new(true);
        let spec = ArtifactSpec::new("a", "A.kt", "").tracking_nothing();
        assert!(validator.validate(&artifact(spec)).is_ok());
    }

    #[test]
    fn test_enabled_accepts_tracked_sources() {
        let validator = SourceTrackingValidator::new(true);
        let spec = ArtifactSpec::new("a", "A.kt", "").tracking([FileRef::new("/src/A.kt")]);
        assert!(validator.validate(&artifact(spec)).is_ok());
    }
}
