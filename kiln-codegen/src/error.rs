//! Fatal generation errors.

use std::path::PathBuf;

use kiln_core::LayoutError;
use miette::Diagnostic;
use thiserror::Error;

/// A fatal problem detected while generating code.
///
/// The wording of [`Error::DuplicateArtifact`] and
/// [`Error::MissingSourceTracking`] is relied upon by build tooling and must
/// stay stable.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(
        "There were duplicate generated files. Generating and overwriting the same file leads to unexpected results.\n\nThe file was generated by: {generator}\nThe file is: {path}"
    )]
    #[diagnostic(code(kiln::duplicate_artifact))]
    DuplicateArtifact {
        /// The generator attempting the conflicting write.
        generator: String,
        /// The generator whose file was accepted first.
        existing_generator: String,
        path: PathBuf,
    },

    #[error(
        "Source file tracking is enabled but this generated file is not tracking them.\nPlease report this issue to the code generator's maintainers.\n\nThe file was generated by: {generator}\nThe file is: {path}\n\nTo stop this error, disable the `track-source-files` setting in kiln.toml:\n\n   # kiln.toml\n   [generation]\n   track-source-files = false\n\nor disable the property in `kiln.properties`:\n\n   # kiln.properties\n   kiln.trackSourceFiles=false\n"
    )]
    #[diagnostic(code(kiln::missing_source_tracking))]
    MissingSourceTracking { generator: String, path: PathBuf },

    #[error("code generator {generator} failed while {stage} {declaration}: {message}")]
    #[diagnostic(code(kiln::generator_fault))]
    GeneratorFault {
        generator: String,
        stage: Stage,
        declaration: String,
        message: String,
    },

    #[error(
        "code generator {generator} emitted an invalid file location (package '{package}', file '{file_name}'): {reason}"
    )]
    #[diagnostic(
        code(kiln::invalid_artifact_path),
        help("packages are dotted identifiers and file names a single path component")
    )]
    InvalidArtifactPath {
        generator: String,
        package: String,
        file_name: String,
        reason: LayoutError,
    },

    #[error("failed to read declarations from '{path}': {message}")]
    #[diagnostic(code(kiln::ingest))]
    Ingest { path: PathBuf, message: String },

    #[error("failed to write generated file '{path}': {message}")]
    #[diagnostic(code(kiln::io))]
    Io { path: PathBuf, message: String },

    #[error("plugin {plugin} aborted generation: {message}")]
    #[diagnostic(code(kiln::plugin))]
    Plugin {
        plugin: &'static str,
        message: String,
    },

    #[error("code generation did not reach a fixed point within {max_rounds} productive rounds")]
    #[diagnostic(
        code(kiln::round_limit),
        help("a generator keeps producing new files; fix it or raise `max-rounds` in kiln.toml")
    )]
    RoundLimitExceeded { max_rounds: usize },
}

/// Which generator callback faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Applicability,
    Generation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Applicability => write!(f, "checking applicability of"),
            Stage::Generation => write!(f, "generating code for"),
        }
    }
}

/// Terminal failure of a generation run.
///
/// Carries every error drained from the round that failed, not only the
/// first one.
#[derive(Debug, Error, Diagnostic)]
#[error("code generation failed in round {round}")]
#[diagnostic(code(kiln::compilation_error))]
pub struct CompilationError {
    pub round: usize,
    #[related]
    pub errors: Vec<Error>,
}

impl CompilationError {
    pub fn new(round: usize, errors: Vec<Error>) -> Self {
        Self { round, errors }
    }

    /// All error messages, separated by blank lines.
    pub fn messages(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
