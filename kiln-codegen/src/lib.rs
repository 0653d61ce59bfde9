//! Multi-round code generation for Kiln.
//!
//! Independent [`CodeGenerator`]s are run over the declarations of one
//! compilation. Files they emit are re-read as new declarations, so
//! generators can build on each other's output until a fixed point is
//! reached.
//!
//! # Module Organization
//!
//! - [`generator`] - The generator capability interface
//! - [`artifact`] - Artifacts as emitted and as registered
//! - [`registry`] - The file registry of one compilation
//! - [`resolve`] - Duplicate-path conflict resolution
//! - [`tracking`] - Source-tracking validation
//! - [`pipeline`] - The merge driver and its plugins
//! - [`testing`] - Test utilities (feature-gated)

pub mod artifact;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod registry;
pub mod resolve;
pub mod tracking;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use artifact::{ArtifactSpec, RegisteredArtifact};
pub use error::{CompilationError, Error, Stage};
pub use generator::{CodeGenerator, RoundContext};
pub use pipeline::{
    Diagnostic, GenerationReport, GenerationState, GeneratorStats, MergeDriver, Plugin,
    RoundSnapshot, RoundSummary, Severity, SnapshotPlugin,
};
pub use registry::FileRegistry;
pub use resolve::{ConflictResolver, Resolution};
pub use tracking::SourceTrackingValidator;
