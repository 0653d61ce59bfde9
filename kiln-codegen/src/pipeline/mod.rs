//! Multi-round generation pipeline.
//!
//! This module provides the [`MergeDriver`], which runs registered
//! generators over the declarations of a compilation until a fixed point is
//! reached. The driver provides:
//!
//! - Explicit rounds (declarations generated in round *n* are visible from *n + 1*)
//! - Conflict detection and source-tracking validation at commit time
//! - Plugin hooks around each round
//! - Non-fatal diagnostics collected in the [`GenerationReport`]
//!
//! # Example
//!
//! ```ignore
//! use kiln_codegen::pipeline::MergeDriver;
//!
//! let config = KilnToml::load(&project_dir)?;
//! let report = MergeDriver::new(&config, &project_dir)
//!     .generator(FactoryGenerator)
//!     .run(&sources)?;
//!
//! for diag in &report.diagnostics {
//!     if diag.severity.is_warning() {
//!         eprintln!("warning: {}", diag.message);
//!     }
//! }
//! ```

mod diagnostic;
mod driver;
mod plugin;
mod report;
mod snapshot;
mod state;

pub use diagnostic::{Diagnostic, Severity};
pub use driver::MergeDriver;
pub use plugin::Plugin;
pub use report::{GenerationReport, GeneratorStats, RoundSummary};
pub use snapshot::{RoundSnapshot, SnapshotPlugin};
pub use state::GenerationState;
