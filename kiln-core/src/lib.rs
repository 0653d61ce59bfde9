//! Core utilities and types for the Kiln code generation orchestrator.
//!
//! This crate provides fundamental types shared by the declaration model
//! and the generation pipeline: file references, content hashing, the
//! generated-sources directory layout and file writing.

mod file;
mod file_ref;
mod hash;
mod layout;

// File operations
pub use file::{WriteResult, write_file};
// Fundamental types
pub use file_ref::FileRef;
pub use hash::ContentHash;
// Layout
pub use layout::{ArtifactLocation, LayoutError};
