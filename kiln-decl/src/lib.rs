//! Declaration model for the Kiln code generation orchestrator.
//!
//! Generators never see source text directly. They observe [`Declaration`]s:
//! read-only views of the top-level types of the compilation unit, produced
//! by a [`DeclarationSource`] and kept in an append-only
//! [`DeclarationStore`].
//!
//! # Architecture
//!
//! ```text
//! SourceFile → DeclarationSource (ingest) → DeclarationDraft → DeclarationStore → generators
//!                       ↑                                                            │
//!                       └──────────────── generated artifacts ───────────────────────┘
//! ```

mod declaration;
mod scanner;
mod source;
mod store;

pub use declaration::{Annotation, DeclId, Declaration, DeclarationDraft, DeclarationKind};
pub use scanner::{SourceLanguage, SourceScanner};
pub use source::{DeclarationSource, SourceFile};
pub use store::DeclarationStore;
