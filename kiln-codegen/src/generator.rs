//! The generator capability interface.

use std::sync::Arc;

use eyre::Result;
use kiln_decl::Declaration;

use crate::ArtifactSpec;

/// Per-round information handed to generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundContext {
    /// Zero-based round number.
    pub round: usize,
    /// Whether generated files must report their originating sources.
    pub track_source_files: bool,
}

/// A pluggable unit producing source artifacts from declarations.
///
/// Generators are registered as an ordered list of trait objects and are
/// stateless per call: the orchestrator may run invocations of the same
/// round on several threads.
///
/// # Example
///
/// ```ignore
/// struct FactoryGenerator;
///
/// impl CodeGenerator for FactoryGenerator {
///     fn is_applicable(&self, decl: &Declaration) -> Result<bool> {
///         Ok(decl.has_annotation("javax.inject.Inject"))
///     }
///
///     fn generate(&self, decl: &Declaration, _ctx: &RoundContext) -> Result<Option<ArtifactSpec>> {
///         let name = format!("{}_Factory", decl.short_name());
///         let content = format!("package {}\n\nclass {name}\n", decl.package());
///         Ok(Some(
///             ArtifactSpec::new(decl.package(), format!("{name}.kt"), content)
///                 .tracking([decl.source().clone()]),
///         ))
///     }
/// }
/// ```
pub trait CodeGenerator: Send + Sync {
    /// Identity used in diagnostics. Defaults to the implementing type's path.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this generator wants to look at `decl`.
    ///
    /// Must be a pure predicate: it is asked at most once per declaration and
    /// [`generate`](CodeGenerator::generate) is never called when it answers
    /// `false`.
    ///
    /// # Errors
    ///
    /// An error is reported as a generator fault and fails the compilation.
    fn is_applicable(&self, decl: &Declaration) -> Result<bool>;

    /// Produce at most one artifact for `decl`.
    ///
    /// Returning `Ok(None)` is not an error. The declaration is offered
    /// again in the next round, since files generated meanwhile may unlock
    /// output.
    ///
    /// # Errors
    ///
    /// An error is reported as a generator fault and fails the compilation.
    fn generate(&self, decl: &Declaration, ctx: &RoundContext) -> Result<Option<ArtifactSpec>>;
}

impl<T: CodeGenerator + ?Sized> CodeGenerator for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_applicable(&self, decl: &Declaration) -> Result<bool> {
        (**self).is_applicable(decl)
    }

    fn generate(&self, decl: &Declaration, ctx: &RoundContext) -> Result<Option<ArtifactSpec>> {
        (**self).generate(decl, ctx)
    }
}

impl<T: CodeGenerator + ?Sized> CodeGenerator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_applicable(&self, decl: &Declaration) -> Result<bool> {
        (**self).is_applicable(decl)
    }

    fn generate(&self, decl: &Declaration, ctx: &RoundContext) -> Result<Option<ArtifactSpec>> {
        (**self).generate(decl, ctx)
    }
}
