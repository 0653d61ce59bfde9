//! Test utilities for code generators.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use eyre::{Result, eyre};
use kiln_config::KilnConfig;
use kiln_decl::{Declaration, SourceFile};
use tempfile::TempDir;

use crate::{
    ArtifactSpec, CodeGenerator, CompilationError, GenerationReport, MergeDriver, RoundContext,
};

/// How a [`SimpleCodeGenerator`] fills in originating files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTracking {
    /// Does not take part in source tracking.
    None,
    /// Tracked, derived from no source file.
    WithNoSources,
    /// Tracks the file declaring the input declaration.
    TrackSourceFiles,
}

type Mapper = dyn Fn(&Declaration) -> Option<String> + Send + Sync;
type Predicate = dyn Fn(&Declaration) -> bool + Send + Sync;

/// A generator that maps a declaration to the source text of one file.
///
/// The file is named after the first type the text declares. Calls are
/// counted so tests can assert how often the driver consulted it.
///
/// # Example
///
/// ```ignore
/// let generator = SimpleCodeGenerator::new(SourceTracking::None, |decl| {
///     (decl.short_name() == "Abc").then(|| "package generated\n\nclass Abc\n".to_string())
/// });
/// ```
pub struct SimpleCodeGenerator {
    name: String,
    tracking: SourceTracking,
    mapper: Box<Mapper>,
    applicable: Box<Predicate>,
    is_applicable_calls: AtomicUsize,
    generate_calls: Mutex<HashMap<String, usize>>,
}

impl SimpleCodeGenerator {
    /// Create a generator applicable to every declaration.
    pub fn new(
        tracking: SourceTracking,
        mapper: impl Fn(&Declaration) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: std::any::type_name::<Self>().to_string(),
            tracking,
            mapper: Box::new(mapper),
            applicable: Box::new(|_| true),
            is_applicable_calls: AtomicUsize::new(0),
            generate_calls: Mutex::new(HashMap::new()),
        }
    }

    /// Override the name reported in diagnostics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restrict the declarations this generator is applicable to.
    pub fn applicable_if(
        mut self,
        predicate: impl Fn(&Declaration) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.applicable = Box::new(predicate);
        self
    }

    /// How often `is_applicable` was called.
    pub fn is_applicable_calls(&self) -> usize {
        self.is_applicable_calls.load(Ordering::SeqCst)
    }

    /// How often `generate` was called for the given qualified name.
    pub fn generate_calls_for(&self, qualified_name: &str) -> usize {
        self.generate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(qualified_name)
            .copied()
            .unwrap_or(0)
    }

    /// Total `generate` calls.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl CodeGenerator for SimpleCodeGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_applicable(&self, decl: &Declaration) -> Result<bool> {
        self.is_applicable_calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.applicable)(decl))
    }

    fn generate(&self, decl: &Declaration, _ctx: &RoundContext) -> Result<Option<ArtifactSpec>> {
        *self
            .generate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(decl.qualified_name())
            .or_default() += 1;

        let Some(content) = (self.mapper)(decl) else {
            return Ok(None);
        };
        let spec = ArtifactSpec::from_source(content, "kt")?
            .ok_or_else(|| eyre!("generated code for {} declares no type", decl.qualified_name()))?;

        Ok(Some(match self.tracking {
            SourceTracking::None => spec,
            SourceTracking::WithNoSources => spec.tracking_nothing(),
            SourceTracking::TrackSourceFiles => spec.tracking([decl.source().clone()]),
        }))
    }
}

/// Overall result of [`compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok,
    CompilationError,
}

/// The outcome of compiling sources in a temporary project.
#[derive(Debug)]
pub struct Compilation {
    pub exit_code: ExitCode,
    /// Error messages on failure, diagnostics on success.
    pub messages: String,
    pub output_root: PathBuf,
    pub result: std::result::Result<GenerationReport, CompilationError>,
    /// Dropping the compilation removes the project.
    pub project_dir: TempDir,
}

impl Compilation {
    /// The report of a successful run.
    pub fn report(&self) -> Option<&GenerationReport> {
        self.result.as_ref().ok()
    }

    /// The error of a failed run.
    pub fn error(&self) -> Option<&CompilationError> {
        self.result.as_ref().err()
    }

    /// Read a generated file by logical path.
    pub fn generated(&self, logical_path: &str) -> Option<String> {
        fs::read_to_string(self.output_root.join(logical_path)).ok()
    }
}

/// Write `sources` (file name, content) into a fresh project and run the
/// generators over them.
///
/// # Errors
///
/// Fails only when the project cannot be set up; generation failures are
/// reported through [`Compilation::exit_code`].
pub fn compile(
    sources: &[(&str, &str)],
    generators: Vec<Box<dyn CodeGenerator>>,
    config: &KilnConfig,
) -> Result<Compilation> {
    let project_dir = TempDir::new()?;
    let source_root = project_source_root(project_dir.path());
    fs::create_dir_all(&source_root)?;

    let files = sources
        .iter()
        .map(|(name, content)| {
            let path = source_root.join(name);
            fs::write(&path, content)?;
            SourceFile::read(&path)
        })
        .collect::<Result<Vec<_>>>()?;

    let driver = MergeDriver::new(config, project_dir.path()).generators(generators);
    let output_root = driver.output_root().to_path_buf();
    let result = driver.run(&files);

    let (exit_code, messages) = match &result {
        Ok(report) => (ExitCode::Ok, join_lines(&report.diagnostics)),
        Err(err) => (ExitCode::CompilationError, err.messages()),
    };

    Ok(Compilation {
        exit_code,
        messages,
        output_root,
        result,
        project_dir,
    })
}

fn join_lines(items: &[impl ToString]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Path of a source written by [`compile`].
pub fn source_path(compilation: &Compilation, name: &str) -> PathBuf {
    project_source_root(compilation.project_dir.path()).join(name)
}

fn project_source_root(project_dir: &Path) -> PathBuf {
    project_dir.join("src")
}
