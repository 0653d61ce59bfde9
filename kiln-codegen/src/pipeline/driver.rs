//! The fixed-point round loop.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
};

use kiln_config::KilnConfig;
use kiln_core::{FileRef, write_file};
use kiln_decl::{DeclId, Declaration, DeclarationSource, SourceFile, SourceScanner};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::{Diagnostic, GenerationReport, GenerationState, Plugin, RoundSummary};
use crate::{
    ArtifactSpec, CodeGenerator, CompilationError, ConflictResolver, Error, RegisteredArtifact,
    Resolution, RoundContext, SourceTrackingValidator, Stage,
};

/// Runs generators round after round until no new file is produced.
///
/// Each round offers every visible declaration to every generator that has
/// not settled on it yet, commits the resulting artifacts through the
/// conflict resolver and the source-tracking validator, writes them below
/// the output root and re-ingests them so their declarations become visible
/// in the next round.
///
/// A round always drains all of its submissions, so every conflict of that
/// round is reported; any error then stops the loop. Files already written
/// are left in place.
///
/// # Example
///
/// ```ignore
/// let report = MergeDriver::new(&config, project_dir)
///     .generator(FactoryGenerator)
///     .generator(BindingGenerator)
///     .plugin(SnapshotPlugin::new())
///     .run(&sources)?;
/// ```
pub struct MergeDriver {
    output_root: PathBuf,
    validator: SourceTrackingValidator,
    parallel: bool,
    max_rounds: usize,
    generators: Vec<Box<dyn CodeGenerator>>,
    plugins: Vec<Box<dyn Plugin>>,
    source: Box<dyn DeclarationSource>,
}

impl MergeDriver {
    /// Create a driver for a project using its effective configuration.
    pub fn new(config: &KilnConfig, project_dir: impl AsRef<Path>) -> Self {
        let generation = &config.generation;
        Self {
            output_root: config.output_root(project_dir.as_ref()),
            validator: SourceTrackingValidator::new(generation.track_source_files),
            parallel: generation.parallel,
            max_rounds: generation.max_rounds,
            generators: Vec::new(),
            plugins: Vec::new(),
            source: Box::new(SourceScanner),
        }
    }

    /// Register a generator. Registration order is the order in which
    /// generators are consulted within a round.
    pub fn generator(mut self, generator: impl CodeGenerator + 'static) -> Self {
        self.generators.push(Box::new(generator));
        self
    }

    /// Register an ordered list of generators supplied by the host.
    pub fn generators(mut self, generators: impl IntoIterator<Item = Box<dyn CodeGenerator>>) -> Self {
        self.generators.extend(generators);
        self
    }

    /// Add a plugin to receive round lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Replace the default [`SourceScanner`] with another declaration source.
    pub fn source(mut self, source: impl DeclarationSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// The root generated-sources directory.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Run generation over the original sources of the compilation.
    ///
    /// # Errors
    ///
    /// Returns a [`CompilationError`] carrying every error of the round that
    /// failed.
    pub fn run(&self, sources: &[SourceFile]) -> Result<GenerationReport, CompilationError> {
        let mut state = GenerationState::new(&self.generators);

        for file in sources {
            self.ingest(&mut state, file, 0)
                .map_err(|e| CompilationError::new(0, vec![e]))?;
        }

        info!(
            sources = sources.len(),
            declarations = state.store.len(),
            generators = self.generators.len(),
            output_root = %self.output_root.display(),
            "starting code generation"
        );

        let mut round = 0;
        let mut productive_rounds = 0;
        loop {
            for plugin in &self.plugins {
                plugin
                    .on_before_round(round, &state)
                    .map_err(|e| plugin_error(round, &**plugin, e))?;
            }

            let summary = self.run_round(round, &mut state)?;

            // The empty round confirming the fixed point is not counted.
            if !summary.is_fixed_point() && productive_rounds >= self.max_rounds {
                return Err(CompilationError::new(
                    round,
                    vec![Error::RoundLimitExceeded {
                        max_rounds: self.max_rounds,
                    }],
                ));
            }

            for plugin in &self.plugins {
                plugin
                    .on_after_round(&summary, &state)
                    .map_err(|e| plugin_error(round, &**plugin, e))?;
            }

            if summary.is_fixed_point() {
                break;
            }
            productive_rounds += 1;
            round += 1;
        }

        info!(
            rounds = round + 1,
            artifacts = state.registry.len(),
            "code generation reached a fixed point"
        );
        Ok(state.into_report(round + 1, productive_rounds))
    }

    #[instrument(level = "debug", skip(self, state))]
    fn run_round(
        &self,
        round: usize,
        state: &mut GenerationState,
    ) -> Result<RoundSummary, CompilationError> {
        let ctx = RoundContext {
            round,
            track_source_files: self.validator.is_enabled(),
        };

        // Invocations only read the state; results are applied below.
        let invocations: Vec<Invocation> = {
            let pending = state.pending(round, self.generators.len());
            let shared: &GenerationState = state;
            let invoke = |&(index, decl): &(usize, &Declaration)| {
                let known = shared.applicability.get(&(index, decl.id())).copied();
                self.invoke(index, decl, known, &ctx)
            };
            // Both collect in input order.
            if self.parallel {
                pending.par_iter().map(invoke).collect()
            } else {
                pending.iter().map(invoke).collect()
            }
        };

        let mut summary = RoundSummary {
            round,
            invocations: invocations.len(),
            ..RoundSummary::default()
        };
        let mut errors = Vec::new();

        for invocation in invocations {
            let pair = (invocation.generator, invocation.decl);
            let stats = &mut state.stats[invocation.generator];
            if invocation.asked {
                stats.is_applicable_calls += 1;
            }
            if invocation.generated {
                stats.generate_calls += 1;
            }
            if let Some(applicable) = invocation.applicability {
                state.applicability.insert(pair, applicable);
            }

            match invocation.outcome {
                Outcome::NoOutput => {}
                Outcome::NotApplicable => {
                    state.settled.insert(pair);
                }
                Outcome::Fault(error) => {
                    state.settled.insert(pair);
                    errors.push(error);
                }
                Outcome::Produced(spec) => {
                    state.settled.insert(pair);
                    let producer = self.generators[invocation.generator].name();
                    let committed = RegisteredArtifact::new(spec, producer, &self.output_root, round)
                        .and_then(|artifact| self.commit(state, artifact));
                    match committed {
                        Ok(Some(logical_path)) => {
                            state.stats[invocation.generator].artifacts += 1;
                            summary.committed.push(logical_path);
                        }
                        Ok(None) => {}
                        Err(error) => {
                            warn!(round, producer, %error, "rejected generated file");
                            errors.push(error);
                        }
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(CompilationError::new(round, errors));
        }

        for logical_path in &summary.committed {
            let Some(artifact) = state.registry.get(logical_path) else {
                continue;
            };
            let file = SourceFile {
                path: FileRef::new(&artifact.path),
                content: artifact.content.clone(),
            };
            let introduced = self
                .ingest(state, &file, round + 1)
                .map_err(|e| CompilationError::new(round, vec![e]))?;
            summary.introduced.extend(introduced);
        }

        debug!(
            invocations = summary.invocations,
            committed = summary.committed.len(),
            introduced = summary.introduced.len(),
            "round complete"
        );
        Ok(summary)
    }

    /// Ask one generator about one declaration. Never touches shared state.
    fn invoke(
        &self,
        index: usize,
        decl: &Declaration,
        known: Option<bool>,
        ctx: &RoundContext,
    ) -> Invocation {
        let generator = &self.generators[index];
        let mut invocation = Invocation {
            generator: index,
            decl: decl.id(),
            asked: false,
            applicability: None,
            generated: false,
            outcome: Outcome::NoOutput,
        };

        let applicable = match known {
            Some(applicable) => applicable,
            None => {
                invocation.asked = true;
                match guard(|| generator.is_applicable(decl)) {
                    Ok(applicable) => {
                        invocation.applicability = Some(applicable);
                        applicable
                    }
                    Err(message) => {
                        invocation.outcome = Outcome::Fault(fault(
                            &**generator,
                            Stage::Applicability,
                            decl,
                            message,
                        ));
                        return invocation;
                    }
                }
            }
        };

        if !applicable {
            invocation.outcome = Outcome::NotApplicable;
            return invocation;
        }

        invocation.generated = true;
        invocation.outcome = match guard(|| generator.generate(decl, ctx)) {
            Ok(Some(spec)) => Outcome::Produced(spec),
            Ok(None) => Outcome::NoOutput,
            Err(message) => {
                Outcome::Fault(fault(&**generator, Stage::Generation, decl, message))
            }
        };
        invocation
    }

    /// Validate, resolve, write and register one artifact.
    ///
    /// Returns the logical path when the artifact is new, `None` when an
    /// identical file was already registered.
    fn commit(
        &self,
        state: &mut GenerationState,
        artifact: RegisteredArtifact,
    ) -> Result<Option<String>, Error> {
        self.validator.validate(&artifact)?;

        match ConflictResolver.resolve(&state.registry, &artifact)? {
            Resolution::Identical => {
                debug!(path = %artifact.logical_path, producer = %artifact.producer, "identical file generated again");
                state.diagnostics.push(
                    Diagnostic::info(
                        artifact.round,
                        format!("identical file generated again by {}", artifact.producer),
                    )
                    .at(&artifact.logical_path),
                );
                Ok(None)
            }
            Resolution::New => {
                if let Some(files) = &artifact.originating_files {
                    for file in files.iter().filter(|f| !state.known_files.contains(*f)) {
                        state.diagnostics.push(
                            Diagnostic::warning(
                                artifact.round,
                                format!(
                                    "{} tracks '{}', which is not a source of this compilation",
                                    artifact.producer, file
                                ),
                            )
                            .at(&artifact.logical_path),
                        );
                    }
                }

                write_file(&artifact.path, &artifact.content).map_err(|e| Error::Io {
                    path: artifact.path.clone(),
                    message: format!("{e:#}"),
                })?;
                debug!(path = %artifact.logical_path, producer = %artifact.producer, "committed generated file");

                let logical_path = artifact.logical_path.clone();
                state.registry.commit(artifact);
                Ok(Some(logical_path))
            }
        }
    }

    /// Read declarations from `file`, visible from `round` on.
    fn ingest(
        &self,
        state: &mut GenerationState,
        file: &SourceFile,
        round: usize,
    ) -> Result<Vec<String>, Error> {
        let drafts = self.source.ingest(file).map_err(|e| Error::Ingest {
            path: file.path.path().to_path_buf(),
            message: format!("{e:#}"),
        })?;
        state.known_files.insert(file.path.clone());

        let ids = state.store.append(round, drafts);
        Ok(ids
            .into_iter()
            .filter_map(|id| state.store.get(id))
            .map(Declaration::qualified_name)
            .collect())
    }
}

struct Invocation {
    generator: usize,
    decl: DeclId,
    /// `is_applicable` was called in this invocation.
    asked: bool,
    /// Fresh answer to cache.
    applicability: Option<bool>,
    /// `generate` was called in this invocation.
    generated: bool,
    outcome: Outcome,
}

enum Outcome {
    NotApplicable,
    NoOutput,
    Produced(ArtifactSpec),
    Fault(Error),
}

/// Run generator code, turning errors and panics into a message.
fn guard<T>(f: impl FnOnce() -> eyre::Result<T>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(report)) => Err(format!("{report:#}")),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

fn fault(generator: &dyn CodeGenerator, stage: Stage, decl: &Declaration, message: String) -> Error {
    Error::GeneratorFault {
        generator: generator.name().to_string(),
        stage,
        declaration: decl.qualified_name(),
        message,
    }
}

fn plugin_error(round: usize, plugin: &dyn Plugin, error: eyre::Report) -> CompilationError {
    CompilationError::new(
        round,
        vec![Error::Plugin {
            plugin: plugin.name(),
            message: format!("{error:#}"),
        }],
    )
}
