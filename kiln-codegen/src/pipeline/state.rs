//! Mutable state of one generation run.

use std::collections::{HashMap, HashSet};

use kiln_core::FileRef;
use kiln_decl::{DeclId, Declaration, DeclarationStore};

use super::{Diagnostic, GenerationReport, GeneratorStats};
use crate::{CodeGenerator, FileRegistry};

/// A (generator index, declaration) pair.
pub(crate) type Pair = (usize, DeclId);

/// State carried through all rounds of a run.
///
/// Owned by the merge driver for the lifetime of one compilation and torn
/// down with it; nothing persists across runs.
#[derive(Debug)]
pub struct GenerationState {
    pub(crate) store: DeclarationStore,
    pub(crate) registry: FileRegistry,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Original sources and generated files seen so far.
    pub(crate) known_files: HashSet<FileRef>,
    /// Cached answers of `is_applicable`, asked once per pair.
    pub(crate) applicability: HashMap<Pair, bool>,
    /// Pairs that will not be invoked again: not applicable, produced an
    /// artifact, or faulted.
    pub(crate) settled: HashSet<Pair>,
    pub(crate) stats: Vec<GeneratorStats>,
}

impl GenerationState {
    pub(crate) fn new(generators: &[Box<dyn CodeGenerator>]) -> Self {
        Self {
            store: DeclarationStore::new(),
            registry: FileRegistry::new(),
            diagnostics: Vec::new(),
            known_files: HashSet::new(),
            applicability: HashMap::new(),
            settled: HashSet::new(),
            stats: generators
                .iter()
                .map(|g| GeneratorStats {
                    name: g.name().to_string(),
                    ..GeneratorStats::default()
                })
                .collect(),
        }
    }

    pub fn store(&self) -> &DeclarationStore {
        &self.store
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn stats(&self) -> &[GeneratorStats] {
        &self.stats
    }

    /// Pairs to attempt in `round`, generator-major in registration order,
    /// then by declaration id.
    pub(crate) fn pending(&self, round: usize, generators: usize) -> Vec<(usize, &Declaration)> {
        (0..generators)
            .flat_map(|index| {
                self.store
                    .visible_in(round)
                    .filter(move |decl| !self.settled.contains(&(index, decl.id())))
                    .map(move |decl| (index, decl))
            })
            .collect()
    }

    pub(crate) fn into_report(self, rounds: usize, productive_rounds: usize) -> GenerationReport {
        GenerationReport {
            rounds,
            productive_rounds,
            declarations: self.store.len(),
            artifacts: self.registry.into_artifacts(),
            diagnostics: self.diagnostics,
            generators: self.stats,
        }
    }
}
