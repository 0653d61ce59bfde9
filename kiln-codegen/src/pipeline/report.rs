//! Results of a successful generation run.

use serde::Serialize;

use super::Diagnostic;
use crate::RegisteredArtifact;

/// Per-generator call statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratorStats {
    pub name: String,
    pub is_applicable_calls: usize,
    pub generate_calls: usize,
    /// Artifacts newly committed (identical resubmissions not counted).
    pub artifacts: usize,
}

/// What happened in one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: usize,
    /// Number of (generator, declaration) pairs attempted.
    pub invocations: usize,
    /// Logical paths newly committed in this round.
    pub committed: Vec<String>,
    /// Qualified names of declarations read from those files, visible from
    /// the next round on.
    pub introduced: Vec<String>,
}

impl RoundSummary {
    /// A round without new artifacts is the fixed point.
    pub fn is_fixed_point(&self) -> bool {
        self.committed.is_empty()
    }
}

/// Outcome of a generation run that reached its fixed point.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Rounds executed, including the final round that produced nothing.
    pub rounds: usize,
    /// Rounds that committed at least one artifact.
    pub productive_rounds: usize,
    /// Committed artifacts in commit order.
    pub artifacts: Vec<RegisteredArtifact>,
    pub diagnostics: Vec<Diagnostic>,
    /// Statistics in generator registration order.
    pub generators: Vec<GeneratorStats>,
    /// Total declarations known at the end, original and generated.
    pub declarations: usize,
}

impl GenerationReport {
    /// Find an artifact by logical path.
    pub fn artifact(&self, logical_path: &str) -> Option<&RegisteredArtifact> {
        self.artifacts
            .iter()
            .find(|a| a.logical_path == logical_path)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Iterate over warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }
}
