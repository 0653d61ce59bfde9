//! Round snapshot plugin for debugging generator interplay.
//!
//! Captures what every round committed so multi-round chains can be
//! inspected after the fact.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use eyre::Result;
use serde::Serialize;

use super::{Diagnostic, GenerationState, Plugin, RoundSummary};
use crate::RegisteredArtifact;

/// The state after a round completed.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    pub round: usize,
    pub invocations: usize,
    /// Artifacts newly committed in this round.
    pub committed: Vec<RegisteredArtifact>,
    /// Declarations read from those artifacts.
    pub introduced: Vec<String>,
    /// Diagnostics collected so far.
    pub diagnostics: Vec<Diagnostic>,
}

/// A plugin that records a [`RoundSnapshot`] after each round.
///
/// # Example
///
/// ```ignore
/// let snapshots = Arc::new(SnapshotPlugin::new());
/// MergeDriver::new(&config, &project_dir)
///     .generator(FactoryGenerator)
///     .plugin(Arc::clone(&snapshots))
///     .run(&sources)?;
///
/// snapshots.write_to_dir("build/kiln-debug")?;
/// ```
pub struct SnapshotPlugin {
    snapshots: RwLock<Vec<RoundSnapshot>>,
    /// Written after every round when set.
    output_dir: Option<PathBuf>,
}

impl SnapshotPlugin {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: None,
        }
    }

    /// Create a snapshot plugin that writes each round as it completes.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: Some(output_dir.into()),
        }
    }

    /// Get all collected snapshots.
    pub fn snapshots(&self) -> Vec<RoundSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write all snapshots to `dir` as `round-<n>.json`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        for snapshot in snapshots.iter() {
            write_snapshot(dir, snapshot)?;
        }

        Ok(())
    }

    fn capture(&self, summary: &RoundSummary, state: &GenerationState) -> RoundSnapshot {
        RoundSnapshot {
            round: summary.round,
            invocations: summary.invocations,
            committed: summary
                .committed
                .iter()
                .filter_map(|path| state.registry().get(path))
                .cloned()
                .collect(),
            introduced: summary.introduced.clone(),
            diagnostics: state.diagnostics().to_vec(),
        }
    }
}

impl Default for SnapshotPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn on_after_round(&self, summary: &RoundSummary, state: &GenerationState) -> Result<()> {
        let snapshot = self.capture(summary, state);

        if let Some(ref dir) = self.output_dir {
            fs::create_dir_all(dir)?;
            write_snapshot(dir, &snapshot)?;
        }

        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot);
        Ok(())
    }
}

fn write_snapshot(dir: &Path, snapshot: &RoundSnapshot) -> Result<()> {
    let path = dir.join(format!("round-{}.json", snapshot.round));
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_plugin_creation() {
        let plugin = SnapshotPlugin::new();
        assert!(plugin.snapshots().is_empty());
    }

    #[test]
    fn test_captures_after_each_round() {
        let plugin = SnapshotPlugin::new();
        let state = GenerationState::new(&[]);
        let summary = RoundSummary {
            round: 0,
            invocations: 3,
            ..RoundSummary::default()
        };

        plugin.on_after_round(&summary, &state).unwrap();

        let snapshots = plugin.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].invocations, 3);
        assert!(snapshots[0].committed.is_empty());
    }

    #[test]
    fn test_writes_round_files() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = SnapshotPlugin::with_output_dir(dir.path());
        let state = GenerationState::new(&[]);

        for round in 0..2 {
            let summary = RoundSummary {
                round,
                ..RoundSummary::default()
            };
            plugin.on_after_round(&summary, &state).unwrap();
        }

        assert!(dir.path().join("round-0.json").exists());
        assert!(dir.path().join("round-1.json").exists());
    }
}
