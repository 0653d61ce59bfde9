//! Pipeline plugin trait for extensibility.

use std::sync::Arc;

use eyre::Result;

use super::{GenerationState, RoundSummary};

/// A plugin that can hook into the generation loop.
///
/// Plugins receive callbacks before and after each round, allowing them to
/// observe the declaration store, the registry and diagnostics.
///
/// # Example
///
/// ```ignore
/// struct TimingPlugin {
///     started: Mutex<Option<Instant>>,
/// }
///
/// impl Plugin for TimingPlugin {
///     fn name(&self) -> &'static str { "timing" }
///
///     fn on_before_round(&self, _round: usize, _state: &GenerationState) -> Result<()> {
///         *self.started.lock().unwrap() = Some(Instant::now());
///         Ok(())
///     }
///
///     fn on_after_round(&self, summary: &RoundSummary, _state: &GenerationState) -> Result<()> {
///         if let Some(start) = *self.started.lock().unwrap() {
///             println!("round {} took {:?}", summary.round, start.elapsed());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// The name of this plugin (for debugging and logging).
    fn name(&self) -> &'static str;

    /// Called before a round runs.
    ///
    /// # Errors
    ///
    /// Return an error to abort generation.
    #[allow(unused_variables)]
    fn on_before_round(&self, round: usize, state: &GenerationState) -> Result<()> {
        Ok(())
    }

    /// Called after a round completed without errors, including the final
    /// round that produced nothing.
    ///
    /// # Errors
    ///
    /// Return an error to abort generation.
    #[allow(unused_variables)]
    fn on_after_round(&self, summary: &RoundSummary, state: &GenerationState) -> Result<()> {
        Ok(())
    }
}

impl<T: Plugin + ?Sized> Plugin for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_before_round(&self, round: usize, state: &GenerationState) -> Result<()> {
        (**self).on_before_round(round, state)
    }

    fn on_after_round(&self, summary: &RoundSummary, state: &GenerationState) -> Result<()> {
        (**self).on_after_round(summary, state)
    }
}
