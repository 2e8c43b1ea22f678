//! Progress reporting for multi-step runs.
//!
//! The collector only knows the [`ProgressCallback`] trait; terminal
//! rendering lives in the CLI utilities. Tests and library callers that do
//! not care about progress pass [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a run.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of steps.
    fn set_total(&self, total: u64);

    /// Advances by `delta` steps.
    fn inc(&self, delta: u64);

    /// Replaces the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the run as finished with a final message.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
