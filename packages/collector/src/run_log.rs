//! Injected logging handle for a collection run.
//!
//! A [`RunLog`] is created by whoever orchestrates the run and handed to the
//! agent. Every message is forwarded to the `log` facade under the run's
//! target and kept, timestamped, so the metadata document can list the
//! processing history. Installing a `log` backend is the binary's job; the
//! handle works (and still records) without one.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};

/// Default `log` target for collection runs.
pub const DEFAULT_TARGET: &str = "data_collect::agent";

/// One message recorded by a [`RunLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub level: log::Level,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.level,
            self.message
        )
    }
}

/// Cloneable handle; clones share the same history.
#[derive(Debug, Clone)]
pub struct RunLog {
    target: String,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

impl RunLog {
    /// Creates an empty run log that emits under `target`.
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_owned(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The `log` target messages are emitted under.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(log::Level::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.record(log::Level::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.record(log::Level::Error, message.into());
    }

    fn record(&self, level: log::Level, message: String) {
        log::log!(target: self.target.as_str(), level, "{message}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                at: Utc::now(),
                level,
                message,
            });
    }

    /// Snapshot of every recorded entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded entries rendered as `<timestamp> [LEVEL] message`.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.entries().iter().map(ToString::to_string).collect()
    }

    /// Number of entries recorded at `level`.
    #[must_use]
    pub fn count(&self, level: log::Level) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_history() {
        let log = RunLog::new("test");
        let handle = log.clone();
        handle.info("Data collected");
        log.warn("No data collected from API.");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Data collected");
        assert_eq!(entries[1].level, log::Level::Warn);
        assert_eq!(handle.count(log::Level::Warn), 1);
    }

    #[test]
    fn history_includes_level_and_message() {
        let log = RunLog::default();
        log.error("Request failed: timeout");
        let history = log.history();
        assert_eq!(history.len(), 1);
        assert!(history[0].ends_with("[ERROR] Request failed: timeout"));
    }
}
