//! In-memory [`Log`] implementation.
use std::sync::Mutex;

use super::types::{Log, TaskEntry, TaskStatus};
use crate::config::Tier;

/// Severity of a captured record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Normal progress (includes stage lines).
    Info,
    /// Failures.
    Error,
}

/// A single captured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Record severity.
    pub level: Level,
    /// Message text.
    pub message: String,
}

/// Collects every record and task result in memory instead of emitting them.
///
/// Used when output must be inspected after the fact, e.g. by the test
/// suites that assert on what a run logged.
#[derive(Debug, Default)]
pub struct CapturedLog {
    records: Mutex<Vec<LogRecord>>,
    tasks: Mutex<Vec<TaskEntry>>,
}

impl CapturedLog {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(LogRecord {
                level,
                message: msg.to_string(),
            });
        }
    }

    /// All records in emission order.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages logged at `level`.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .map(|r| r.message)
            .collect()
    }

    /// Number of records at `level` whose message contains `needle`.
    #[must_use]
    pub fn count_containing(&self, level: Level, needle: &str) -> usize {
        self.messages(level)
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }

    /// All recorded task results.
    #[must_use]
    pub fn tasks(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Task results recorded under `name`.
    #[must_use]
    pub fn tasks_named(&self, name: &str) -> Vec<TaskEntry> {
        self.tasks().into_iter().filter(|t| t.name == name).collect()
    }
}

impl Log for CapturedLog {
    fn stage(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }

    fn record_task(&self, name: &str, tier: Tier, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                tier,
                status,
                message: message.map(String::from),
            });
        }
    }
}
