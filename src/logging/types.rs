//! Core logging types: task entries, status, and the [`Log`] trait.
use crate::config::Tier;

/// Handler (or directive) result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Human-readable handler name or directive description.
    pub name: String,
    /// Tier the work ran under.
    pub tier: Tier,
    /// Final status.
    pub status: TaskStatus,
    /// Optional detail message (e.g. failure reason).
    pub message: Option<String>,
}

/// Status of a completed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// At least one SubStep was applied and none failed.
    Ok,
    /// The operator declined every SubStep.
    Skipped,
    /// Ran in dry-run mode; nothing was applied.
    DryRun,
    /// A SubStep (or parameter validation) failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes through `tracing`;
/// [`CapturedLog`](super::captured::CapturedLog) keeps everything in memory.
pub trait Log: Send + Sync {
    /// Log a handler start line (INFO with emphasis).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a handler result for the summary.
    fn record_task(&self, name: &str, tier: Tier, status: TaskStatus, message: Option<&str>);
    /// Emit the end-of-run summary. Backends without one do nothing.
    fn print_summary(&self) {}
}
