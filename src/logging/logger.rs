//! Structured logger with per-tier summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, TaskEntry, TaskStatus};
use crate::config::Tier;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that writes through the global `tracing` subscriber and collects
/// handler results for the end-of-run summary.
#[derive(Debug, Default)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// `log_file` is only remembered for the summary; the file itself is
    /// owned by the subscriber installed with
    /// [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a handler start line.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file when one is configured).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a handler result for the summary.
    pub fn record_task(&self, name: &str, tier: Tier, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                tier,
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the failed entries of `tier`.
    #[must_use]
    pub fn failure_count(&self, tier: Tier) -> usize {
        self.task_entries()
            .iter()
            .filter(|t| t.tier == tier && t.status == TaskStatus::Failed)
            .count()
    }

    /// Log the result of every recorded handler followed by per-tier totals.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");

        for task in &tasks {
            let (icon, color) = match task.status {
                TaskStatus::Ok => ("✓", "\x1b[32m"),
                TaskStatus::Skipped => ("○", "\x1b[33m"),
                TaskStatus::DryRun => ("~", "\x1b[37m"),
                TaskStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!(
                "{color}{icon} {} [{}]{suffix}\x1b[0m",
                task.name, task.tier
            ));
        }

        for line in summary_lines(&tasks) {
            self.info(&line);
        }

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

/// One totals line per tier that has any recorded entries.
fn summary_lines(tasks: &[TaskEntry]) -> Vec<String> {
    [Tier::Standard, Tier::Optional]
        .into_iter()
        .filter_map(|tier| {
            let of_tier: Vec<&TaskEntry> = tasks.iter().filter(|t| t.tier == tier).collect();
            if of_tier.is_empty() {
                return None;
            }
            let count = |status| of_tier.iter().filter(|t| t.status == status).count();
            Some(format!(
                "{tier}: {} ok, {} skipped, {} dry-run, {} failed",
                count(TaskStatus::Ok),
                count(TaskStatus::Skipped),
                count(TaskStatus::DryRun),
                count(TaskStatus::Failed),
            ))
        })
        .collect()
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, error);

    fn record_task(&self, name: &str, tier: Tier, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, tier, status, message);
    }

    fn print_summary(&self) {
        self.print_summary();
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn record_task_ok() {
        let log = Logger::new(None);
        log.record_task("firewall", Tier::Optional, TaskStatus::Ok, None);
        let tasks = log.task_entries();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "firewall");
        assert_eq!(tasks[0].tier, Tier::Optional);
    }

    #[test]
    fn failure_count_is_per_tier() {
        let log = Logger::new(None);
        log.record_task("a", Tier::Optional, TaskStatus::Failed, Some("boom"));
        log.record_task("b", Tier::Optional, TaskStatus::Ok, None);
        log.record_task("c", Tier::Standard, TaskStatus::Ok, None);
        assert_eq!(log.failure_count(Tier::Optional), 1);
        assert_eq!(log.failure_count(Tier::Standard), 0);
    }

    #[test]
    fn summary_lines_only_for_used_tiers() {
        let tasks = vec![
            TaskEntry {
                name: "a".into(),
                tier: Tier::Optional,
                status: TaskStatus::Ok,
                message: None,
            },
            TaskEntry {
                name: "b".into(),
                tier: Tier::Optional,
                status: TaskStatus::Failed,
                message: None,
            },
        ];
        let lines = summary_lines(&tasks);
        assert_eq!(lines, ["OPTIONAL: 1 ok, 0 skipped, 0 dry-run, 1 failed"]);
    }

    #[test]
    fn print_summary_with_no_tasks_is_silent() {
        Logger::new(None).print_summary();
    }
}
