//! Handlers, the confirmation gate, and the dispatch table.
pub mod account;
pub mod directive;
pub mod dispatch;
pub mod docker;
pub mod fail2ban;
pub mod firewall;
pub mod gate;
pub mod ssh;
pub mod tailscale;
pub mod tools;
pub mod wireguard;

pub use dispatch::HandlerKind;
pub use gate::StepOutcome;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Bindings, Tier};
use crate::error::ProvisionError;
use crate::exec::Executor;
use crate::logging::{Log, TaskStatus};
use crate::platform::Platform;
use crate::prompt::Prompter;
use crate::resources::Action;
use crate::resources::fs::{self, BackupOutcome};

/// The atomic unit an operator is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubStep {
    /// Shown in the confirmation prompt and in logs.
    pub description: String,
    /// What happens when the step is applied.
    pub action: Action,
}

/// Everything a handler intends to do, computed before anything runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Existing files to copy aside before the first approved step.
    pub backups: Vec<PathBuf>,
    /// Ordered SubSteps.
    pub steps: Vec<SubStep>,
}

impl Plan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a SubStep.
    pub fn step(&mut self, description: impl Into<String>, action: Action) {
        self.steps.push(SubStep {
            description: description.into(),
            action,
        });
    }

    /// Register a file for a defensive backup.
    pub fn backup(&mut self, path: PathBuf) {
        self.backups.push(path);
    }

    /// Descriptions of every step, in order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.description.as_str()).collect()
    }
}

/// A named group of SubSteps implementing one host-configuration concern.
pub trait Handler: Send + Sync {
    /// Human-readable handler name.
    fn name(&self) -> &str;

    /// Build the plan from the bound parameters.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if a required key is missing or malformed.
    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError>;
}

/// Immutable run-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Prompt before each SubStep.
    pub interactive: bool,
    /// DEBUG records are visible on the console.
    pub verbose: bool,
    /// Log SubSteps instead of applying them.
    pub dry_run: bool,
    /// Prefix for every host file a handler reads or writes.
    pub root: PathBuf,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            interactive: false,
            verbose: false,
            dry_run: false,
            root: PathBuf::from("/"),
        }
    }
}

impl RunSettings {
    /// Resolve an absolute host path under [`RunSettings::root`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use hostprep_cli::tasks::RunSettings;
    ///
    /// let settings = RunSettings { root: PathBuf::from("/srv/stage"), ..RunSettings::default() };
    /// assert_eq!(
    ///     settings.host_path("/etc/ssh/sshd_config"),
    ///     PathBuf::from("/srv/stage/etc/ssh/sshd_config")
    /// );
    /// ```
    #[must_use]
    pub fn host_path(&self, absolute: &str) -> PathBuf {
        self.root.join(absolute.trim_start_matches('/'))
    }
}

/// Shared state passed to every handler.
pub struct Context {
    /// Run-wide settings.
    pub settings: RunSettings,
    /// Bound configuration values.
    pub bindings: Bindings,
    /// Host facts.
    pub platform: Platform,
    /// Logging backend.
    pub log: Arc<dyn Log>,
    /// Process executor.
    pub executor: Arc<dyn Executor>,
    /// Operator prompts.
    pub prompter: Arc<dyn Prompter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("bindings", &self.bindings)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Shorthand for [`RunSettings::host_path`].
    #[must_use]
    pub fn host_path(&self, absolute: &str) -> PathBuf {
        self.settings.host_path(absolute)
    }

    /// Whether `program` is installed.
    #[must_use]
    pub fn has(&self, program: &str) -> bool {
        self.executor.which(program)
    }
}

/// Copy `target` aside; failures are logged and never propagate.
fn backup(ctx: &Context, target: &Path) {
    if ctx.settings.dry_run {
        ctx.log
            .debug(&format!("[dry-run] would back up {}", target.display()));
        return;
    }
    match fs::backup(target) {
        Ok(BackupOutcome::Created(copy)) => {
            ctx.log.info(&format!(
                "backed up {} to {}",
                target.display(),
                copy.display()
            ));
        }
        Ok(BackupOutcome::Absent) => {
            ctx.log
                .debug(&format!("no existing {}; backup skipped", target.display()));
        }
        Err(e) => ctx.log.error(&e.to_string()),
    }
}

/// Run a handler at `tier`: log its start, then pass each SubStep through
/// the confirmation gate in order.
///
/// The files the plan touches are backed up once, just before the first
/// approved SubStep. Declining every step leaves no backup behind.
///
/// The result is recorded for the summary either way.
///
/// # Errors
///
/// Returns [`ProvisionError::ActionFailed`] for the first failing SubStep,
/// or when the handler's parameters are invalid. Later SubSteps are not run.
pub fn run_handler(
    ctx: &Context,
    handler: &dyn Handler,
    tier: Tier,
) -> Result<TaskStatus, ProvisionError> {
    let name = handler.name();
    ctx.log.stage(name);

    let plan = match handler.plan(ctx) {
        Ok(plan) => plan,
        Err(e) => {
            let err = e.into_action_failure(name, tier);
            ctx.log
                .record_task(name, tier, TaskStatus::Failed, Some(&err.to_string()));
            return Err(err);
        }
    };

    if plan.steps.is_empty() {
        ctx.log.info("nothing to do");
        ctx.log
            .record_task(name, tier, TaskStatus::Skipped, Some("nothing to do"));
        return Ok(TaskStatus::Skipped);
    }

    let mut backed_up = false;
    let mut applied = 0usize;
    let mut dry_run = false;
    for step in &plan.steps {
        if !gate::confirm(ctx, step) {
            continue;
        }
        if !backed_up {
            for target in &plan.backups {
                backup(ctx, target);
            }
            backed_up = true;
        }
        match gate::execute(ctx, step, tier) {
            Ok(StepOutcome::Applied) => applied += 1,
            Ok(StepOutcome::DryRun) => dry_run = true,
            Ok(StepOutcome::Declined) => {}
            Err(e) => {
                ctx.log
                    .record_task(name, tier, TaskStatus::Failed, Some(&e.to_string()));
                return Err(e);
            }
        }
    }

    let (status, note) = if dry_run {
        (TaskStatus::DryRun, None)
    } else if applied == 0 {
        (TaskStatus::Skipped, Some("every step declined"))
    } else {
        (TaskStatus::Ok, None)
    };
    ctx.log.record_task(name, tier, status, note);
    Ok(status)
}
