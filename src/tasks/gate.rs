//! The confirmation gate: interactive-mode resolution and per-step approval.
use crate::config::Tier;
use crate::error::ProvisionError;
use crate::logging::Log;
use crate::prompt::Prompter;

use super::{Context, SubStep};

/// Question asked once per run, before the Optional tier.
pub const MODE_QUESTION: &str = "Run interactively (confirm each step)?";

/// What happened to a single SubStep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action ran and succeeded.
    Applied,
    /// The operator answered no.
    Declined,
    /// Dry-run mode: logged, not applied.
    DryRun,
}

/// Ask once whether to prompt before every SubStep. Defaults to yes.
///
/// An unreadable answer falls back to the default.
pub fn resolve_interactive(prompter: &dyn Prompter, log: &dyn Log) -> bool {
    match prompter.confirm(MODE_QUESTION, true) {
        Ok(answer) => {
            log.debug(&format!("interactive mode: {answer}"));
            answer
        }
        Err(e) => {
            log.error(&format!("could not read answer ({e}); using interactive mode"));
            true
        }
    }
}

/// Confirm (when interactive) and execute `step`.
///
/// # Errors
///
/// Returns [`ProvisionError::ActionFailed`] carrying `tier` when the action
/// fails. Whether that halts the run is decided by the caller via
/// [`ProvisionError::is_fatal`].
pub fn apply(ctx: &Context, step: &SubStep, tier: Tier) -> Result<StepOutcome, ProvisionError> {
    if !confirm(ctx, step) {
        return Ok(StepOutcome::Declined);
    }
    execute(ctx, step, tier)
}

/// Ask the operator about `step` when interactive; always true otherwise.
///
/// A declined step is logged at INFO.
pub fn confirm(ctx: &Context, step: &SubStep) -> bool {
    if !ctx.settings.interactive {
        return true;
    }
    let question = format!("Apply `{}`?", step.description);
    let approved = ctx.prompter.confirm(&question, true).unwrap_or_else(|e| {
        ctx.log
            .error(&format!("could not read answer ({e}); applying by default"));
        true
    });
    if !approved {
        ctx.log.info(&format!("Skipped `{}`", step.description));
    }
    approved
}

/// Execute an approved `step`, or only log it in dry-run mode.
///
/// # Errors
///
/// Returns [`ProvisionError::ActionFailed`] carrying `tier` when the action
/// fails.
pub fn execute(ctx: &Context, step: &SubStep, tier: Tier) -> Result<StepOutcome, ProvisionError> {
    if ctx.settings.dry_run {
        ctx.log.info(&format!(
            "[dry-run] would apply `{}`: {}",
            step.description, step.action
        ));
        return Ok(StepOutcome::DryRun);
    }

    ctx.log
        .debug(&format!("applying `{}`: {}", step.description, step.action));
    step.action
        .apply(ctx.executor.as_ref())
        .map_err(|e| ProvisionError::ActionFailed {
            description: step.description.clone(),
            tier,
            reason: format!("{e:#}"),
        })?;
    ctx.log.info(&format!("applied `{}`", step.description));
    Ok(StepOutcome::Applied)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use super::*;
    use crate::config::Bindings;
    use crate::logging::{CapturedLog, Level};
    use crate::resources::Action;
    use crate::tasks::test_helpers::{FixedPrompter, RecordingExecutor, make_context};

    struct BrokenPrompter;

    impl Prompter for BrokenPrompter {
        fn confirm(&self, _: &str, _: bool) -> io::Result<bool> {
            Err(io::Error::other("tty closed"))
        }
    }

    fn step() -> SubStep {
        SubStep {
            description: "enable firewall".into(),
            action: Action::run("ufw", &["--force", "enable"]),
        }
    }

    fn context(
        interactive: bool,
        answer: bool,
    ) -> (Arc<RecordingExecutor>, Arc<CapturedLog>, Arc<FixedPrompter>, Context) {
        let exec = Arc::new(RecordingExecutor::default());
        let log = Arc::new(CapturedLog::new());
        let prompter = Arc::new(FixedPrompter {
            answer,
            ..FixedPrompter::default()
        });
        let mut ctx = make_context("/".into(), Bindings::default(), exec.clone(), log.clone());
        ctx.settings.interactive = interactive;
        ctx.prompter = prompter.clone();
        (exec, log, prompter, ctx)
    }

    #[test]
    fn non_interactive_applies_without_asking() {
        let (exec, _, prompter, ctx) = context(false, false);
        let outcome = apply(&ctx, &step(), Tier::Optional).unwrap();
        assert_eq!(outcome, StepOutcome::Applied);
        assert_eq!(exec.calls(), ["ufw --force enable"]);
        assert!(prompter.asked.lock().unwrap().is_empty());
    }

    #[test]
    fn interactive_yes_applies() {
        let (exec, _, prompter, ctx) = context(true, true);
        assert_eq!(apply(&ctx, &step(), Tier::Optional).unwrap(), StepOutcome::Applied);
        assert_eq!(exec.calls().len(), 1);
        assert_eq!(
            prompter.asked.lock().unwrap().as_slice(),
            ["Apply `enable firewall`?"]
        );
    }

    #[test]
    fn interactive_no_skips_and_logs() {
        let (exec, log, _, ctx) = context(true, false);
        assert_eq!(apply(&ctx, &step(), Tier::Standard).unwrap(), StepOutcome::Declined);
        assert!(exec.calls().is_empty());
        assert_eq!(log.count_containing(Level::Info, "Skipped `enable firewall`"), 1);
    }

    #[test]
    fn failure_carries_tier() {
        let (_, _, _, mut ctx) = context(false, true);
        ctx.executor = Arc::new(RecordingExecutor {
            fail_on: Some("ufw".into()),
            ..RecordingExecutor::default()
        });
        let err = apply(&ctx, &step(), Tier::Standard).unwrap_err();
        assert!(matches!(
            &err,
            ProvisionError::ActionFailed { tier: Tier::Standard, description, .. }
                if description == "enable firewall"
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn resolve_interactive_uses_answer() {
        let log = CapturedLog::new();
        let no = FixedPrompter::default();
        assert!(!resolve_interactive(&no, &log));
        assert_eq!(no.asked.lock().unwrap().as_slice(), [MODE_QUESTION]);
    }

    #[test]
    fn resolve_interactive_defaults_on_read_error() {
        let log = CapturedLog::new();
        assert!(resolve_interactive(&BrokenPrompter, &log));
        assert_eq!(log.messages(Level::Error).len(), 1);
    }
}
