//! Bulk tool installation.
use crate::config::params::ToolParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

/// Installs the space-separated `TOOLS` list with apt.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallTools;

impl Handler for InstallTools {
    fn name(&self) -> &str {
        "tool installation"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = ToolParams::from_bindings(&ctx.bindings)?;
        let mut plan = Plan::new();
        if params.packages.is_empty() {
            ctx.log.debug("TOOLS is empty");
            return Ok(plan);
        }
        plan.step("refresh package lists", Action::run("apt-get", &["update"]));
        plan.step(
            format!("install {}", params.packages.join(", ")),
            Action::apt_install(&params.packages),
        );
        Ok(plan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{Bindings, Tier};
    use crate::logging::CapturedLog;
    use crate::logging::TaskStatus;
    use crate::tasks::run_handler;
    use crate::tasks::test_helpers::{RecordingExecutor, make_context};

    #[test]
    fn installs_listed_packages() {
        let exec = Arc::new(RecordingExecutor::default());
        let ctx = make_context(
            "/".into(),
            Bindings::from_pairs([("TOOLS", "htop  jq tmux")]),
            exec.clone(),
            Arc::new(CapturedLog::new()),
        );
        run_handler(&ctx, &InstallTools, Tier::Optional).unwrap();
        assert_eq!(
            exec.calls(),
            [
                "apt-get update",
                "env DEBIAN_FRONTEND=noninteractive apt-get install -y htop jq tmux",
            ]
        );
    }

    #[test]
    fn empty_list_has_nothing_to_do() {
        let exec = Arc::new(RecordingExecutor::default());
        let ctx = make_context(
            "/".into(),
            Bindings::default(),
            exec.clone(),
            Arc::new(CapturedLog::new()),
        );
        let status = run_handler(&ctx, &InstallTools, Tier::Optional).unwrap();
        assert_eq!(status, TaskStatus::Skipped);
        assert!(exec.calls().is_empty());
    }
}
