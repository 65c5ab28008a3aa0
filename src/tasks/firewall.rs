//! Host firewall (ufw).
use crate::config::params::FirewallParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

/// Default-deny inbound, default-allow outbound, one SSH allow rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct Firewall;

impl Handler for Firewall {
    fn name(&self) -> &str {
        "firewall"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = FirewallParams::from_bindings(&ctx.bindings)?;
        let rule = format!("{}/tcp", params.ssh_port);

        let mut plan = Plan::new();
        if !ctx.has("ufw") {
            plan.step("install ufw", Action::apt_install(&["ufw"]));
        }
        plan.step(
            "deny inbound traffic by default",
            Action::run("ufw", &["default", "deny", "incoming"]),
        );
        plan.step(
            "allow outbound traffic by default",
            Action::run("ufw", &["default", "allow", "outgoing"]),
        );
        plan.step(format!("allow SSH on {rule}"), Action::run("ufw", &["allow", &rule]));
        plan.step("enable firewall", Action::run("ufw", &["--force", "enable"]));
        Ok(plan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Bindings;
    use crate::logging::CapturedLog;
    use crate::tasks::test_helpers::{RecordingExecutor, make_context};

    fn context(installed: bool, pairs: &[(&str, &str)]) -> Context {
        make_context(
            "/".into(),
            Bindings::from_pairs(pairs.iter().copied()),
            Arc::new(RecordingExecutor {
                installed,
                ..RecordingExecutor::default()
            }),
            Arc::new(CapturedLog::new()),
        )
    }

    #[test]
    fn installs_ufw_when_missing() {
        let plan = Firewall.plan(&context(false, &[])).unwrap();
        assert_eq!(plan.descriptions().first(), Some(&"install ufw"));
    }

    #[test]
    fn uses_configured_ssh_port() {
        let plan = Firewall.plan(&context(true, &[("SSH_PORT", "2222")])).unwrap();
        assert_eq!(
            plan.descriptions(),
            [
                "deny inbound traffic by default",
                "allow outbound traffic by default",
                "allow SSH on 2222/tcp",
                "enable firewall",
            ]
        );
    }

    #[test]
    fn rejects_bad_port() {
        let err = Firewall
            .plan(&context(true, &[("SSH_PORT", "ssh")]))
            .unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidParameter { .. }));
    }
}
