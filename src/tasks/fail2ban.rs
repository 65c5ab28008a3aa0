//! Intrusion-ban daemon (fail2ban).
use crate::config::params::BanParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

/// Installs fail2ban, writes an sshd jail, and restarts the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntrusionBan;

/// Render `jail.local` for the given parameters.
fn jail_local(params: &BanParams) -> String {
    format!(
        "[DEFAULT]\n\
         bantime = {}\n\
         findtime = {}\n\
         maxretry = {}\n\
         \n\
         [sshd]\n\
         enabled = true\n\
         port = {}\n",
        params.bantime, params.findtime, params.maxretry, params.ssh_port
    )
}

impl Handler for IntrusionBan {
    fn name(&self) -> &str {
        "intrusion ban"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = BanParams::from_bindings(&ctx.bindings)?;
        let jail = ctx.host_path("/etc/fail2ban/jail.local");

        let mut plan = Plan::new();
        if !ctx.has("fail2ban-client") {
            plan.step("install fail2ban", Action::apt_install(&["fail2ban"]));
        }
        plan.backup(jail.clone());
        plan.step(
            format!(
                "configure sshd jail (bantime {}, findtime {}, maxretry {})",
                params.bantime, params.findtime, params.maxretry
            ),
            Action::WriteFile {
                path: jail,
                contents: jail_local(&params),
                mode: 0o644,
            },
        );
        plan.step(
            "restart fail2ban",
            Action::run("systemctl", &["restart", "fail2ban"]),
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
    use crate::tasks::run_handler;
    use crate::tasks::test_helpers::{RecordingExecutor, make_context};

    #[test]
    fn jail_uses_defaults() {
        let params = BanParams::from_bindings(&Bindings::default()).unwrap();
        let jail = jail_local(&params);
        assert!(jail.contains("bantime = 1h\n"));
        assert!(jail.contains("findtime = 10m\n"));
        assert!(jail.contains("maxretry = 5\n"));
        assert!(jail.contains("port = 22\n"));
    }

    #[test]
    fn writes_jail_and_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(RecordingExecutor {
            installed: true,
            ..RecordingExecutor::default()
        });
        let ctx = make_context(
            dir.path().to_path_buf(),
            Bindings::from_pairs([("FAIL2BAN_MAXRETRY", "3"), ("SSH_PORT", "2222")]),
            exec.clone(),
            Arc::new(CapturedLog::new()),
        );
        run_handler(&ctx, &IntrusionBan, Tier::Optional).unwrap();

        let jail = std::fs::read_to_string(dir.path().join("etc/fail2ban/jail.local")).unwrap();
        assert!(jail.contains("maxretry = 3\n"));
        assert!(jail.contains("port = 2222\n"));
        assert_eq!(exec.calls(), ["systemctl restart fail2ban"]);
    }

    #[test]
    fn rejects_bad_duration() {
        let ctx = make_context(
            "/".into(),
            Bindings::from_pairs([("FAIL2BAN_BANTIME", "forever")]),
            Arc::new(RecordingExecutor::default()),
            Arc::new(CapturedLog::new()),
        );
        assert!(IntrusionBan.plan(&ctx).is_err());
    }
}
