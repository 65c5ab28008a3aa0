//! SSH daemon hardening.
use crate::config::params::SshParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

const SSHD_CONFIG: &str = "/etc/ssh/sshd_config";

/// Rewrites the port, root-login and password-auth directives of
/// `sshd_config`, validates the result, and reloads the daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardenSsh;

impl Handler for HardenSsh {
    fn name(&self) -> &str {
        "SSH hardening"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = SshParams::from_bindings(&ctx.bindings)?;
        let config = ctx.host_path(SSHD_CONFIG);
        let config_arg = config.to_string_lossy().to_string();

        let directives = [
            ("Port", params.port.to_string()),
            ("PermitRootLogin", params.permit_root_login.clone()),
            ("PasswordAuthentication", params.password_auth.clone()),
        ];

        let mut plan = Plan::new();
        plan.backup(config.clone());
        for (key, value) in directives {
            plan.step(
                format!("set {key} {value}"),
                Action::SetDirective {
                    path: config.clone(),
                    key: key.to_string(),
                    value,
                },
            );
        }
        plan.step(
            "validate sshd configuration",
            Action::run("sshd", &["-t", "-f", &config_arg]),
        );
        plan.step(
            format!("reload {}", params.service),
            Action::run("systemctl", &["reload", &params.service]),
        );
        Ok(plan)
    }
}
