//! Overlay-network join (Tailscale).
use crate::config::params::OverlayParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

const INSTALL_SCRIPT_URL: &str = "https://tailscale.com/install.sh";
const INSTALL_SCRIPT: &str = "/var/tmp/hostprep-tailscale-install.sh";

/// Installs the client, enables `tailscaled`, and joins with an auth key.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayJoin;

/// Arguments for `tailscale up`.
fn up_args(params: &OverlayParams) -> Vec<String> {
    let mut args = vec!["up".to_string(), format!("--authkey={}", params.auth_key)];
    if let Some(hostname) = &params.hostname {
        args.push(format!("--hostname={hostname}"));
    }
    if let Some(routes) = &params.routes {
        args.push(format!("--advertise-routes={routes}"));
    }
    args
}

impl Handler for OverlayJoin {
    fn name(&self) -> &str {
        "overlay network join"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = OverlayParams::from_bindings(&ctx.bindings)?;

        let mut plan = Plan::new();
        if !ctx.has("tailscale") {
            let script = ctx.host_path(INSTALL_SCRIPT);
            let script_arg = script.to_string_lossy().to_string();
            plan.step(
                "download Tailscale installer",
                Action::Download {
                    url: INSTALL_SCRIPT_URL.to_string(),
                    path: script,
                    mode: 0o700,
                },
            );
            plan.step("install Tailscale", Action::run("sh", &[&script_arg]));
        }
        plan.step(
            "enable tailscaled",
            Action::run("systemctl", &["enable", "--now", "tailscaled"]),
        );

        let args = up_args(&params);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let join = match &params.hostname {
            Some(hostname) => format!("join tailnet as {hostname}"),
            None => "join tailnet".to_string(),
        };
        plan.step(join, Action::run_sensitive("tailscale", &args));
        Ok(plan)
    }
}
