//! Point-to-point VPN interface (`WireGuard`).
use crate::config::params::VpnParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

/// Generates a keypair, writes the interface config, and enables
/// `wg-quick@<interface>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VpnInterface;

/// Render the `[Interface]` section.
///
/// The private key stays in its own file and is loaded by `PostUp`, so the
/// interface config never contains key material.
fn interface_config(params: &VpnParams, private_key: &str) -> String {
    format!(
        "[Interface]\n\
         Address = {}\n\
         ListenPort = {}\n\
         PostUp = wg set %i private-key {private_key}\n",
        params.address, params.port
    )
}

impl Handler for VpnInterface {
    fn name(&self) -> &str {
        "WireGuard interface"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = VpnParams::from_bindings(&ctx.bindings)?;
        let iface = params.interface.as_str();
        let key_file = format!("/etc/wireguard/{iface}.key");
        let conf = ctx.host_path(&format!("/etc/wireguard/{iface}.conf"));

        let mut plan = Plan::new();
        if !ctx.has("wg") {
            plan.step("install wireguard", Action::apt_install(&["wireguard"]));
        }
        plan.step(
            format!("generate keypair for {iface}"),
            Action::GenerateKeypair {
                private_key: ctx.host_path(&key_file),
                public_key: ctx.host_path(&format!("/etc/wireguard/{iface}.pub")),
            },
        );
        plan.backup(conf.clone());
        plan.step(
            format!("write {iface} config ({}, port {})", params.address, params.port),
            Action::WriteFile {
                path: conf,
                contents: interface_config(&params, &key_file),
                mode: 0o600,
            },
        );
        plan.step(
            format!("enable wg-quick@{iface}"),
            Action::run("systemctl", &["enable", "--now", &format!("wg-quick@{iface}")]),
        );
        Ok(plan)
    }
}
