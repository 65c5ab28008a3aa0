//! Administrative account provisioning.
use crate::config::params::{AccountParams, KeySource};
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

/// Creates the admin account, installs its SSH key, and optionally drops
/// the password and grants password-less sudo.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminAccount;

/// Drop-in sudoers file for `user`.
fn sudoers_file(user: &str) -> String {
    format!("/etc/sudoers.d/90-hostprep-{user}")
}

impl Handler for AdminAccount {
    fn name(&self) -> &str {
        "administrative account"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = AccountParams::from_bindings(&ctx.bindings)?;
        let user = params.user.as_str();
        let ssh_dir = ctx.host_path(&format!("/home/{user}/.ssh"));
        let authorized_keys = ssh_dir.join("authorized_keys");
        let ssh_dir_arg = ssh_dir.to_string_lossy().to_string();
        let owner = format!("{user}:{user}");

        let mut plan = Plan::new();
        plan.step(
            format!("create account {user}"),
            Action::run(
                "useradd",
                &[
                    "--create-home",
                    "--shell",
                    "/bin/bash",
                    "--groups",
                    "sudo",
                    user,
                ],
            ),
        );

        match &params.key {
            Some(KeySource::Inline(key)) => {
                plan.backup(authorized_keys.clone());
                plan.step(
                    format!("install authorized key for {user}"),
                    Action::WriteFile {
                        path: authorized_keys,
                        contents: format!("{key}\n"),
                        mode: 0o600,
                    },
                );
            }
            Some(KeySource::Url(url)) => {
                plan.backup(authorized_keys.clone());
                plan.step(
                    format!("fetch authorized keys for {user} from {url}"),
                    Action::Download {
                        url: url.clone(),
                        path: authorized_keys,
                        mode: 0o600,
                    },
                );
            }
            None => ctx
                .log
                .debug("no ADMIN_PUBKEY or ADMIN_PUBKEY_URL; authorized_keys left alone"),
        }

        if params.key.is_some() {
            plan.step(
                format!("restrict {ssh_dir_arg}"),
                Action::run("chmod", &["700", &ssh_dir_arg]),
            );
            plan.step(
                format!("hand {ssh_dir_arg} to {user}"),
                Action::run("chown", &["-R", &owner, &ssh_dir_arg]),
            );
        }

        if params.remove_password {
            plan.step(
                format!("remove password of {user}"),
                Action::run("passwd", &["--delete", user]),
            );
        }

        if params.nopasswd_sudo {
            let sudoers = ctx.host_path(&sudoers_file(user));
            let sudoers_arg = sudoers.to_string_lossy().to_string();
            plan.backup(sudoers.clone());
            plan.step(
                format!("grant password-less sudo to {user}"),
                Action::WriteFile {
                    path: sudoers,
                    contents: format!("{user} ALL=(ALL) NOPASSWD:ALL\n"),
                    mode: 0o440,
                },
            );
            plan.step(
                format!("validate {sudoers_arg}"),
                Action::run("visudo", &["-cf", &sudoers_arg]),
            );
        }

        Ok(plan)
    }
}
