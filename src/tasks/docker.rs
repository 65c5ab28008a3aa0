//! Container runtime from the upstream Docker apt repository.
use crate::config::params::ContainerParams;
use crate::error::ProvisionError;
use crate::resources::Action;

use super::{Context, Handler, Plan};

const KEYRING: &str = "/etc/apt/keyrings/docker.asc";
const SOURCE_LIST: &str = "/etc/apt/sources.list.d/docker.list";
const PACKAGES: [&str; 5] = [
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

/// Adds the Docker apt repository, installs the engine and compose plugin,
/// and puts the admin account in the `docker` group.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerRuntime;

impl Handler for ContainerRuntime {
    fn name(&self) -> &str {
        "container runtime"
    }

    fn plan(&self, ctx: &Context) -> Result<Plan, ProvisionError> {
        let params = ContainerParams::from_bindings(&ctx.bindings)?;
        let distro = &ctx.platform.distro;
        if !matches!(distro.id.as_str(), "debian" | "ubuntu") {
            return Err(ProvisionError::InvalidParameter {
                key: "ID".to_string(),
                value: distro.id.clone(),
                reason: "Docker packages are published for debian and ubuntu".to_string(),
            });
        }
        let codename = distro
            .codename
            .as_deref()
            .ok_or_else(|| ProvisionError::MissingParameter {
                key: "VERSION_CODENAME".to_string(),
            })?;
        let repo = format!("https://download.docker.com/linux/{}", distro.id);
        let sources = ctx.host_path(SOURCE_LIST);

        let mut plan = Plan::new();
        plan.step(
            "add Docker signing key",
            Action::Download {
                url: format!("{repo}/gpg"),
                path: ctx.host_path(KEYRING),
                mode: 0o644,
            },
        );
        plan.backup(sources.clone());
        plan.step(
            format!("add Docker apt repository ({codename})"),
            Action::WriteFile {
                path: sources,
                contents: format!(
                    "deb [arch={} signed-by={KEYRING}] {repo} {codename} stable\n",
                    ctx.platform.arch
                ),
                mode: 0o644,
            },
        );
        plan.step("refresh package lists", Action::run("apt-get", &["update"]));
        plan.step(
            "install Docker engine and compose plugin",
            Action::apt_install(&PACKAGES),
        );
        if let Some(member) = &params.member {
            plan.step(
                format!("add {member} to the docker group"),
                Action::run("usermod", &["-aG", "docker", member]),
            );
        }
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
    use crate::platform::{Distro, Platform};
    use crate::tasks::run_handler;
    use crate::tasks::test_helpers::{RecordingExecutor, make_context};

    #[test]
    fn writes_repository_for_host_release() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(RecordingExecutor::default());
        let ctx = make_context(
            dir.path().to_path_buf(),
            Bindings::from_pairs([("ADMIN_USER", "deploy")]),
            exec.clone(),
            Arc::new(CapturedLog::new()),
        );
        run_handler(&ctx, &ContainerRuntime, Tier::Optional).unwrap();

        let list =
            std::fs::read_to_string(dir.path().join("etc/apt/sources.list.d/docker.list")).unwrap();
        assert_eq!(
            list,
            "deb [arch=amd64 signed-by=/etc/apt/keyrings/docker.asc] \
             https://download.docker.com/linux/ubuntu noble stable\n"
        );
        let calls = exec.calls();
        assert_eq!(
            calls.first().map(String::as_str),
            Some("GET https://download.docker.com/linux/ubuntu/gpg")
        );
        assert_eq!(
            calls.last().map(String::as_str),
            Some("usermod -aG docker deploy")
        );
    }

    #[test]
    fn no_group_step_without_admin_user() {
        let ctx = make_context(
            "/".into(),
            Bindings::default(),
            Arc::new(RecordingExecutor::default()),
            Arc::new(CapturedLog::new()),
        );
        let plan = ContainerRuntime.plan(&ctx).unwrap();
        assert!(!plan.descriptions().iter().any(|d| d.contains("docker group")));
    }

    #[test]
    fn missing_codename_is_an_error() {
        let mut ctx = make_context(
            "/".into(),
            Bindings::default(),
            Arc::new(RecordingExecutor::default()),
            Arc::new(CapturedLog::new()),
        );
        ctx.platform = Platform::new(
            true,
            Distro {
                id: "debian".into(),
                codename: None,
            },
            "arm64",
        );
        let err = ContainerRuntime.plan(&ctx).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingParameter { ref key } if key == "VERSION_CODENAME"));
    }

    #[test]
    fn unsupported_distribution_is_rejected() {
        let mut ctx = make_context(
            "/".into(),
            Bindings::default(),
            Arc::new(RecordingExecutor::default()),
            Arc::new(CapturedLog::new()),
        );
        ctx.platform = Platform::new(true, Distro::default(), "amd64");
        assert!(ContainerRuntime.plan(&ctx).is_err());
    }
}
