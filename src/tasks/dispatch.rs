//! The fixed mapping from optional flag names to handlers.
use std::fmt;

use super::Handler;
use super::account::AdminAccount;
use super::docker::ContainerRuntime;
use super::fail2ban::IntrusionBan;
use super::firewall::Firewall;
use super::ssh::HardenSsh;
use super::tailscale::OverlayJoin;
use super::tools::InstallTools;
use super::wireguard::VpnInterface;

/// Every handler a configuration flag can trigger.
///
/// # Examples
///
/// ```
/// use hostprep_cli::tasks::HandlerKind;
///
/// assert_eq!(HandlerKind::from_flag("ENABLE_UFW"), Some(HandlerKind::Firewall));
/// assert_eq!(HandlerKind::from_flag("enable_ufw"), None);
/// assert_eq!(HandlerKind::Firewall.handler().name(), "firewall");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// `CREATE_ADMIN_USER`
    AdminAccount,
    /// `ENABLE_UFW`
    Firewall,
    /// `ENABLE_FAIL2BAN`
    IntrusionBan,
    /// `HARDEN_SSH`
    HardenSsh,
    /// `INSTALL_DOCKER`
    ContainerRuntime,
    /// `SETUP_WIREGUARD`
    VpnInterface,
    /// `JOIN_TAILSCALE`
    OverlayJoin,
    /// `INSTALL_TOOLS`
    InstallTools,
}

impl HandlerKind {
    /// Every variant, in table order.
    pub const ALL: [Self; 8] = [
        Self::AdminAccount,
        Self::Firewall,
        Self::IntrusionBan,
        Self::HardenSsh,
        Self::ContainerRuntime,
        Self::VpnInterface,
        Self::OverlayJoin,
        Self::InstallTools,
    ];

    /// Configuration key that triggers this handler.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::AdminAccount => "CREATE_ADMIN_USER",
            Self::Firewall => "ENABLE_UFW",
            Self::IntrusionBan => "ENABLE_FAIL2BAN",
            Self::HardenSsh => "HARDEN_SSH",
            Self::ContainerRuntime => "INSTALL_DOCKER",
            Self::VpnInterface => "SETUP_WIREGUARD",
            Self::OverlayJoin => "JOIN_TAILSCALE",
            Self::InstallTools => "INSTALL_TOOLS",
        }
    }

    /// Look up the handler for a configuration key (case-sensitive).
    #[must_use]
    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.flag() == flag)
    }

    /// The handler implementation.
    #[must_use]
    pub fn handler(self) -> &'static dyn Handler {
        match self {
            Self::AdminAccount => &AdminAccount,
            Self::Firewall => &Firewall,
            Self::IntrusionBan => &IntrusionBan,
            Self::HardenSsh => &HardenSsh,
            Self::ContainerRuntime => &ContainerRuntime,
            Self::VpnInterface => &VpnInterface,
            Self::OverlayJoin => &OverlayJoin,
            Self::InstallTools => &InstallTools,
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}
