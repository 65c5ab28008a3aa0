//! Typed, validated parameters for each handler.
//!
//! Handlers never read raw strings out of [`Bindings`]; they build one of
//! these structs first so a malformed value stops the handler before any
//! SubStep has run.
use std::net::IpAddr;

use super::Bindings;
use crate::error::ProvisionError;

/// Default SSH port when `SSH_PORT` is unset.
pub const DEFAULT_SSH_PORT: u16 = 22;

fn invalid(key: &str, value: &str, reason: &str) -> ProvisionError {
    ProvisionError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a non-zero TCP/UDP port.
fn port(bindings: &Bindings, key: &str, default: u16) -> Result<u16, ProvisionError> {
    let value = bindings.parse_or(key, default)?;
    if value == 0 {
        return Err(invalid(key, "0", "port must be between 1 and 65535"));
    }
    Ok(value)
}

/// Check `value` against a simple character-class grammar.
fn check_chars(
    key: &str,
    value: &str,
    first: impl Fn(char) -> bool,
    rest: impl Fn(char) -> bool,
    max_len: usize,
    reason: &str,
) -> Result<(), ProvisionError> {
    let mut chars = value.chars();
    let ok = value.len() <= max_len && chars.next().is_some_and(first) && chars.all(rest);
    if ok {
        Ok(())
    } else {
        Err(invalid(key, value, reason))
    }
}

/// Validate a CIDR block such as `10.8.0.1/24` or `fd00::/64`.
fn check_cidr(key: &str, value: &str) -> Result<(), ProvisionError> {
    let reason = "expected an address with prefix length, e.g. 10.8.0.1/24";
    let (addr, prefix) = value
        .split_once('/')
        .ok_or_else(|| invalid(key, value, reason))?;
    let addr: IpAddr = addr.parse().map_err(|_| invalid(key, value, reason))?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid(key, value, reason))?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(invalid(key, value, reason));
    }
    Ok(())
}

/// Where the administrator's public key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Key material supplied directly in the configuration.
    Inline(String),
    /// Key list fetched over HTTPS (e.g. `https://github.com/<user>.keys`).
    Url(String),
}

/// Parameters for administrative-account provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountParams {
    /// Login name (`ADMIN_USER`).
    pub user: String,
    /// Authorized key (`ADMIN_PUBKEY` wins over `ADMIN_PUBKEY_URL`).
    pub key: Option<KeySource>,
    /// Delete the account password (`ADMIN_REMOVE_PASSWORD`).
    pub remove_password: bool,
    /// Grant password-less sudo (`ADMIN_NOPASSWD_SUDO`).
    pub nopasswd_sudo: bool,
}

impl AccountParams {
    /// Read and validate account parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `ADMIN_USER` is missing or malformed, or the key
    /// URL is not HTTPS.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        let user = b.require("ADMIN_USER")?;
        check_chars(
            "ADMIN_USER",
            user,
            |c| c.is_ascii_lowercase() || c == '_',
            |c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-',
            32,
            "expected a lowercase login name",
        )?;

        let key = if let Some(inline) = b.non_empty("ADMIN_PUBKEY") {
            Some(KeySource::Inline(inline.to_string()))
        } else if let Some(url) = b.non_empty("ADMIN_PUBKEY_URL") {
            if !url.starts_with("https://") {
                return Err(invalid("ADMIN_PUBKEY_URL", url, "only https URLs are fetched"));
            }
            Some(KeySource::Url(url.to_string()))
        } else {
            None
        };

        Ok(Self {
            user: user.to_string(),
            key,
            remove_password: b.is_true("ADMIN_REMOVE_PASSWORD"),
            nopasswd_sudo: b.is_true("ADMIN_NOPASSWD_SUDO"),
        })
    }
}

/// Parameters for the host firewall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirewallParams {
    /// Port allowed inbound for SSH (`SSH_PORT`).
    pub ssh_port: u16,
}

impl FirewallParams {
    /// Read and validate firewall parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `SSH_PORT` is not a valid port.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        Ok(Self {
            ssh_port: port(b, "SSH_PORT", DEFAULT_SSH_PORT)?,
        })
    }
}

/// Parameters for the intrusion-ban daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanParams {
    /// How long an offender stays banned (`FAIL2BAN_BANTIME`).
    pub bantime: String,
    /// Window in which failures are counted (`FAIL2BAN_FINDTIME`).
    pub findtime: String,
    /// Failures tolerated inside the window (`FAIL2BAN_MAXRETRY`).
    pub maxretry: u32,
    /// SSH port the jail watches.
    pub ssh_port: u16,
}

impl BanParams {
    /// Read and validate fail2ban parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a timing value is not `<digits>[smhdw]` or
    /// `FAIL2BAN_MAXRETRY` is not a positive integer.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        let duration = |key: &str, default: &str| -> Result<String, ProvisionError> {
            let value = b.non_empty(key).unwrap_or(default);
            let digits = value.trim_end_matches(['s', 'm', 'h', 'd', 'w']);
            let suffix_len = value.len() - digits.len();
            if digits.is_empty() || suffix_len > 1 || !digits.chars().all(|c| c.is_ascii_digit())
            {
                return Err(invalid(key, value, "expected a duration such as 600, 10m or 1h"));
            }
            Ok(value.to_string())
        };

        let maxretry = b.parse_or("FAIL2BAN_MAXRETRY", 5u32)?;
        if maxretry == 0 {
            return Err(invalid("FAIL2BAN_MAXRETRY", "0", "must be at least 1"));
        }

        Ok(Self {
            bantime: duration("FAIL2BAN_BANTIME", "1h")?,
            findtime: duration("FAIL2BAN_FINDTIME", "10m")?,
            maxretry,
            ssh_port: port(b, "SSH_PORT", DEFAULT_SSH_PORT)?,
        })
    }
}

/// Parameters for SSH daemon hardening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshParams {
    /// `Port` directive.
    pub port: u16,
    /// `PermitRootLogin` directive.
    pub permit_root_login: String,
    /// `PasswordAuthentication` directive.
    pub password_auth: String,
    /// systemd unit reloaded afterwards.
    pub service: String,
}

impl SshParams {
    /// Read and validate SSH hardening parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a policy value is not one sshd accepts.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        let root = b.non_empty("SSH_PERMIT_ROOT_LOGIN").unwrap_or("no");
        if !matches!(
            root,
            "yes" | "no" | "prohibit-password" | "forced-commands-only"
        ) {
            return Err(invalid(
                "SSH_PERMIT_ROOT_LOGIN",
                root,
                "expected yes, no, prohibit-password or forced-commands-only",
            ));
        }
        let password = b.non_empty("SSH_PASSWORD_AUTH").unwrap_or("no");
        if !matches!(password, "yes" | "no") {
            return Err(invalid("SSH_PASSWORD_AUTH", password, "expected yes or no"));
        }
        let service = b.non_empty("SSH_SERVICE").unwrap_or("ssh");
        check_chars(
            "SSH_SERVICE",
            service,
            |c| c.is_ascii_alphanumeric(),
            |c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'),
            64,
            "expected a systemd unit name",
        )?;

        Ok(Self {
            port: port(b, "SSH_PORT", DEFAULT_SSH_PORT)?,
            permit_root_login: root.to_string(),
            password_auth: password.to_string(),
            service: service.to_string(),
        })
    }
}

/// Parameters for the container runtime install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerParams {
    /// Account added to the `docker` group, if one is configured.
    pub member: Option<String>,
}

impl ContainerParams {
    /// Read container-runtime parameters.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible for symmetry with the other
    /// parameter sets.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        Ok(Self {
            member: b.non_empty("ADMIN_USER").map(String::from),
        })
    }
}

/// Parameters for the point-to-point VPN interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpnParams {
    /// Interface name (`WG_INTERFACE`).
    pub interface: String,
    /// UDP listen port (`WG_PORT`).
    pub port: u16,
    /// Interface address with prefix (`WG_ADDRESS`).
    pub address: String,
}

impl VpnParams {
    /// Read and validate `WireGuard` parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface name, port, or address is invalid.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        let interface = b.non_empty("WG_INTERFACE").unwrap_or("wg0");
        check_chars(
            "WG_INTERFACE",
            interface,
            |c| c.is_ascii_alphanumeric(),
            |c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'),
            15,
            "expected an interface name of at most 15 characters",
        )?;
        let address = b.non_empty("WG_ADDRESS").unwrap_or("10.8.0.1/24");
        check_cidr("WG_ADDRESS", address)?;

        Ok(Self {
            interface: interface.to_string(),
            port: port(b, "WG_PORT", 51820)?,
            address: address.to_string(),
        })
    }
}

/// Parameters for joining the overlay network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayParams {
    /// Pre-authorized join key (`TS_AUTHKEY`).
    pub auth_key: String,
    /// Node name (`TS_HOSTNAME`).
    pub hostname: Option<String>,
    /// Comma-separated subnet routes (`TS_ADVERTISE_ROUTES`).
    pub routes: Option<String>,
}

impl OverlayParams {
    /// Read and validate Tailscale parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `TS_AUTHKEY` is missing, the hostname is not a DNS
    /// label, or a route is not a CIDR block.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        let auth_key = b.require("TS_AUTHKEY")?;
        let hostname = b.non_empty("TS_HOSTNAME");
        if let Some(name) = hostname {
            check_chars(
                "TS_HOSTNAME",
                name,
                |c| c.is_ascii_alphanumeric(),
                |c| c.is_ascii_alphanumeric() || c == '-',
                63,
                "expected a DNS label",
            )?;
        }
        let routes = match b.non_empty("TS_ADVERTISE_ROUTES") {
            Some(raw) => {
                let routes: Vec<&str> = raw.split(',').map(str::trim).collect();
                for route in &routes {
                    check_cidr("TS_ADVERTISE_ROUTES", route)?;
                }
                Some(routes.join(","))
            }
            None => None,
        };

        Ok(Self {
            auth_key: auth_key.to_string(),
            hostname: hostname.map(String::from),
            routes,
        })
    }
}

/// Parameters for bulk tool installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParams {
    /// Package names (`TOOLS`).
    pub packages: Vec<String>,
}

impl ToolParams {
    /// Read and validate the tool list.
    ///
    /// # Errors
    ///
    /// Returns an error if a package name contains characters apt does not
    /// allow.
    pub fn from_bindings(b: &Bindings) -> Result<Self, ProvisionError> {
        let packages = b.list("TOOLS");
        for name in &packages {
            check_chars(
                "TOOLS",
                name,
                |c| c.is_ascii_lowercase() || c.is_ascii_digit(),
                |c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'),
                128,
                "expected Debian package names",
            )?;
        }
        Ok(Self { packages })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn account_requires_user() {
        let err = AccountParams::from_bindings(&Bindings::default()).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingParameter { ref key } if key == "ADMIN_USER"));
    }

    #[test]
    fn account_rejects_uppercase_user() {
        let b = Bindings::from_pairs([("ADMIN_USER", "Admin")]);
        assert!(AccountParams::from_bindings(&b).is_err());
    }

    #[test]
    fn account_rejects_shell_metacharacters() {
        let b = Bindings::from_pairs([("ADMIN_USER", "bob;rm")]);
        assert!(AccountParams::from_bindings(&b).is_err());
    }

    #[test]
    fn inline_key_wins_over_url() {
        let b = Bindings::from_pairs([
            ("ADMIN_USER", "deploy"),
            ("ADMIN_PUBKEY", "ssh-ed25519 AAAA deploy@laptop"),
            ("ADMIN_PUBKEY_URL", "https://github.com/deploy.keys"),
        ]);
        let p = AccountParams::from_bindings(&b).unwrap();
        assert_eq!(
            p.key,
            Some(KeySource::Inline("ssh-ed25519 AAAA deploy@laptop".into()))
        );
    }

    #[test]
    fn plain_http_key_url_is_rejected() {
        let b = Bindings::from_pairs([
            ("ADMIN_USER", "deploy"),
            ("ADMIN_PUBKEY_URL", "http://example.com/keys"),
        ]);
        assert!(AccountParams::from_bindings(&b).is_err());
    }

    #[test]
    fn account_flags_default_off() {
        let b = Bindings::from_pairs([("ADMIN_USER", "deploy")]);
        let p = AccountParams::from_bindings(&b).unwrap();
        assert!(!p.remove_password);
        assert!(!p.nopasswd_sudo);
        assert_eq!(p.key, None);
    }

    #[test]
    fn firewall_default_port() {
        let p = FirewallParams::from_bindings(&Bindings::default()).unwrap();
        assert_eq!(p.ssh_port, 22);
    }

    #[test]
    fn zero_port_is_rejected() {
        let b = Bindings::from_pairs([("SSH_PORT", "0")]);
        assert!(FirewallParams::from_bindings(&b).is_err());
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        let b = Bindings::from_pairs([("SSH_PORT", "70000")]);
        assert!(FirewallParams::from_bindings(&b).is_err());
    }

    #[test]
    fn ban_defaults() {
        let p = BanParams::from_bindings(&Bindings::default()).unwrap();
        assert_eq!(p.bantime, "1h");
        assert_eq!(p.findtime, "10m");
        assert_eq!(p.maxretry, 5);
    }

    #[test]
    fn ban_accepts_bare_seconds() {
        let b = Bindings::from_pairs([("FAIL2BAN_BANTIME", "3600")]);
        assert_eq!(BanParams::from_bindings(&b).unwrap().bantime, "3600");
    }

    #[test]
    fn ban_rejects_malformed_duration() {
        for bad in ["h", "1hh", "ten", "-1h"] {
            let b = Bindings::from_pairs([("FAIL2BAN_FINDTIME", bad)]);
            assert!(BanParams::from_bindings(&b).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn ban_rejects_zero_retries() {
        let b = Bindings::from_pairs([("FAIL2BAN_MAXRETRY", "0")]);
        assert!(BanParams::from_bindings(&b).is_err());
    }

    #[test]
    fn ssh_defaults_are_hardened() {
        let p = SshParams::from_bindings(&Bindings::default()).unwrap();
        assert_eq!(p.permit_root_login, "no");
        assert_eq!(p.password_auth, "no");
        assert_eq!(p.service, "ssh");
    }

    #[test]
    fn ssh_rejects_unknown_policy() {
        let b = Bindings::from_pairs([("SSH_PASSWORD_AUTH", "maybe")]);
        assert!(SshParams::from_bindings(&b).is_err());
    }

    #[test]
    fn vpn_defaults() {
        let p = VpnParams::from_bindings(&Bindings::default()).unwrap();
        assert_eq!(p.interface, "wg0");
        assert_eq!(p.port, 51820);
        assert_eq!(p.address, "10.8.0.1/24");
    }

    #[test]
    fn vpn_rejects_bad_address() {
        for bad in ["10.8.0.1", "10.8.0.1/33", "nope/24"] {
            let b = Bindings::from_pairs([("WG_ADDRESS", bad)]);
            assert!(VpnParams::from_bindings(&b).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn vpn_rejects_long_interface() {
        let b = Bindings::from_pairs([("WG_INTERFACE", "averyveryverylongname")]);
        assert!(VpnParams::from_bindings(&b).is_err());
    }

    #[test]
    fn overlay_requires_auth_key() {
        assert!(OverlayParams::from_bindings(&Bindings::default()).is_err());
    }

    #[test]
    fn overlay_validates_routes() {
        let b = Bindings::from_pairs([
            ("TS_AUTHKEY", "tskey-abc"),
            ("TS_ADVERTISE_ROUTES", "10.0.0.0/24, 192.168.1.0/24"),
        ]);
        let p = OverlayParams::from_bindings(&b).unwrap();
        assert_eq!(p.routes.as_deref(), Some("10.0.0.0/24,192.168.1.0/24"));

        let b = Bindings::from_pairs([("TS_AUTHKEY", "k"), ("TS_ADVERTISE_ROUTES", "lan")]);
        assert!(OverlayParams::from_bindings(&b).is_err());
    }

    #[test]
    fn tools_list_parsed() {
        let b = Bindings::from_pairs([("TOOLS", "htop git build-essential g++")]);
        let p = ToolParams::from_bindings(&b).unwrap();
        assert_eq!(p.packages, ["htop", "git", "build-essential", "g++"]);
    }

    #[test]
    fn tools_reject_option_injection() {
        let b = Bindings::from_pairs([("TOOLS", "htop --allow-unauthenticated")]);
        assert!(ToolParams::from_bindings(&b).is_err());
    }

    #[test]
    fn container_member_follows_admin_user() {
        let b = Bindings::from_pairs([("ADMIN_USER", "deploy")]);
        let p = ContainerParams::from_bindings(&b).unwrap();
        assert_eq!(p.member.as_deref(), Some("deploy"));
    }
}
