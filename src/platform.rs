//! Host facts: privilege level, distribution, and CPU architecture.
use std::fmt;
use std::path::Path;

/// Distribution identity read from `os-release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distro {
    /// `ID` (e.g. `ubuntu`, `debian`).
    pub id: String,
    /// `VERSION_CODENAME` (e.g. `noble`, `bookworm`).
    pub codename: Option<String>,
}

impl Default for Distro {
    fn default() -> Self {
        Self {
            id: "linux".to_string(),
            codename: None,
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.codename {
            Some(codename) => write!(f, "{} ({codename})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl Distro {
    /// Parse the contents of an `os-release` file.
    ///
    /// # Examples
    ///
    /// ```
    /// use hostprep_cli::platform::Distro;
    ///
    /// let d = Distro::parse("ID=ubuntu\nVERSION_CODENAME=noble\n");
    /// assert_eq!(d.id, "ubuntu");
    /// assert_eq!(d.codename.as_deref(), Some("noble"));
    /// ```
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut distro = Self::default();
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key.trim() {
                "ID" if !value.is_empty() => distro.id = value.to_string(),
                "VERSION_CODENAME" if !value.is_empty() => {
                    distro.codename = Some(value.to_string());
                }
                _ => {}
            }
        }
        distro
    }
}

/// Platform information for the current host.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Effective user is root.
    pub privileged: bool,
    /// Distribution identity.
    pub distro: Distro,
    /// Debian architecture name (`amd64`, `arm64`, ...).
    pub arch: String,
}

impl Platform {
    /// Detect the current platform, reading `etc/os-release` under `root`.
    #[must_use]
    pub fn detect(root: &Path) -> Self {
        let distro = std::fs::read_to_string(root.join("etc/os-release"))
            .map(|c| Distro::parse(&c))
            .unwrap_or_default();
        Self {
            privileged: nix::unistd::geteuid().is_root(),
            distro,
            arch: debian_arch(std::env::consts::ARCH).to_string(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[must_use]
    pub fn new(privileged: bool, distro: Distro, arch: &str) -> Self {
        Self {
            privileged,
            distro,
            arch: arch.to_string(),
        }
    }
}

/// Map a Rust target architecture to the Debian name used in apt sources.
fn debian_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "arm" => "armhf",
        "x86" => "i386",
        "powerpc64" => "ppc64el",
        other => other,
    }
}
