//! The closed set of side effects a SubStep may perform.
//!
//! Every host change goes through one [`Action`] variant. Only
//! [`Action::TrustedRaw`] evaluates configuration text as a shell command;
//! everything else is typed.
pub mod fs;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::exec::Executor;

/// A single typed unit of work.
///
/// # Examples
///
/// ```
/// use hostprep_cli::resources::Action;
///
/// let action = Action::run("ufw", &["allow", "22/tcp"]);
/// assert_eq!(action.describe(), "ufw allow 22/tcp");
///
/// let secret = Action::run_sensitive("tailscale", &["up", "--authkey=tskey-123"]);
/// assert_eq!(secret.describe(), "tailscale <arguments hidden>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a program with arguments.
    Run {
        /// Program name or path.
        program: String,
        /// Arguments passed verbatim (no shell).
        args: Vec<String>,
        /// Hide the arguments from descriptions and logs.
        sensitive: bool,
    },
    /// Create or replace a file with the given Unix mode.
    WriteFile {
        /// Destination path.
        path: PathBuf,
        /// Full file contents.
        contents: String,
        /// Permission bits, e.g. `0o600`.
        mode: u32,
    },
    /// Set a `Key value` directive in an existing config file.
    SetDirective {
        /// File to edit.
        path: PathBuf,
        /// Directive keyword.
        key: String,
        /// New value.
        value: String,
    },
    /// Fetch an HTTPS resource into a file.
    Download {
        /// Source URL.
        url: String,
        /// Destination path.
        path: PathBuf,
        /// Permission bits for the written file.
        mode: u32,
    },
    /// Create a `WireGuard` keypair, reusing an existing private key.
    GenerateKeypair {
        /// Private key file (mode 600).
        private_key: PathBuf,
        /// Public key file (mode 644).
        public_key: PathBuf,
    },
    /// Evaluate configuration-supplied text with `sh -c`.
    ///
    /// Runs with the tool's full privileges; the configuration file is the
    /// trust boundary.
    TrustedRaw {
        /// Shell command line taken from the configuration.
        command: String,
    },
}

impl Action {
    /// Build a [`Action::Run`] with visible arguments.
    #[must_use]
    pub fn run(program: &str, args: &[&str]) -> Self {
        Self::Run {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            sensitive: false,
        }
    }

    /// Build a [`Action::Run`] whose arguments never appear in logs.
    #[must_use]
    pub fn run_sensitive(program: &str, args: &[&str]) -> Self {
        Self::Run {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            sensitive: true,
        }
    }

    /// Install Debian packages without any apt prompts.
    #[must_use]
    pub fn apt_install<S: AsRef<str>>(packages: &[S]) -> Self {
        let mut args = vec![
            "DEBIAN_FRONTEND=noninteractive".to_string(),
            "apt-get".to_string(),
            "install".to_string(),
            "-y".to_string(),
        ];
        args.extend(packages.iter().map(|p| p.as_ref().to_string()));
        Self::Run {
            program: "env".to_string(),
            args,
            sensitive: false,
        }
    }

    /// One-line human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Perform the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the program exits non-zero, a file cannot be
    /// read or written, or a download fails.
    pub fn apply(&self, executor: &dyn Executor) -> Result<()> {
        match self {
            Self::Run { program, args, .. } => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                executor.run(program, &args)?;
            }
            Self::WriteFile {
                path,
                contents,
                mode,
            } => fs::write_with_mode(path, contents, *mode)?,
            Self::SetDirective { path, key, value } => {
                fs::set_directive_in_file(path, key, value)?;
            }
            Self::Download { url, path, mode } => {
                let body = executor.fetch(url)?;
                fs::write_with_mode(path, &body, *mode)?;
            }
            Self::GenerateKeypair {
                private_key,
                public_key,
            } => generate_keypair(executor, private_key, public_key)?,
            Self::TrustedRaw { command } => {
                executor.run("sh", &["-c", command])?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run {
                program,
                sensitive: true,
                ..
            } => write!(f, "{program} <arguments hidden>"),
            Self::Run { program, args, .. } if args.is_empty() => f.write_str(program),
            Self::Run { program, args, .. } => write!(f, "{program} {}", args.join(" ")),
            Self::WriteFile { path, mode, .. } => {
                write!(f, "write {} (mode {mode:o})", path.display())
            }
            Self::SetDirective { path, key, value } => {
                write!(f, "set {key} {value} in {}", path.display())
            }
            Self::Download { url, path, .. } => {
                write!(f, "download {url} to {}", path.display())
            }
            Self::GenerateKeypair { private_key, .. } => {
                write!(f, "generate keypair {}", private_key.display())
            }
            Self::TrustedRaw { command } => write!(f, "sh -c '{command}'"),
        }
    }
}

fn generate_keypair(
    executor: &dyn Executor,
    private_key: &Path,
    public_key: &Path,
) -> Result<()> {
    let private = if private_key.is_file() {
        std::fs::read_to_string(private_key)
            .with_context(|| format!("reading {}", private_key.display()))?
            .trim()
            .to_string()
    } else {
        let generated = executor.run("wg", &["genkey"])?.stdout.trim().to_string();
        fs::write_with_mode(private_key, &format!("{generated}\n"), 0o600)?;
        generated
    };
    let public = executor
        .run_with_input("wg", &["pubkey"], &format!("{private}\n"))?
        .stdout
        .trim()
        .to_string();
    fs::write_with_mode(public_key, &format!("{public}\n"), 0o644)
}
