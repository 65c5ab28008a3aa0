//! Command-line interface.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::error::ProvisionError;

/// Version reported by `--version` and the startup banner.
pub const VERSION: &str = match option_env!("HOSTPREP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Top-level CLI entry point for the provisioning orchestrator.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "hostprep",
    about = "Declarative single-host provisioning",
    version = VERSION
)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "hostprep.conf")]
    pub config: PathBuf,

    /// Append every log record, including DEBUG, to this file
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Show DEBUG output on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Apply every step without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Log what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Prefix for host files read or written by handlers
    #[arg(long, default_value = "/")]
    pub root: PathBuf,
}

impl Cli {
    /// Parse `args` (including the program name).
    ///
    /// `--help` and `--version` are printed here and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::InvalidFlag`] carrying clap's usage message
    /// for any unrecognized or malformed argument.
    pub fn parse_args<I, T>(args: I) -> Result<Option<Self>, ProvisionError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(Some(cli)),
            Err(e) if !e.use_stderr() => {
                let _ = e.print();
                Ok(None)
            }
            Err(e) => {
                let rendered = e.render().to_string();
                let message = rendered.trim_start_matches("error: ").trim_end();
                Err(ProvisionError::InvalidFlag(message.to_string()))
            }
        }
    }
}
