//! Domain-specific error types for the provisioning engine.
//!
//! Internal action code works with [`anyhow::Error`]; anything that crosses a
//! component boundary (config loading, the confirmation gate, the driver) is
//! converted into a [`ProvisionError`] so the tier policy can be decided by
//! matching on the variant.
//!
//! # Error taxonomy
//!
//! ```text
//! ProvisionError
//! ├── ConfigNotFound    fatal, startup
//! ├── PrivilegeError    fatal, startup
//! ├── InvalidFlag       fatal, startup
//! ├── ActionFailed      fatal for Standard tier, recoverable for Optional
//! ├── BackupFailed      always recoverable
//! ├── MissingParameter  surfaced as ActionFailed for the handler's tier
//! └── InvalidParameter  surfaced as ActionFailed for the handler's tier
//! ```
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Tier;

/// Top-level error type for the provisioning engine.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The configuration file could not be read.
    #[error("configuration file not found or unreadable: {path}: {source}")]
    ConfigNotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The process lacks administrative privilege.
    #[error("administrative privilege required (re-run as root)")]
    PrivilegeError,

    /// An unrecognized command-line flag was supplied.
    #[error("invalid flag: {0}")]
    InvalidFlag(String),

    /// A SubStep failed while executing.
    #[error("{tier} action failed: {description}: {reason}")]
    ActionFailed {
        /// Description of the SubStep (or handler) that failed.
        description: String,
        /// Tier the failing work belonged to.
        tier: Tier,
        /// Human-readable failure reason.
        reason: String,
    },

    /// A defensive backup copy could not be written.
    #[error("backup of {path} failed: {reason}")]
    BackupFailed {
        /// File that was being backed up.
        path: PathBuf,
        /// Human-readable failure reason.
        reason: String,
    },

    /// A handler needs a configuration key that was never bound.
    #[error("missing required parameter {key}")]
    MissingParameter {
        /// Configuration key.
        key: String,
    },

    /// A bound configuration value does not have the expected shape.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidParameter {
        /// Configuration key.
        key: String,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: String,
    },
}

impl ProvisionError {
    /// Whether this error must halt the whole run.
    ///
    /// Startup errors and Standard-tier action failures are fatal; everything
    /// else is logged and the run moves on to the next declaration.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::ConfigNotFound { .. } | Self::PrivilegeError | Self::InvalidFlag(_) => true,
            Self::ActionFailed { tier, .. } => matches!(tier, Tier::Standard),
            Self::BackupFailed { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidParameter { .. } => false,
        }
    }

    /// Re-express a parameter error as a failure of `description` at `tier`.
    ///
    /// `ActionFailed` values pass through unchanged.
    #[must_use]
    pub fn into_action_failure(self, description: &str, tier: Tier) -> Self {
        match self {
            Self::ActionFailed { .. } => self,
            other => Self::ActionFailed {
                description: description.to_string(),
                tier,
                reason: other.to_string(),
            },
        }
    }
}
