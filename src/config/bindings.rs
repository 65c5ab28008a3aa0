//! Variable binder: resolves declarations into a read-only lookup table.
//!
//! Configuration content is trusted. A `STANDARD` remainder that is not an
//! assignment is a directive and is later executed verbatim through the
//! shell (see [`Action::TrustedRaw`](crate::resources::Action::TrustedRaw)).
//! Anything that could ingest configuration from an untrusted source must
//! not accept directives.
use std::collections::HashMap;
use std::str::FromStr;

use super::{ConfigFile, Tier};
use crate::error::ProvisionError;

/// Value an `OPTIONAL` flag must have to trigger its handler.
pub const TRUE_LITERAL: &str = "true";

/// Interpretation of a declaration's text.
///
/// # Examples
///
/// ```
/// use hostprep_cli::config::Statement;
///
/// assert_eq!(
///     Statement::parse("SSH_PORT=2222"),
///     Statement::Assign { key: "SSH_PORT".into(), value: "2222".into() },
/// );
/// assert_eq!(
///     Statement::parse("apt-get install -y curl"),
///     Statement::Directive("apt-get install -y curl".into()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `KEY=VALUE` where `KEY` is a shell-style identifier.
    Assign {
        /// Variable name.
        key: String,
        /// Value with matching surrounding quotes removed.
        value: String,
    },
    /// Anything else: a command to run with host privileges.
    Directive(String),
}

impl Statement {
    /// Split `text` on the first `=`; fall back to a directive when the
    /// left-hand side is not an identifier.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some((key, value)) = text.split_once('=') {
            let key = key.trim();
            if is_identifier(key) {
                return Self::Assign {
                    key: key.to_string(),
                    value: unquote(value.trim()).to_string(),
                };
            }
        }
        Self::Directive(text.to_string())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one pair of matching single or double quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2
            && let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}

/// Process-wide table of bound configuration values.
///
/// Immutable once built; handlers read their parameters from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    /// Bind every `STANDARD` and `OPTIONAL` assignment in file order.
    ///
    /// Later assignments to the same key win. `DISABLED` declarations are
    /// never bound.
    #[must_use]
    pub fn from_config(config: &ConfigFile) -> Self {
        let mut values = HashMap::new();
        for tier in [Tier::Standard, Tier::Optional] {
            for decl in config.tier(tier) {
                if let Statement::Assign { key, value } = decl.statement() {
                    values.insert(key, value);
                }
            }
        }
        Self { values }
    }

    /// Build bindings from explicit pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Raw bound value, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Bound value, treating an empty string as unset.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Whether `key` is bound to the true-literal.
    #[must_use]
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key) == Some(TRUE_LITERAL)
    }

    /// Bound, non-empty value or [`ProvisionError::MissingParameter`].
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is unbound or empty.
    pub fn require(&self, key: &str) -> Result<&str, ProvisionError> {
        self.non_empty(key)
            .ok_or_else(|| ProvisionError::MissingParameter {
                key: key.to_string(),
            })
    }

    /// Parse the bound value, or return `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::InvalidParameter`] if the value does not
    /// parse as `T`.
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ProvisionError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.non_empty(key).map_or(Ok(default), |raw| {
            raw.parse().map_err(|e: T::Err| ProvisionError::InvalidParameter {
                key: key.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
        })
    }

    /// Whitespace-separated list value; empty when unset.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
