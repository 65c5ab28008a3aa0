//! Configuration: tiered declarations, the variable binder, and typed
//! handler parameters.
pub mod bindings;
pub mod loader;
pub mod params;

use std::fmt;

pub use bindings::{Bindings, Statement, TRUE_LITERAL};

/// Classification of a configuration line.
///
/// # Examples
///
/// ```
/// use hostprep_cli::config::Tier;
///
/// assert_eq!(Tier::from_token("OPTIONAL"), Some(Tier::Optional));
/// assert_eq!(Tier::from_token("optional"), None);
/// assert_eq!(Tier::Standard.to_string(), "STANDARD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Applied every run; failures halt the run.
    Standard,
    /// Boolean flag that triggers a handler when true.
    Optional,
    /// Declared for visibility only; never executed.
    Disabled,
}

impl Tier {
    /// All tiers, in the order their declarations are processed.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Optional, Self::Disabled];

    /// The literal token that introduces a line of this tier.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Optional => "OPTIONAL",
            Self::Disabled => "DISABLED",
        }
    }

    /// Parse a tier token (case-sensitive).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.token() == token)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One classified line of the configuration file, with its tier token and
/// surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Tier the line was declared under.
    pub tier: Tier,
    /// Everything after the tier token.
    pub text: String,
    /// 1-based line number in the source file.
    pub line: usize,
}

impl Declaration {
    /// Interpret the declaration text as an assignment or a directive.
    #[must_use]
    pub fn statement(&self) -> Statement {
        Statement::parse(&self.text)
    }
}

/// The parsed configuration: three ordered declaration sequences.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// `STANDARD` declarations in file order.
    pub standard: Vec<Declaration>,
    /// `OPTIONAL` declarations in file order.
    pub optional: Vec<Declaration>,
    /// `DISABLED` declarations in file order.
    pub disabled: Vec<Declaration>,
}

impl ConfigFile {
    /// Declarations of a single tier.
    #[must_use]
    pub fn tier(&self, tier: Tier) -> &[Declaration] {
        match tier {
            Tier::Standard => &self.standard,
            Tier::Optional => &self.optional,
            Tier::Disabled => &self.disabled,
        }
    }

    /// Total number of declarations across all tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.standard.len() + self.optional.len() + self.disabled.len()
    }

    /// Whether the file contained no classified declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_tokens_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_token(tier.token()), Some(tier));
        }
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(Tier::from_token("ENABLED"), None);
    }

    #[test]
    fn config_file_len_counts_every_tier() {
        let decl = |tier| Declaration {
            tier,
            text: "A=1".to_string(),
            line: 1,
        };
        let file = ConfigFile {
            standard: vec![decl(Tier::Standard)],
            optional: vec![decl(Tier::Optional), decl(Tier::Optional)],
            disabled: vec![],
        };
        assert_eq!(file.len(), 3);
        assert!(!file.is_empty());
        assert_eq!(file.tier(Tier::Optional).len(), 2);
        assert!(ConfigFile::default().is_empty());
    }
}
