//! Line-oriented loader for the tiered configuration format.
//!
//! ```text
//! # comment lines and unclassified lines are ignored
//! STANDARD ADMIN_USER=deploy
//! STANDARD apt-get update
//! OPTIONAL ENABLE_UFW=true
//! DISABLED INSTALL_DOCKER=true
//! ```
use std::path::Path;

use super::{ConfigFile, Declaration, Tier};
use crate::error::ProvisionError;

/// Read and classify the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ProvisionError::ConfigNotFound`] if the file cannot be read.
pub fn load(path: &Path) -> Result<ConfigFile, ProvisionError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| ProvisionError::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_str(&content))
}

/// Classify configuration text into the three tier sequences.
///
/// Shape of the remainder (`KEY=VALUE` or directive) is not checked here.
///
/// # Examples
///
/// ```
/// use hostprep_cli::config::loader::parse_str;
///
/// let file = parse_str("STANDARD A=1\nOPTIONAL B=true\nDISABLED C=true\n");
/// assert_eq!(file.standard[0].text, "A=1");
/// assert_eq!(file.optional[0].text, "B=true");
/// assert_eq!(file.disabled[0].text, "C=true");
/// ```
#[must_use]
pub fn parse_str(content: &str) -> ConfigFile {
    let mut file = ConfigFile::default();

    for (idx, line) in content.lines().enumerate() {
        let Some((tier, rest)) = classify(line) else {
            continue;
        };
        if rest.is_empty() || rest.starts_with('#') {
            continue;
        }
        let decl = Declaration {
            tier,
            text: rest.to_string(),
            line: idx + 1,
        };
        match tier {
            Tier::Standard => file.standard.push(decl),
            Tier::Optional => file.optional.push(decl),
            Tier::Disabled => file.disabled.push(decl),
        }
    }

    file
}

/// Split a line into its tier and trimmed remainder.
///
/// The tier token must be followed by at least one whitespace character.
fn classify(line: &str) -> Option<(Tier, &str)> {
    let line = line.trim_start();
    let split = line.find(char::is_whitespace)?;
    let (token, rest) = line.split_at(split);
    let tier = Tier::from_token(token)?;
    Some((tier, rest.trim()))
}
