//! File-system helpers used by actions: writes, directive edits, backups.
use anyhow::{Context as _, Result};
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use crate::error::ProvisionError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Write `contents` to `path` and set its Unix permission bits.
///
/// # Errors
///
/// Returns an error if the parent directory, the file, or its mode cannot be
/// written.
pub fn write_with_mode(path: &Path, contents: &str, mode: u32) -> Result<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("chmod {mode:o} {}", path.display()))?;
    Ok(())
}

/// Whether `line` sets `key`, returned as `(matches, commented)`.
fn directive_matches(line: &str, key: &str) -> (bool, bool) {
    let trimmed = line.trim_start();
    let (commented, body) = trimmed
        .strip_prefix('#')
        .map_or((false, trimmed), |rest| (true, rest.trim_start()));
    let word = body.split_whitespace().next().unwrap_or("");
    (word.eq_ignore_ascii_case(key), commented)
}

/// Rewrite a `Key value` style config so `key` is set to `value`.
///
/// The first line that sets `key` (commented out or not) is replaced; later
/// active lines for the same key are dropped so the first-match-wins rule of
/// sshd cannot resurrect an old value. When absent, the directive is inserted
/// before the first `Match` block (or appended) so it stays global.
///
/// # Examples
///
/// ```
/// use hostprep_cli::resources::fs::set_directive;
///
/// let out = set_directive("#Port 22\nUsePAM yes\n", "Port", "2222");
/// assert_eq!(out, "Port 2222\nUsePAM yes\n");
/// ```
#[must_use]
pub fn set_directive(content: &str, key: &str, value: &str) -> String {
    let replacement = format!("{key} {value}");
    let mut out = Vec::new();
    let mut placed = false;

    for line in content.lines() {
        let (matches, commented) = directive_matches(line, key);
        if !matches {
            out.push(line.to_string());
        } else if !placed {
            out.push(replacement.clone());
            placed = true;
        } else if commented {
            out.push(line.to_string());
        }
    }
    if !placed {
        let match_block = out
            .iter()
            .position(|l| directive_matches(l, "Match") == (true, false));
        match match_block {
            Some(idx) => out.insert(idx, replacement),
            None => out.push(replacement),
        }
    }

    let mut joined = out.join("\n");
    joined.push('\n');
    joined
}

/// Apply [`set_directive`] to the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn set_directive_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let updated = set_directive(&content, key, value);
    if updated != content {
        std::fs::write(path, updated).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// Result of a backup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A copy was written to this path.
    Created(PathBuf),
    /// The target does not exist; nothing was copied.
    Absent,
}

/// Sibling path `<target>.bak.<timestamp>`.
#[must_use]
pub fn backup_path(target: &Path, timestamp: &str) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(format!(".bak.{timestamp}"));
    PathBuf::from(name)
}

/// Copy `target` to a timestamp-suffixed sibling if it exists.
///
/// A counter is appended when a backup with the same timestamp already
/// exists, so earlier copies are never overwritten.
///
/// # Errors
///
/// Returns [`ProvisionError::BackupFailed`] if the copy fails. Callers treat
/// this as recoverable.
pub fn backup(target: &Path) -> Result<BackupOutcome, ProvisionError> {
    if !target.is_file() {
        return Ok(BackupOutcome::Absent);
    }
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
    let mut dest = backup_path(target, &stamp);
    let mut counter = 1u32;
    while dest.exists() {
        dest = backup_path(target, &format!("{stamp}.{counter}"));
        counter += 1;
    }
    std::fs::copy(target, &dest).map_err(|e| ProvisionError::BackupFailed {
        path: target.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(BackupOutcome::Created(dest))
}
