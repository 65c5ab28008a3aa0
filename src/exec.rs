//! Process execution behind an injectable [`Executor`] trait.
use anyhow::{Context as _, Result, bail};
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs and fetches remote resources.
///
/// Actions never spawn processes or open connections directly; they go
/// through this trait so tests can substitute a recording or failing
/// implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run a program and fail if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    fn run<'a>(&self, program: &str, args: &[&'a str]) -> Result<ExecResult>;

    /// Run a program with `input` written to its stdin; fail on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    fn run_with_input<'a>(&self, program: &str, args: &[&'a str], input: &str) -> Result<ExecResult>;

    /// Fetch `url` over HTTPS and return the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure or a non-success status.
    fn fetch(&self, url: &str) -> Result<String>;

    /// Whether a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

/// Turn a finished process into a result, bailing on non-zero exit.
fn checked(output: Output, label: &str) -> Result<ExecResult> {
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        checked(output, program)
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {program}"))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .with_context(|| format!("writing stdin of {program}"))?;
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for {program}"))?;
        checked(output, program)
    }

    fn fetch(&self, url: &str) -> Result<String> {
        ureq::get(url)
            .call()
            .with_context(|| format!("GET {url}"))?
            .body_mut()
            .read_to_string()
            .with_context(|| format!("reading response body from {url}"))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
