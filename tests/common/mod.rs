// Shared helpers for integration tests.
//
// Provides an isolated host root backed by a temporary directory, plus an
// executor and prompter that record what a run asked for instead of touching
// the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hostprep_cli::cli::Cli;
use hostprep_cli::commands::provision::{self, Services};
use hostprep_cli::exec::{ExecResult, Executor};
use hostprep_cli::logging::CapturedLog;
use hostprep_cli::platform::{Distro, Platform};
use hostprep_cli::prompt::Prompter;

/// Executor that records every command line.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingExecutor {
    /// Executor whose commands containing `needle` exit non-zero.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::default()
        }
    }

    /// Commands seen so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, line: String) -> anyhow::Result<ExecResult> {
        let fail = self.fail_on.as_ref().is_some_and(|f| line.contains(f));
        self.calls.lock().expect("calls lock").push(line.clone());
        if fail {
            anyhow::bail!("{line} failed (exit 1)");
        }
        Ok(ExecResult {
            stdout: "KEY\n".to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.record(format!("{program} {}", args.join(" ")).trim_end().to_string())
    }

    fn run_with_input(&self, program: &str, args: &[&str], _: &str) -> anyhow::Result<ExecResult> {
        self.run(program, args)
    }

    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self.record(format!("GET {url}")).map(|r| r.stdout)
    }

    fn which(&self, _: &str) -> bool {
        false
    }
}

/// Prompter that behaves like an operator pressing Enter at every question.
#[derive(Debug, Default)]
pub struct EnterPrompter {
    questions: Mutex<Vec<String>>,
}

impl EnterPrompter {
    /// Questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("questions lock").clone()
    }
}

impl Prompter for EnterPrompter {
    fn confirm(&self, question: &str, default: bool) -> io::Result<bool> {
        self.questions
            .lock()
            .expect("questions lock")
            .push(question.to_string());
        Ok(default)
    }
}

/// Outcome of one provision run.
pub struct RunResult {
    /// Process exit code.
    pub code: u8,
    /// Everything logged.
    pub log: Arc<CapturedLog>,
    /// Every command issued.
    pub exec: Arc<RecordingExecutor>,
}

/// An isolated host root backed by a [`tempfile::TempDir`].
pub struct TestHost {
    /// Temporary directory used as `--root`.
    pub root: tempfile::TempDir,
}

impl TestHost {
    /// Create an empty host root.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the host root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write `contents` to `relative` under the root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    /// Write the configuration file and return its path.
    pub fn config(&self, contents: &str) -> PathBuf {
        self.write("hostprep.conf", contents)
    }

    /// CLI options for a run against this host.
    pub fn cli(&self, config: PathBuf, yes: bool) -> Cli {
        Cli {
            config,
            log_file: None,
            verbose: true,
            yes,
            dry_run: false,
            root: self.root.path().to_path_buf(),
        }
    }

    /// Run with the given options, executor and prompter as root on Ubuntu.
    pub fn run_with(
        &self,
        cli: &Cli,
        exec: RecordingExecutor,
        prompter: Arc<dyn Prompter>,
    ) -> RunResult {
        let log = Arc::new(CapturedLog::new());
        let exec = Arc::new(exec);
        let services = Services {
            log: log.clone(),
            executor: exec.clone(),
            prompter,
        };
        let code = provision::execute(cli, ubuntu(), &services);
        RunResult { code, log, exec }
    }

    /// Run `config` non-interactively with a recording executor.
    pub fn run(&self, config: &str) -> RunResult {
        let cli = self.cli(self.config(config), true);
        self.run_with(
            &cli,
            RecordingExecutor::default(),
            Arc::new(EnterPrompter::default()),
        )
    }
}

/// An Ubuntu noble amd64 host with root privileges.
pub fn ubuntu() -> Platform {
    Platform::new(
        true,
        Distro {
            id: "ubuntu".to_string(),
            codename: Some("noble".to_string()),
        },
        "amd64",
    )
}
