//! Execution backends: stage a rendered program and build-and-run it.
//!
//! The [`Backend`] trait decouples the session from the real toolchain. Tests
//! use scripted backends or substitute harmless programs (`cat`, `echo`) for
//! the toolchain command.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use crate::core::types::{Execution, RunOutcome};
use crate::io::config::ReploConfig;
use crate::io::process::run_command_merged;

/// File name of the staged program inside each staging directory.
pub const STAGED_FILE_NAME: &str = "replo.go";
const STAGING_PREFIX: &str = "replo";

/// Abstraction over build-and-run backends.
pub trait Backend {
    /// Run `source` as a program and return its merged output.
    ///
    /// `Err` means the program could not be staged or started. A program that
    /// ran and failed is `Ok` with a non-success outcome. When `debug` is set
    /// the staged source is copied to it before running.
    fn execute(&self, source: &str, debug: Option<&mut dyn Write>) -> Result<Execution>;
}

/// Backend that stages source in a temp dir and spawns the toolchain.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    /// Build-and-run command; the staged file path is appended.
    pub toolchain: Vec<String>,
    /// Optional in-place normalizer; the staged file path is appended.
    pub formatter: Vec<String>,
    /// `None` keeps all output.
    pub output_limit_bytes: Option<usize>,
    pub timeout: Option<Duration>,
    pub staging_dir: Option<PathBuf>,
}

impl ProcessBackend {
    pub fn from_config(cfg: &ReploConfig) -> Self {
        Self {
            toolchain: cfg.toolchain.command.clone(),
            formatter: cfg.formatter.command.clone(),
            output_limit_bytes: cfg.output_limit_bytes,
            timeout: cfg.run_timeout(),
            staging_dir: cfg.staging_dir.clone(),
        }
    }

    fn stage(&self, source: &str) -> Result<(TempDir, PathBuf)> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let dir = match &self.staging_dir {
            Some(root) => builder
                .tempdir_in(root)
                .with_context(|| format!("create staging dir in {}", root.display()))?,
            None => builder.tempdir().context("create staging dir")?,
        };
        let path = dir.path().join(STAGED_FILE_NAME);
        fs::write(&path, source).with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), bytes = source.len(), "staged program");
        Ok((dir, path))
    }

    /// Run the formatter on the staged file if it is installed.
    ///
    /// Absence and failure are both non-fatal.
    fn normalize(&self, path: &Path) {
        let Some((program, args)) = self.formatter.split_first() else {
            return;
        };
        let resolved = match which::which(program) {
            Ok(resolved) => resolved,
            Err(_) => {
                debug!(formatter = %program, "formatter not found, skipping");
                return;
            }
        };
        let status = Command::new(resolved)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => debug!(formatter = %program, "normalized imports"),
            Ok(status) => {
                warn!(formatter = %program, exit_code = ?status.code(), "formatter failed");
            }
            Err(err) => warn!(formatter = %program, err = %err, "failed to run formatter"),
        }
    }

    fn run(&self, path: &Path) -> Result<Execution> {
        let (program, args) = self
            .toolchain
            .split_first()
            .ok_or_else(|| anyhow!("toolchain command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args).arg(path);

        let output = run_command_merged(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run {}", self.toolchain.join(" ")))?;

        let outcome = if output.timed_out {
            RunOutcome::TimedOut
        } else if output.status.success() {
            RunOutcome::Success
        } else {
            RunOutcome::Failed {
                code: output.status.code(),
            }
        };
        Ok(Execution {
            output: output.output,
            outcome,
            truncated: output.truncated,
        })
    }
}

impl Backend for ProcessBackend {
    #[instrument(skip_all, fields(toolchain = %self.toolchain.join(" ")))]
    fn execute(&self, source: &str, debug: Option<&mut dyn Write>) -> Result<Execution> {
        // Dropping `staging` removes the directory on every early return.
        let (staging, path) = self.stage(source)?;

        self.normalize(&path);
        if let Some(sink) = debug {
            copy_staged(&path, sink);
        }

        let execution = self.run(&path)?;
        info!(outcome = %execution.outcome, bytes = execution.output.len(), "program finished");

        if let Err(err) = staging.close() {
            warn!(err = %err, "failed to remove staging dir");
        }
        Ok(execution)
    }
}

fn copy_staged(path: &Path, sink: &mut dyn Write) {
    let copied = fs::read(path).and_then(|contents| {
        sink.write_all(&contents)?;
        sink.flush()
    });
    if let Err(err) = copied {
        warn!(path = %path.display(), err = %err, "failed to copy staged source to debug sink");
    }
}
