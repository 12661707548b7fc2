//! Replo configuration stored at `~/.replo/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Replo configuration (TOML).
///
/// Missing fields default to a stock Go toolchain setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReploConfig {
    /// Package clause of the generated program.
    pub package_name: String,

    /// Baseline package paths, imported in every fresh or reset session.
    pub imports: Vec<String>,

    /// Keep at most this many bytes of program output. Unset keeps all of it.
    pub output_limit_bytes: Option<usize>,

    /// Kill the program after this many seconds. Unset waits forever.
    pub run_timeout_secs: Option<u64>,

    /// Directory to create per-run staging directories in. Defaults to the
    /// system temp dir.
    pub staging_dir: Option<PathBuf>,

    pub toolchain: ToolchainConfig,

    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Build-and-run command; the staged file path is appended.
    pub command: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            command: vec!["go".to_string(), "run".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormatterConfig {
    /// In-place import normalizer; skipped when not found on `PATH`.
    pub command: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            command: vec!["goimports".to_string(), "-w".to_string()],
        }
    }
}

impl Default for ReploConfig {
    fn default() -> Self {
        Self {
            package_name: "main".to_string(),
            imports: vec!["fmt".to_string()],
            output_limit_bytes: None,
            run_timeout_secs: None,
            staging_dir: None,
            toolchain: ToolchainConfig::default(),
            formatter: FormatterConfig::default(),
        }
    }
}

impl ReploConfig {
    pub fn validate(&self) -> Result<()> {
        if self.package_name.trim().is_empty() {
            return Err(anyhow!("package_name must be non-empty"));
        }
        if self.output_limit_bytes == Some(0) {
            return Err(anyhow!("output_limit_bytes must be > 0 when set"));
        }
        if self.run_timeout_secs == Some(0) {
            return Err(anyhow!("run_timeout_secs must be > 0 when set"));
        }
        if is_blank_command(&self.toolchain.command) {
            return Err(anyhow!("toolchain.command must be a non-empty array"));
        }
        if is_blank_command(&self.formatter.command) {
            return Err(anyhow!("formatter.command must be a non-empty array"));
        }
        Ok(())
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

fn is_blank_command(command: &[String]) -> bool {
    command.first().is_none_or(|program| program.trim().is_empty())
}

/// Default config location: `<home>/.replo/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".replo").join("config.toml"))
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ReploConfig::default()`.
pub fn load_config(path: &Path) -> Result<ReploConfig> {
    if !path.exists() {
        let cfg = ReploConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ReploConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ReploConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
