//! Interactive Go scratchpad.
//!
//! Type statements and imports, then `:run` to build and run them as a
//! program. The buffer is saved per working directory on quit and restored on
//! the next start.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use replo::exit_codes;
use replo::frontend::LineFrontend;
use replo::io::backend::ProcessBackend;
use replo::io::config::{ReploConfig, default_config_path, load_config};
use replo::io::history::default_history_path;
use replo::session::{Session, SessionOptions};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "replo", version, about = "Interactive Go scratchpad")]
struct Cli {
    /// Show the staged program source on stderr before each run.
    #[arg(short, long)]
    debug: bool,

    /// Skip loading and saving the history file.
    #[arg(short, long)]
    skip_history: bool,

    /// File to read/write the session buffer to.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Config file (defaults to `~/.replo/config.toml`).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    replo::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_cli_config(cli.config.as_ref())?;

    let history_path = cli.file.or_else(default_history_path);
    debug!(history = ?history_path, "resolved history path");

    let mut session = Session::new(SessionOptions {
        history_path,
        skip_history: cli.skip_history,
        debug: cli.debug,
        ..SessionOptions::from_config(&cfg)
    });
    let backend = ProcessBackend::from_config(&cfg);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut frontend = LineFrontend::new(stdin.lock(), io::stdout(), io::stderr());
    if !interactive {
        frontend = frontend.without_prompt();
    }

    replo::repl::run(&mut session, &backend, &mut frontend).context("run session")
}

fn load_cli_config(path: Option<&PathBuf>) -> Result<ReploConfig> {
    match path.cloned().or_else(default_config_path) {
        Some(path) => load_config(&path).context("load config"),
        None => Ok(ReploConfig::default()),
    }
}
