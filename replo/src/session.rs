//! Session state and the execute pipeline.
//!
//! A [`Session`] reclassifies the whole buffer on every [`Session::execute`]
//! call: classify -> render -> backend. Nothing accumulates between calls, so
//! only the latest buffer snapshot matters.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::classifier::classify;
use crate::core::render::{import_declaration, render_program};
use crate::core::types::Execution;
use crate::io::backend::Backend;
use crate::io::config::ReploConfig;
use crate::io::history::{load_buffer, save_buffer};

/// Construction parameters for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub package_name: String,
    /// Baseline package paths, e.g. `fmt`.
    pub imports: Vec<String>,
    /// `None` disables persistence.
    pub history_path: Option<PathBuf>,
    pub skip_history: bool,
    pub debug: bool,
}

impl SessionOptions {
    pub fn from_config(cfg: &ReploConfig) -> Self {
        Self {
            package_name: cfg.package_name.clone(),
            imports: cfg.imports.clone(),
            history_path: None,
            skip_history: false,
            debug: false,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&ReploConfig::default())
    }
}

/// State of one interactive run.
#[derive(Debug, Clone)]
pub struct Session {
    imports: Vec<String>,
    statements: Vec<String>,
    baseline_imports: Vec<String>,
    package_name: String,
    pub history_path: Option<PathBuf>,
    pub skip_history: bool,
    pub debug: bool,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let baseline_imports: Vec<String> = options
            .imports
            .iter()
            .map(|path| import_declaration(path))
            .collect();
        Self {
            imports: baseline_imports.clone(),
            statements: Vec::new(),
            baseline_imports,
            package_name: options.package_name,
            history_path: options.history_path,
            skip_history: options.skip_history,
            debug: options.debug,
        }
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn baseline_imports(&self) -> &[String] {
        &self.baseline_imports
    }

    pub fn add_imports<I, S>(&mut self, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
    }

    pub fn add_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements.extend(lines.into_iter().map(Into::into));
    }

    pub fn clear(&mut self) {
        self.imports.clear();
        self.statements.clear();
    }

    pub fn reset(&mut self) {
        self.clear();
        self.imports = self.baseline_imports.clone();
    }

    /// Render the current imports and statements as program source.
    pub fn render(&self) -> Result<String> {
        render_program(&self.package_name, &self.imports, &self.statements)
    }

    /// Classify `buffer`, render it and run it on `backend`.
    ///
    /// `Err` covers setup failures (staging, rendering, spawning). A program
    /// that fails to build or run comes back as `Ok` with
    /// [`Execution::error`] set and its output intact. With `debug` enabled
    /// the staged source is copied to `debug_sink`.
    #[instrument(skip_all, fields(buffer_bytes = buffer.len(), debug = self.debug))]
    pub fn execute<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        buffer: &str,
        debug_sink: &mut dyn Write,
    ) -> Result<Execution> {
        self.clear();
        let classified = classify(buffer);
        self.add_imports(classified.imports);
        self.add_lines(classified.statements);
        debug!(
            imports = self.imports.len(),
            statements = self.statements.len(),
            "classified buffer"
        );

        let source = self.render()?;
        let sink = if self.debug { Some(debug_sink) } else { None };
        backend.execute(&source, sink)
    }

    /// Initial buffer: one import declaration per baseline import.
    pub fn seed_buffer(&self) -> String {
        self.baseline_imports
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }

    /// Buffer to show at startup: saved history, or the seed.
    pub fn load_history(&self) -> String {
        if !self.skip_history
            && let Some(path) = &self.history_path
            && let Some(saved) = load_buffer(path)
        {
            return saved;
        }
        self.seed_buffer()
    }

    /// Persist the entire buffer. Failures are logged, never returned.
    pub fn save_history(&self, buffer: &str) {
        if self.skip_history {
            return;
        }
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(err) = save_buffer(path, buffer) {
            warn!(path = %path.display(), err = ?err, "failed to save history");
        }
    }
}
