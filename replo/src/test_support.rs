//! Test-only backends and frontends with scripted behavior.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;

use anyhow::{Result, anyhow};

use crate::core::types::Execution;
use crate::frontend::{Frontend, Trigger};
use crate::io::backend::Backend;
use crate::io::config::ReploConfig;

/// Backend that replays queued results, or echoes the rendered source back.
pub struct ScriptedBackend {
    queue: RefCell<VecDeque<Result<Execution>>>,
    echo: bool,
    sources: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    /// Return each queued result once, in order.
    pub fn new(results: Vec<Result<Execution>>) -> Self {
        Self {
            queue: RefCell::new(results.into()),
            echo: false,
            sources: RefCell::new(Vec::new()),
        }
    }

    /// Succeed with the rendered source as output.
    pub fn echo_source() -> Self {
        Self {
            echo: true,
            ..Self::new(Vec::new())
        }
    }

    /// Every source passed to `execute`, in call order.
    pub fn sources(&self) -> Vec<String> {
        self.sources.borrow().clone()
    }
}

impl Backend for ScriptedBackend {
    fn execute(&self, source: &str, debug: Option<&mut dyn Write>) -> Result<Execution> {
        self.sources.borrow_mut().push(source.to_string());
        if let Some(sink) = debug {
            sink.write_all(source.as_bytes())?;
        }
        if self.echo {
            return Ok(Execution::success(source));
        }
        self.queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted execution left")))
    }
}

/// Frontend that appends scripted text to its buffer, then fires a trigger.
pub struct ScriptedFrontend {
    steps: VecDeque<(Option<&'static str>, Trigger)>,
    buffer: String,
    output: Vec<u8>,
    diagnostics: Vec<u8>,
}

impl ScriptedFrontend {
    pub fn new(steps: Vec<(Option<&'static str>, Trigger)>) -> Self {
        Self {
            steps: steps.into(),
            buffer: String::new(),
            output: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn diagnostics_text(&self) -> String {
        String::from_utf8_lossy(&self.diagnostics).into_owned()
    }
}

impl Frontend for ScriptedFrontend {
    fn seed(&mut self, text: &str) -> Result<()> {
        self.buffer = text.to_string();
        Ok(())
    }

    fn next_trigger(&mut self) -> Result<Trigger> {
        let Some((text, trigger)) = self.steps.pop_front() else {
            return Ok(Trigger::Quit);
        };
        if let Some(text) = text {
            self.buffer.push_str(text);
        }
        if trigger == Trigger::Clear {
            self.buffer.clear();
        }
        Ok(trigger)
    }

    fn buffer(&self) -> String {
        self.buffer.clone()
    }

    fn clear_output(&mut self) -> Result<()> {
        Ok(())
    }

    fn show_output(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn diagnostics(&mut self) -> &mut dyn Write {
        &mut self.diagnostics
    }
}

/// Config whose "toolchain" is `cat`, so a run prints the staged program.
///
/// The formatter points at a program that does not exist, which exercises the
/// skip path.
pub fn cat_config(staging_dir: &std::path::Path) -> ReploConfig {
    let mut cfg = ReploConfig {
        staging_dir: Some(staging_dir.to_path_buf()),
        ..ReploConfig::default()
    };
    cfg.toolchain.command = vec!["cat".to_string()];
    cfg.formatter.command = vec!["replo-missing-formatter".to_string()];
    cfg
}
