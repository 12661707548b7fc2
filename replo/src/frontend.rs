//! Interactive surface abstraction and a line-oriented terminal frontend.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

/// What the user asked the driver loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Execute,
    Clear,
    Reset,
    Quit,
}

/// Capabilities the driver loop needs from an interactive surface.
pub trait Frontend {
    /// Replace the editable buffer, e.g. with loaded history.
    fn seed(&mut self, text: &str) -> Result<()>;
    /// Block until the user fires a trigger.
    fn next_trigger(&mut self) -> Result<Trigger>;
    /// Full current buffer text.
    fn buffer(&self) -> String;
    /// Drop output from the previous execution, if the surface keeps any.
    fn clear_output(&mut self) -> Result<()>;
    fn show_output(&mut self, bytes: &[u8]) -> Result<()>;
    /// Sink for diagnostic text such as the staged source.
    fn diagnostics(&mut self) -> &mut dyn Write;
}

const PROMPT: &str = ">>> ";

/// Terminal frontend reading one line at a time.
///
/// Plain lines are appended to the buffer. Lines starting with `:` are
/// commands: `:run`, `:show`, `:clear`, `:reset`, `:quit` (or `:q`). End of
/// input quits.
pub struct LineFrontend<R, W, D> {
    input: R,
    output: W,
    diagnostics: D,
    buffer: String,
    prompt: bool,
}

impl<R: BufRead, W: Write, D: Write> LineFrontend<R, W, D> {
    pub fn new(input: R, output: W, diagnostics: D) -> Self {
        Self {
            input,
            output,
            diagnostics,
            buffer: String::new(),
            prompt: true,
        }
    }

    /// Disable the `>>>` prompt (for piped input).
    pub fn without_prompt(mut self) -> Self {
        self.prompt = false;
        self
    }

    pub fn into_parts(self) -> (R, W, D) {
        (self.input, self.output, self.diagnostics)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if self.prompt {
            self.output.write_all(PROMPT.as_bytes())?;
            self.output.flush()?;
        }
        let mut raw = Vec::new();
        let n = self.input.read_until(b'\n', &mut raw).context("read input")?;
        if n == 0 {
            return Ok(None);
        }
        // Invalid UTF-8 becomes U+FFFD rather than ending the session.
        let mut line = String::from_utf8_lossy(&raw).into_owned();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn show_buffer(&mut self) -> Result<()> {
        self.output.write_all(self.buffer.as_bytes())?;
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.output.write_all(b"\n")?;
        }
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write, D: Write> Frontend for LineFrontend<R, W, D> {
    fn seed(&mut self, text: &str) -> Result<()> {
        self.buffer = text.to_string();
        self.show_buffer()
    }

    fn next_trigger(&mut self) -> Result<Trigger> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(Trigger::Quit);
            };
            match line.trim() {
                ":run" | ":r" => return Ok(Trigger::Execute),
                ":quit" | ":q" => return Ok(Trigger::Quit),
                ":clear" => {
                    self.buffer.clear();
                    return Ok(Trigger::Clear);
                }
                ":reset" => return Ok(Trigger::Reset),
                ":show" => self.show_buffer()?,
                command if command.starts_with(':') => {
                    writeln!(self.output, "unknown command {command}")?;
                }
                _ => {
                    self.buffer.push_str(&line);
                    self.buffer.push('\n');
                }
            }
        }
    }

    fn buffer(&self) -> String {
        self.buffer.clone()
    }

    fn clear_output(&mut self) -> Result<()> {
        Ok(())
    }

    fn show_output(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes).context("write output")?;
        self.output.flush().context("flush output")
    }

    fn diagnostics(&mut self) -> &mut dyn Write {
        &mut self.diagnostics
    }
}
