//! Core types shared by the session and execution backends.

use std::fmt;

/// How the build-and-run subprocess ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Non-zero exit or killed by a signal (`code` is `None` then).
    Failed { code: Option<i32> },
    TimedOut,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => f.write_str("success"),
            RunOutcome::Failed { code: Some(code) } => write!(f, "exit status {code}"),
            RunOutcome::Failed { code: None } => f.write_str("terminated by signal"),
            RunOutcome::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Result of one execution: merged stdout/stderr plus how the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub output: Vec<u8>,
    pub outcome: RunOutcome,
    /// Bytes dropped beyond the configured output limit.
    pub truncated: usize,
}

impl Execution {
    pub fn success(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            outcome: RunOutcome::Success,
            truncated: 0,
        }
    }

    pub fn failed(output: impl Into<Vec<u8>>, code: Option<i32>) -> Self {
        Self {
            output: output.into(),
            outcome: RunOutcome::Failed { code },
            truncated: 0,
        }
    }

    /// Error text reported by the toolchain, if the run did not succeed.
    pub fn error(&self) -> Option<String> {
        match self.outcome {
            RunOutcome::Success => None,
            outcome => Some(outcome.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }

    pub fn truncated_notice(&self) -> String {
        if self.truncated > 0 {
            format!("\n[output truncated {} bytes]\n", self.truncated)
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_error() {
        assert_eq!(Execution::success("hi").error(), None);
    }

    #[test]
    fn failure_reports_exit_status() {
        let execution = Execution::failed("boom", Some(2));
        assert_eq!(execution.error().as_deref(), Some("exit status 2"));
        assert_eq!(execution.output, b"boom");
    }

    #[test]
    fn truncated_notice_only_when_truncated() {
        let mut execution = Execution::success("");
        assert!(execution.truncated_notice().is_empty());
        execution.truncated = 10;
        assert!(execution.truncated_notice().contains("10 bytes"));
    }
}
