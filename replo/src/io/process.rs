//! Helpers for running child processes with combined output.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output, stdout and stderr interleaved.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub output: Vec<u8>,
    pub truncated: usize,
    pub timed_out: bool,
}

/// Run a command and capture stdout/stderr as one stream.
///
/// Both descriptors of the child share a single pipe, so bytes come back in
/// the order the child wrote them. The pipe is drained on a reader thread
/// while waiting. `output_limit_bytes` bounds what is kept (the rest is still
/// drained); `None` keeps everything. Without a `timeout` the call waits for
/// the child indefinitely. With one, the child runs in its own process group
/// and the whole group is killed when time runs out.
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs()), output_limit_bytes = ?output_limit_bytes))]
pub fn run_command_merged(
    mut cmd: Command,
    timeout: Option<Duration>,
    output_limit_bytes: Option<usize>,
) -> Result<CommandOutput> {
    let (reader, writer) = std::io::pipe().context("create output pipe")?;
    let writer_err = writer.try_clone().context("clone output pipe")?;
    cmd.stdin(Stdio::null()).stdout(writer).stderr(writer_err);
    if timeout.is_some() {
        isolate_process_group(&mut cmd);
    }

    debug!("spawning child process");
    let spawned = cmd.spawn();
    // The command holds the parent's copies of the write end; the reader only
    // sees EOF once they are closed.
    drop(cmd);
    let mut child = match spawned {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let reader_handle = thread::spawn(move || read_stream_limited(reader, output_limit_bytes));

    let mut timed_out = false;
    let status = match timeout {
        Some(timeout) => match child.wait_timeout(timeout).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "command timed out, killing"
                );
                timed_out = true;
                kill_process_group(&mut child).context("kill command")?;
                child.wait().context("wait command after kill")?
            }
        },
        None => child.wait().context("wait for command")?,
    };

    let (output, truncated) = join_output(reader_handle).context("join output")?;
    if truncated > 0 {
        warn!(truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        output,
        truncated,
        timed_out,
    })
}

#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

/// Kill the child and everything it spawned (e.g. the binary `go run` builds).
#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(child: &mut Child) -> Result<()> {
    let pgid = libc::pid_t::try_from(child.id()).context("child pid out of range")?;
    // SAFETY: plain syscall; the group id is the child's pid because it was
    // spawned with `process_group(0)` and has not been reaped yet.
    let ret = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        warn!(err = %err, "failed to kill process group, killing child only");
        child.kill()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) -> Result<()> {
    child.kill()?;
    Ok(())
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: Option<usize>) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.map_or(n, |limit| limit.saturating_sub(buf.len()));
        let keep = n.min(remaining);
        buf.extend_from_slice(&chunk[..keep]);
        truncated += n - keep;
    }

    Ok((buf, truncated))
}
