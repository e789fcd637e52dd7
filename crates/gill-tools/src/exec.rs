//! Process invocation for external tools.
//!
//! Every adapter goes through [`run`], which handles feeding standard input,
//! draining both output pipes, and enforcing an optional timeout.

use crate::ToolError;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a timed-out invocation polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A command to run, with optional standard input.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub stdin: Option<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            cwd: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn display_program(&self) -> String {
        self.program.display().to_string()
    }
}

/// Exit status and raw output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_text(&self) -> Result<&str, ToolError> {
        std::str::from_utf8(&self.stdout).map_err(|_| ToolError::NonUtf8("stdout"))
    }

    pub fn stderr_text(&self) -> Result<&str, ToolError> {
        std::str::from_utf8(&self.stderr).map_err(|_| ToolError::NonUtf8("stderr"))
    }

    /// Stderr for error messages, never failing on bad encoding.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Run an invocation to completion.
pub fn run(invocation: &Invocation) -> Result<ProcessOutput, ToolError> {
    tracing::debug!(
        program = %invocation.program.display(),
        args = ?invocation.args,
        stdin = invocation.stdin.as_ref().map(|s| s.len()),
        "spawning tool"
    );

    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &invocation.cwd {
        command.current_dir(cwd);
    }

    let mut child = command.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ToolError::NotFound(invocation.display_program()),
        _ => ToolError::Io(e),
    })?;

    let writer = match (child.stdin.take(), invocation.stdin.clone()) {
        (Some(mut pipe), Some(text)) => Some(thread::spawn(move || {
            // A tool that exits without reading its input closes the pipe early.
            if let Err(e) = pipe.write_all(text.as_bytes()) {
                tracing::debug!("stdin write ended early: {e}");
            }
        })),
        _ => None,
    };
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let code = match invocation.timeout {
        Some(limit) => wait_with_deadline(&mut child, limit, invocation)?,
        None => child.wait()?.code(),
    };

    if let Some(writer) = writer {
        let _ = writer.join();
    }
    let output = ProcessOutput {
        code,
        stdout: collect(stdout),
        stderr: collect(stderr),
    };

    tracing::debug!(
        program = %invocation.program.display(),
        code = ?output.code,
        stdout = output.stdout.len(),
        stderr = output.stderr.len(),
        "tool finished"
    );
    Ok(output)
}

fn wait_with_deadline(
    child: &mut Child,
    limit: Duration,
    invocation: &Invocation,
) -> Result<Option<i32>, ToolError> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.code());
        }
        if Instant::now() >= deadline {
            tracing::warn!(
                program = %invocation.program.display(),
                "tool timed out after {:?}, killing",
                limit
            );
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::Timeout {
                program: invocation.display_program(),
                after: limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Resolve a configured executable to a full path via `PATH`.
///
/// Paths containing a separator are checked directly.
pub fn resolve_executable(program: &Path) -> Option<PathBuf> {
    which::which(program).ok()
}
