//! Generic subprocess execution for the non-ffmpeg tools (ffprobe and Bento4).
//!
//! `SystemToolRunner` drains stdout and stderr on reader threads so a chatty
//! tool never blocks on a full pipe, and enforces an optional wall-clock
//! timeout by polling the child and killing it once the deadline passes.

use crate::error::{
    CoreResult, command_failed_error, command_start_error, command_timeout_error,
    command_wait_error,
};

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Trait representing something that can run a tool to completion.
pub trait ToolRunner: Send + Sync {
    /// Runs the command and returns its output whatever the exit status.
    fn run(&self, cmd: &ToolCommand) -> CoreResult<ToolOutput>;

    /// Runs the command and turns a non-zero exit into `CoreError::CommandFailed`.
    fn run_checked(&self, cmd: &ToolCommand) -> CoreResult<ToolOutput> {
        let output = self.run(cmd)?;
        if !output.status.success() {
            return Err(command_failed_error(
                cmd.program.clone(),
                output.status,
                output.stderr.trim().to_string(),
            ));
        }
        Ok(output)
    }
}

/// Runs tools with `std::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct SystemToolRunner {
    timeout: Option<Duration>,
}

impl SystemToolRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ToolRunner for SystemToolRunner {
    fn run(&self, cmd: &ToolCommand) -> CoreResult<ToolOutput> {
        log::debug!("Running: {cmd}");

        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(cmd.program.clone(), e))?;

        let stdout_handle = child.stdout.take().map(|out| spawn_reader(out, false));
        let stderr_handle = child.stderr.take().map(|err| spawn_reader(err, true));

        let status = match self.timeout {
            Some(timeout) => {
                let start = Instant::now();
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break status,
                        Ok(None) if start.elapsed() >= timeout => {
                            log::error!("{} exceeded {:?}, killing it", cmd.program, timeout);
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(command_timeout_error(cmd.program.clone(), timeout));
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(e) => return Err(command_wait_error(cmd.program.clone(), e)),
                    }
                }
            }
            None => child
                .wait()
                .map_err(|e| command_wait_error(cmd.program.clone(), e))?,
        };

        let stdout = stdout_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let stderr = stderr_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        Ok(ToolOutput {
            status,
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: R,
    is_stderr: bool,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut lines = Vec::new();
        for line in BufReader::new(stream).lines().map_while(Result::ok) {
            if is_stderr {
                log::trace!("STDERR: {line}");
            } else {
                log::trace!("STDOUT: {line}");
            }
            lines.push(line);
        }
        lines.join("\n")
    })
}
