// ladder-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled (unix only).
#![cfg(all(feature = "test-mocks", unix))]

use super::*;
use crate::error::{CoreError, CoreResult, command_start_error};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("Mock failed to create parent dir {}: {}", parent.display(), e);
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(_) => log::info!("Mock created dummy output file: {}", path.display()),
        Err(e) => log::error!("Mock failed to create dummy output {}: {}", path.display(), e),
    }
}

// ---------------------------------------------------------------------------
// ffmpeg
// ---------------------------------------------------------------------------

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit from the event stream.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// How long the stream stays open and silent after the last event.
    pub stall: Option<Duration>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
    killed: Arc<Mutex<bool>>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn events(&mut self) -> CoreResult<FfmpegEvents> {
        let stall = self.stall;
        let silence = std::iter::once_with(move || {
            if let Some(stall) = stall {
                std::thread::sleep(stall);
            }
            None::<FfmpegEvent>
        })
        .flatten();
        let events = std::mem::take(&mut self.events_to_emit);
        Ok(Box::new(events.into_iter().chain(silence)))
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        *self.killed.lock().unwrap() = true;
        Ok(())
    }
}

/// Scripted outcome for ffmpeg calls whose arguments contain `arg_pattern`.
struct MockFfmpegExpectation {
    arg_pattern: String,
    events: Vec<FfmpegEvent>,
    stall: Option<Duration>,
    outcome: MockOutcome,
}

#[derive(Clone, Copy)]
enum MockOutcome {
    Exit(i32),
    SpawnError,
}

/// Mock implementation of FfmpegSpawner.
///
/// Calls that match no expectation succeed with no events and, when
/// `create_dummy_outputs` is set, touch the output path (the last argument).
/// Matching expectations are kept, so one pattern covers repeated calls.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
    killed: Arc<Mutex<bool>>,
    create_dummy_outputs: bool,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// Successful calls create an empty file at their output path.
    pub fn with_dummy_outputs() -> Self {
        Self {
            create_dummy_outputs: true,
            ..Default::default()
        }
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        self.push(arg_pattern, events, MockOutcome::Exit(0));
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        self.push(arg_pattern, events, MockOutcome::Exit(exit_code));
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str) {
        self.push(arg_pattern, Vec::new(), MockOutcome::SpawnError);
    }

    /// The process prints nothing for `stall` before exiting successfully.
    pub fn add_stall_expectation(&self, arg_pattern: &str, stall: Duration) {
        self.expectations.lock().unwrap().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            events: Vec::new(),
            stall: Some(stall),
            outcome: MockOutcome::Exit(0),
        });
    }

    fn push(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, outcome: MockOutcome) {
        self.expectations.lock().unwrap().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            events,
            stall: None,
            outcome,
        });
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }

    /// Whether any spawned process was killed.
    pub fn was_killed(&self) -> bool {
        *self.killed.lock().unwrap()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.lock().unwrap().push(args.clone());

        let (events, stall, outcome) = {
            let expectations = self.expectations.lock().unwrap();
            expectations
                .iter()
                .find(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|exp| {
                    log::info!("MockFfmpegSpawner: matched expectation '{}'", exp.arg_pattern);
                    (exp.events.clone(), exp.stall, exp.outcome)
                })
                .unwrap_or((Vec::new(), None, MockOutcome::Exit(0)))
        };

        match outcome {
            MockOutcome::SpawnError => Err(command_start_error(
                "ffmpeg (mock)",
                io::Error::new(io::ErrorKind::NotFound, "simulated spawn failure"),
            )),
            MockOutcome::Exit(code) => {
                if self.create_dummy_outputs {
                    // A real ffmpeg leaves a partial file behind on failure too.
                    if let Some(output) = args.last() {
                        touch(Path::new(output));
                    }
                }
                Ok(MockFfmpegProcess {
                    events_to_emit: events,
                    stall,
                    exit_status: exit_status(code),
                    killed: Arc::clone(&self.killed),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ffprobe
// ---------------------------------------------------------------------------

/// Mock implementation of FfprobeExecutor. `None` simulates a probe failure.
#[derive(Clone, Debug)]
pub struct MockFfprobeExecutor {
    color_tags: Option<Vec<String>>,
    duration_secs: Option<f64>,
    frame_rate: Option<String>,
}

impl MockFfprobeExecutor {
    /// A source with no HDR markers.
    pub fn sdr(duration_secs: f64, frame_rate: &str) -> Self {
        Self {
            color_tags: Some(vec!["bt709".into(), "bt709".into(), "bt709".into()]),
            duration_secs: Some(duration_secs),
            frame_rate: Some(frame_rate.to_string()),
        }
    }

    /// A PQ / BT.2020 source.
    pub fn hdr(duration_secs: f64, frame_rate: &str) -> Self {
        Self {
            color_tags: Some(vec!["bt2020nc".into(), "smpte2084".into(), "bt2020".into()]),
            duration_secs: Some(duration_secs),
            frame_rate: Some(frame_rate.to_string()),
        }
    }

    /// Every query fails.
    pub fn failing() -> Self {
        Self {
            color_tags: None,
            duration_secs: None,
            frame_rate: None,
        }
    }

    pub fn with_color_tags(mut self, tags: Option<Vec<String>>) -> Self {
        self.color_tags = tags;
        self
    }

    pub fn with_duration(mut self, duration_secs: Option<f64>) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: Option<&str>) -> Self {
        self.frame_rate = frame_rate.map(str::to_string);
        self
    }

    fn failure(what: &str, input_path: &Path) -> CoreError {
        CoreError::FfprobeParse(format!(
            "mock ffprobe {} failure for {}",
            what,
            input_path.display()
        ))
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn color_tags(&self, input_path: &Path) -> CoreResult<Vec<String>> {
        self.color_tags
            .clone()
            .ok_or_else(|| Self::failure("color tags", input_path))
    }

    fn duration_secs(&self, input_path: &Path) -> CoreResult<f64> {
        self.duration_secs
            .ok_or_else(|| Self::failure("duration", input_path))
    }

    fn frame_rate_raw(&self, input_path: &Path) -> CoreResult<String> {
        self.frame_rate
            .clone()
            .ok_or_else(|| Self::failure("frame rate", input_path))
    }
}

// ---------------------------------------------------------------------------
// Generic tools (Bento4)
// ---------------------------------------------------------------------------

/// Mock implementation of ToolRunner.
///
/// Every call succeeds unless a failure pattern matches the program name or
/// one of its arguments. With `with_dummy_outputs`, a successful call whose
/// last argument ends in `.mp4` touches that file, and a `-o <dir>` argument
/// creates the directory.
#[derive(Clone, Default)]
pub struct MockToolRunner {
    failures: Arc<Mutex<Vec<(String, i32)>>>,
    calls: Arc<Mutex<Vec<ToolCommand>>>,
    create_dummy_outputs: bool,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_dummy_outputs() -> Self {
        Self {
            create_dummy_outputs: true,
            ..Default::default()
        }
    }

    /// Calls matching `pattern` exit with `exit_code`.
    pub fn fail_when(&self, pattern: &str, exit_code: i32) {
        self.failures
            .lock()
            .unwrap()
            .push((pattern.to_string(), exit_code));
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose program name contains `program`.
    pub fn calls_to(&self, program: &str) -> Vec<ToolCommand> {
        self.calls()
            .into_iter()
            .filter(|c| c.program.contains(program))
            .collect()
    }
}

impl ToolRunner for MockToolRunner {
    fn run(&self, cmd: &ToolCommand) -> CoreResult<ToolOutput> {
        self.calls.lock().unwrap().push(cmd.clone());

        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| {
                cmd.program.contains(pattern.as_str())
                    || cmd.args.iter().any(|a| a.contains(pattern.as_str()))
            })
            .map(|(_, code)| *code);

        if let Some(code) = failure {
            log::warn!("MockToolRunner simulating exit {code} for: {cmd}");
            return Ok(ToolOutput {
                status: exit_status(code),
                stdout: String::new(),
                stderr: format!("simulated failure of {}", cmd.program),
            });
        }

        if self.create_dummy_outputs {
            if let Some(pos) = cmd.args.iter().position(|a| a == "-o") {
                if let Some(dir) = cmd.args.get(pos + 1) {
                    if let Err(e) = std::fs::create_dir_all(PathBuf::from(dir)) {
                        log::error!("MockToolRunner failed to create {dir}: {e}");
                    }
                }
            } else if let Some(last) = cmd.args.last().filter(|a| a.ends_with(".mp4")) {
                touch(Path::new(last));
            }
        }

        Ok(ToolOutput {
            status: exit_status(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
