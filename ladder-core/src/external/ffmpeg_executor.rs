// ============================================================================
// ladder-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// Traits for spawning ffmpeg and consuming its event stream, with a concrete
// implementation on top of ffmpeg-sidecar. The transcode worker only talks to
// these traits, which is what lets the tests drive it with scripted events.

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

/// Event stream of a running ffmpeg process.
///
/// The stream ends when ffmpeg closes its output, so it can be drained on a
/// separate thread while the owner of the process keeps the ability to kill it.
pub type FfmpegEvents = Box<dyn Iterator<Item = FfmpegEvent> + Send>;

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Takes the event stream of the running command. Called once per process.
    fn events(&mut self) -> CoreResult<FfmpegEvents>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;

    /// Terminates the process.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait representing something that can spawn an FfmpegProcess.
///
/// Spawners are shared by every worker thread of the coordinator.
pub trait FfmpegSpawner: Send + Sync {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;

    /// Creates an empty command for the configured ffmpeg binary.
    fn command(&self) -> FfmpegCommand {
        FfmpegCommand::new()
    }
}

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn events(&mut self) -> CoreResult<FfmpegEvents> {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            command_failed_error("ffmpeg (event iterator)", ExitStatus::default(), e.to_string())
        })?;
        Ok(Box::new(iterator))
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.0.kill().map_err(|e| command_wait_error("ffmpeg (kill)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone)]
pub struct SidecarSpawner {
    program: String,
}

impl SidecarSpawner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SidecarSpawner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        log::debug!("Spawning ffmpeg: {cmd:?}");
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }

    fn command(&self) -> FfmpegCommand {
        FfmpegCommand::new_with_path(&self.program)
    }
}
