//! FFprobe integration for source inspection.
//!
//! Each query restricts ffprobe to the first video stream and asks for plain
//! `default=noprint_wrappers=1:nokey=1` output, so every requested entry comes
//! back as one bare value per line.

use crate::error::{CoreError, CoreResult};
use crate::external::tool_runner::{SystemToolRunner, ToolCommand, ToolRunner};
use std::path::Path;

/// Trait for the three facts the prober needs from ffprobe.
pub trait FfprobeExecutor: Send + Sync {
    /// Returns the `color_space`, `color_transfer` and `color_primaries` values.
    fn color_tags(&self, input_path: &Path) -> CoreResult<Vec<String>>;

    /// Returns the container duration in seconds.
    fn duration_secs(&self, input_path: &Path) -> CoreResult<f64>;

    /// Returns the raw `r_frame_rate` value, e.g. `30000/1001`.
    fn frame_rate_raw(&self, input_path: &Path) -> CoreResult<String>;
}

/// Production executor that shells out to ffprobe through a [`ToolRunner`].
#[derive(Debug, Clone)]
pub struct CommandFfprobeExecutor<R: ToolRunner = SystemToolRunner> {
    runner: R,
    program: String,
}

impl CommandFfprobeExecutor<SystemToolRunner> {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(SystemToolRunner::default(), program)
    }
}

impl<R: ToolRunner> CommandFfprobeExecutor<R> {
    pub fn with_runner(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn query(&self, input_path: &Path, entries: &str) -> CoreResult<String> {
        let cmd = ToolCommand::new(self.program.clone())
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries"])
            .arg(entries)
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(input_path.to_string_lossy());
        let output = self.runner.run_checked(&cmd)?;
        Ok(output.stdout)
    }
}

impl<R: ToolRunner> FfprobeExecutor for CommandFfprobeExecutor<R> {
    fn color_tags(&self, input_path: &Path) -> CoreResult<Vec<String>> {
        log::debug!("Running ffprobe for color tags on: {}", input_path.display());
        let stdout = self.query(
            input_path,
            "stream=color_space,color_transfer,color_primaries",
        )?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn duration_secs(&self, input_path: &Path) -> CoreResult<f64> {
        log::debug!("Running ffprobe for duration on: {}", input_path.display());
        let stdout = self.query(input_path, "format=duration")?;
        let value = stdout.trim();
        match value.parse::<f64>() {
            Ok(duration) if crate::media::is_usable(duration) => Ok(duration),
            _ => Err(CoreError::FfprobeParse(format!(
                "invalid duration '{}' for {}",
                value,
                input_path.display()
            ))),
        }
    }

    fn frame_rate_raw(&self, input_path: &Path) -> CoreResult<String> {
        log::debug!("Running ffprobe for frame rate on: {}", input_path.display());
        let stdout = self.query(input_path, "stream=r_frame_rate")?;
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "no frame rate reported for {}",
                    input_path.display()
                ))
            })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::external::tool_runner::ToolOutput;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::Mutex;

    /// Answers every query with fixed stdout and records the arguments.
    struct CannedRunner {
        stdout: String,
        calls: Mutex<Vec<ToolCommand>>,
    }

    impl CannedRunner {
        fn new(stdout: &str) -> Self {
            Self {
                stdout: stdout.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ToolRunner for CannedRunner {
        fn run(&self, cmd: &ToolCommand) -> CoreResult<ToolOutput> {
            self.calls.lock().unwrap().push(cmd.clone());
            Ok(ToolOutput {
                status: ExitStatus::from_raw(0),
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn test_color_tags_splits_lines() {
        let runner = CannedRunner::new("bt2020nc\nsmpte2084\nbt2020\n");
        let executor = CommandFfprobeExecutor::with_runner(runner, "ffprobe");
        let tags = executor.color_tags(Path::new("in.mp4")).unwrap();
        assert_eq!(tags, vec!["bt2020nc", "smpte2084", "bt2020"]);

        let calls = executor.runner.calls.lock().unwrap();
        let args = &calls[0].args;
        assert_eq!(calls[0].program, "ffprobe");
        assert!(args.contains(&"v:0".to_string()));
        assert!(args.contains(&"stream=color_space,color_transfer,color_primaries".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("in.mp4"));
    }

    #[test]
    fn test_duration_parses_float() {
        let executor =
            CommandFfprobeExecutor::with_runner(CannedRunner::new("10.010000\n"), "ffprobe");
        let duration = executor.duration_secs(Path::new("in.mp4")).unwrap();
        assert!((duration - 10.01).abs() < 1e-9);
    }

    #[test]
    fn test_duration_rejects_na() {
        let executor = CommandFfprobeExecutor::with_runner(CannedRunner::new("N/A\n"), "ffprobe");
        assert!(matches!(
            executor.duration_secs(Path::new("in.mp4")),
            Err(CoreError::FfprobeParse(_))
        ));
    }

    #[test]
    fn test_duration_rejects_zero_and_negative() {
        for raw in ["0.000000\n", "-3.5\n"] {
            let executor = CommandFfprobeExecutor::with_runner(CannedRunner::new(raw), "ffprobe");
            let result = executor.duration_secs(Path::new("in.mp4"));
            assert!(result.is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_frame_rate_raw_takes_first_line() {
        let executor =
            CommandFfprobeExecutor::with_runner(CannedRunner::new("30000/1001\n"), "ffprobe");
        assert_eq!(executor.frame_rate_raw(Path::new("in.mp4")).unwrap(), "30000/1001");

        let empty = CommandFfprobeExecutor::with_runner(CannedRunner::new(""), "ffprobe");
        assert!(empty.frame_rate_raw(Path::new("in.mp4")).is_err());
    }
}
