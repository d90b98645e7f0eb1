// ============================================================================
// ladder-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffprobe, ffmpeg and Bento4
//
// Every external tool is reached through a trait so the pipeline can be
// exercised without the binaries installed:
// - FfprobeExecutor: the three source queries
// - FfmpegSpawner / FfmpegProcess: the transcodes, via ffmpeg-sidecar
// - ToolRunner: mp4fragment, mp4dash (and ffprobe underneath)

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

pub mod ffmpeg_executor;
pub mod ffprobe_executor;
pub mod tool_runner;

pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{
    FfmpegEvents, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner,
};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor};
pub use tool_runner::{SystemToolRunner, ToolCommand, ToolOutput, ToolRunner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command exists and can be started.
///
/// Only the ability to spawn is checked; the exit status of the version query
/// is ignored because some tools (mp4fragment) exit non-zero when asked for
/// usage information.
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Checks every tool the pipeline will invoke.
pub fn check_dependencies(config: &CoreConfig) -> CoreResult<()> {
    let tools = &config.tools;
    check_dependency(&tools.ffprobe, "-version")?;
    check_dependency(&tools.ffmpeg, "-version")?;
    check_dependency(&tools.mp4fragment, "--help")?;
    check_dependency(&tools.mp4dash, "--version")?;
    log::info!("External dependency check passed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolPaths;

    #[test]
    fn test_missing_dependency_is_reported() {
        let result = check_dependency("ladder-definitely-missing-tool", "-version");
        assert!(matches!(
            result,
            Err(CoreError::DependencyNotFound(name)) if name == "ladder-definitely-missing-tool"
        ));
    }

    #[test]
    fn test_check_dependencies_stops_at_first_missing_tool() {
        let mut config = CoreConfig::default();
        config.tools = ToolPaths {
            ffprobe: "ladder-missing-ffprobe".to_string(),
            ..ToolPaths::default()
        };
        let result = check_dependencies(&config);
        assert!(matches!(
            result,
            Err(CoreError::DependencyNotFound(name)) if name == "ladder-missing-ffprobe"
        ));
    }
}
