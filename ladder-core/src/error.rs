//! Error types for the ladder-core library.
//!
//! All fallible operations in the crate return [`CoreResult`]. The variants
//! follow the stages of a run: input validation, external tool execution,
//! probing, transcoding and packaging.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the ladder-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required external tool '{0}' was not found")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{cmd} failed with {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{0} timed out after {1:?}")]
    CommandTimeout(String, Duration),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("Rendition job panicked: {0}")]
    JobPanicked(String),

    #[error("Source metadata unavailable: {0}")]
    MissingMetadata(String),

    #[error("No renditions were produced, nothing to package")]
    NothingToPackage,

    #[error("Fragmentation of {} failed: {message}", .input.display())]
    Fragmentation { input: PathBuf, message: String },

    #[error("Manifest generation failed: {0}")]
    ManifestGeneration(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for ladder-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}

pub fn command_timeout_error(cmd: impl Into<String>, timeout: Duration) -> CoreError {
    CoreError::CommandTimeout(cmd.into(), timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_message() {
        let err = CoreError::InputNotFound(PathBuf::from("missing.mp4"));
        assert_eq!(err.to_string(), "File not found: missing.mp4");
    }

    #[test]
    fn test_timeout_message_names_command() {
        let err = command_timeout_error("mp4dash", Duration::from_secs(5));
        assert!(err.to_string().contains("mp4dash timed out"));
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
