//! Configuration structures and constants for the ladder-core library.
//!
//! This module provides the configuration for a pipeline run: where artifacts
//! are written, how the renditions are encoded, how they are packaged, and
//! which external tools are invoked.

mod builder;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Directory (relative to the working directory) that receives every artifact.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Video encoder used for every rendition.
pub const DEFAULT_VIDEO_CODEC: &str = "libx265";

/// Constant Rate Factor for the video encoder. Range: 0-51.
pub const DEFAULT_CRF: u8 = 28;

/// Encoder speed/quality tradeoff.
pub const DEFAULT_PRESET: &str = "medium";

/// Audio encoder used for every rendition.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Stereo audio bitrate passed to the audio encoder.
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Fragment duration handed to mp4fragment, in milliseconds.
pub const DEFAULT_FRAGMENT_DURATION_MS: u32 = 7000;

/// Name of the mp4dash output directory inside the output directory.
pub const DEFAULT_MANIFEST_NAME: &str = "output_dash";

/// Presets accepted by libx265 (and libx264).
pub const VALID_PRESETS: [&str; 10] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

/// What to do when the prober could not determine duration or frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataPolicy {
    /// Drop the `-t` / `-r` constraint for the unknown value and carry on.
    #[default]
    SkipUnknown,
    /// Fail the run before any rendition is scheduled.
    Require,
}

/// Names (or paths) of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffprobe: String,
    pub ffmpeg: String,
    pub mp4fragment: String,
    pub mp4dash: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffprobe: "ffprobe".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            mp4fragment: "mp4fragment".to_string(),
            mp4dash: "mp4dash".to_string(),
        }
    }
}

/// Main configuration structure for the ladder-core library.
///
/// All fields have defaults matching the reference ladder: x265 at CRF 28 with
/// the `medium` preset, 128k AAC audio, 7 second fragments and an
/// `output/output_dash` package.
///
/// # Examples
///
/// ```rust
/// use ladder_core::config::CoreConfigBuilder;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir("renditions")
///     .jobs(4)
///     .crf(24)
///     .command_timeout(Duration::from_secs(3600))
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory receiving renditions, fragments and the manifest package
    pub output_dir: PathBuf,

    /// Worker pool size; `None` uses the host's available parallelism
    pub jobs: Option<usize>,

    pub video_codec: String,

    /// Constant Rate Factor (0-51, lower is higher quality)
    pub crf: u8,

    pub preset: String,

    pub audio_codec: String,

    pub audio_bitrate: String,

    /// Fragment duration for mp4fragment in milliseconds
    pub fragment_duration_ms: u32,

    /// Name of the mp4dash output directory inside `output_dir`
    pub manifest_name: String,

    /// Pass `--force` to mp4dash so an existing package is replaced
    pub overwrite_package: bool,

    /// Tone map the SDR variant of an HDR source instead of only relabelling it
    pub tonemap_sdr: bool,

    pub metadata_policy: MetadataPolicy,

    /// Upper bound on any single ffmpeg or Bento4 invocation
    pub command_timeout: Option<Duration>,

    pub tools: ToolPaths,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jobs: None,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            fragment_duration_ms: DEFAULT_FRAGMENT_DURATION_MS,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            overwrite_package: true,
            tonemap_sdr: false,
            metadata_policy: MetadataPolicy::default(),
            command_timeout: None,
            tools: ToolPaths::default(),
        }
    }
}

impl CoreConfig {
    /// Creates a configuration writing to `output_dir` with every other field defaulted.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Directory mp4dash writes the package into.
    pub fn manifest_dir(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_name)
    }

    /// Number of worker threads the coordinator will use.
    pub fn worker_count(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        })
    }

    /// Checks the configuration for values the external tools would reject.
    pub fn validate(&self) -> CoreResult<()> {
        if self.crf > 51 {
            return Err(CoreError::Config(format!(
                "crf must be between 0 and 51, got {}",
                self.crf
            )));
        }

        if !VALID_PRESETS.contains(&self.preset.as_str()) {
            return Err(CoreError::Config(format!(
                "unknown encoder preset '{}' (expected one of: {})",
                self.preset,
                VALID_PRESETS.join(", ")
            )));
        }

        if self.jobs == Some(0) {
            return Err(CoreError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }

        if self.fragment_duration_ms == 0 {
            return Err(CoreError::Config(
                "fragment duration must be greater than zero".to_string(),
            ));
        }

        if self.command_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::Config(
                "command timeout must be greater than zero".to_string(),
            ));
        }

        for (name, value) in [
            ("video codec", &self.video_codec),
            ("audio codec", &self.audio_codec),
            ("audio bitrate", &self.audio_bitrate),
            ("manifest name", &self.manifest_name),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_ladder() {
        let config = CoreConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.video_codec, "libx265");
        assert_eq!(config.crf, 28);
        assert_eq!(config.preset, "medium");
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.audio_bitrate, "128k");
        assert_eq!(config.fragment_duration_ms, 7000);
        assert_eq!(config.manifest_dir(), PathBuf::from("output/output_dash"));
        assert_eq!(config.metadata_policy, MetadataPolicy::SkipUnknown);
        assert!(config.command_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CoreConfig::default();
        config.crf = 60;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.preset = "warp".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.jobs = Some(0);
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.fragment_duration_ms = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.command_timeout = Some(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.audio_bitrate = " ".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_worker_count() {
        let mut config = CoreConfig::default();
        assert!(config.worker_count() >= 1);
        config.jobs = Some(3);
        assert_eq!(config.worker_count(), 3);
    }
}
