// ============================================================================
// ladder-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every setter overrides one default;
// `build` never fails, callers run `CoreConfig::validate` afterwards.

use std::path::PathBuf;
use std::time::Duration;

use super::{CoreConfig, MetadataPolicy, ToolPaths};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use ladder_core::config::{CoreConfigBuilder, MetadataPolicy};
///
/// let config = CoreConfigBuilder::new()
///     .output_dir("out")
///     .preset("slow")
///     .metadata_policy(MetadataPolicy::Require)
///     .tonemap_sdr(true)
///     .build();
/// assert_eq!(config.preset, "slow");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Sets the worker pool size.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = Some(jobs);
        self
    }

    pub fn video_codec(mut self, codec: impl Into<String>) -> Self {
        self.config.video_codec = codec.into();
        self
    }

    pub fn crf(mut self, crf: u8) -> Self {
        self.config.crf = crf;
        self
    }

    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.config.preset = preset.into();
        self
    }

    pub fn audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.config.audio_codec = codec.into();
        self
    }

    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.config.audio_bitrate = bitrate.into();
        self
    }

    pub fn fragment_duration_ms(mut self, ms: u32) -> Self {
        self.config.fragment_duration_ms = ms;
        self
    }

    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.config.manifest_name = name.into();
        self
    }

    pub fn overwrite_package(mut self, overwrite: bool) -> Self {
        self.config.overwrite_package = overwrite;
        self
    }

    pub fn tonemap_sdr(mut self, enabled: bool) -> Self {
        self.config.tonemap_sdr = enabled;
        self
    }

    pub fn metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.config.metadata_policy = policy;
        self
    }

    /// Bounds every ffmpeg and Bento4 invocation.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = Some(timeout);
        self
    }

    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn build(self) -> CoreConfig {
        self.config
    }
}
