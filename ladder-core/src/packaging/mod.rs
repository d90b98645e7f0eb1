//! Bento4 packaging: fragmentation and DASH manifest generation.
//!
//! Every rendition is fragmented with `mp4fragment`, then all fragmented
//! files are handed to a single `mp4dash` call. Unlike the transcode stage,
//! packaging stops at the first failure.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{ToolCommand, ToolRunner};

use log::{debug, error, info};

use std::path::{Path, PathBuf};

/// Suffix appended to a rendition's stem for its fragmented copy.
pub const FRAGMENTED_SUFFIX: &str = "-fragmented";

/// Drives mp4fragment and mp4dash through a [`ToolRunner`].
pub struct Packager<'a, R: ToolRunner> {
    runner: &'a R,
    config: &'a CoreConfig,
}

impl<'a, R: ToolRunner> Packager<'a, R> {
    pub fn new(runner: &'a R, config: &'a CoreConfig) -> Self {
        Self { runner, config }
    }

    /// `<output_dir>/<rendition stem>-fragmented.mp4`
    pub fn fragmented_path(&self, rendition: &Path) -> CoreResult<PathBuf> {
        let stem = crate::utils::file_stem_safe(rendition)?;
        Ok(self
            .config
            .output_dir
            .join(format!("{stem}{FRAGMENTED_SUFFIX}.mp4")))
    }

    pub fn fragment_command(&self, rendition: &Path, fragmented: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.tools.mp4fragment)
            .arg("--fragment-duration")
            .arg(self.config.fragment_duration_ms.to_string())
            .arg(rendition.to_string_lossy())
            .arg(fragmented.to_string_lossy())
    }

    pub fn manifest_command(&self, fragmented: &[PathBuf]) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.config.tools.mp4dash);
        if self.config.overwrite_package {
            cmd = cmd.arg("--force");
        }
        cmd.arg("-o")
            .arg(self.config.manifest_dir().to_string_lossy())
            .args(fragmented.iter().map(|p| p.to_string_lossy().into_owned()))
    }

    /// Fragments every rendition and writes the DASH package.
    ///
    /// Returns the manifest directory. No manifest is attempted once any
    /// fragmentation has failed.
    pub fn package(&self, renditions: &[PathBuf]) -> CoreResult<PathBuf> {
        if renditions.is_empty() {
            error!("No renditions to package");
            return Err(CoreError::NothingToPackage);
        }

        let mut fragmented = Vec::with_capacity(renditions.len());
        for rendition in renditions {
            fragmented.push(self.fragment(rendition)?);
        }

        let cmd = self.manifest_command(&fragmented);
        debug!("Manifest command: {cmd}");
        self.runner
            .run_checked(&cmd)
            .map_err(|e| CoreError::ManifestGeneration(e.to_string()))?;

        let manifest_dir = self.config.manifest_dir();
        info!("DASH package written to {}", manifest_dir.display());
        Ok(manifest_dir)
    }

    fn fragment(&self, rendition: &Path) -> CoreResult<PathBuf> {
        let fragmented = self.fragmented_path(rendition)?;
        let cmd = self.fragment_command(rendition, &fragmented);
        debug!("Fragment command: {cmd}");

        self.runner.run_checked(&cmd).map_err(|e| {
            error!("Fragmentation of {} failed: {e}", rendition.display());
            CoreError::Fragmentation {
                input: rendition.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        info!("Fragmented {}", fragmented.display());
        Ok(fragmented)
    }
}
