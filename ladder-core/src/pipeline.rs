//! End-to-end run: probe, plan, transcode, package.
//!
//! The pipeline owns no tools itself. It borrows an ffprobe executor, an
//! ffmpeg spawner and a tool runner, so the same flow runs against the real
//! binaries or against the mocks.

use crate::config::{CoreConfig, MetadataPolicy};
use crate::encoding::{JobCoordinator, ProgressCallback, RenditionFailure, Transcoder};
use crate::error::{CoreError, CoreResult};
use crate::external::{
    CommandFfprobeExecutor, FfmpegSpawner, FfprobeExecutor, SidecarSpawner, SystemToolRunner,
    ToolRunner,
};
use crate::media::{SourceVideo, probe_source};
use crate::packaging::Packager;
use crate::rendition::plan_renditions;
use crate::utils::format_duration;

use chrono::Local;
use log::{info, warn};
use serde::Serialize;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Summary of a completed run.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub source: SourceVideo,
    /// Renditions that were produced and packaged
    pub outputs: Vec<PathBuf>,
    /// Renditions that were skipped because their transcode failed
    pub failures: Vec<RenditionFailure>,
    pub manifest_dir: PathBuf,
    pub started_at: String,
    pub elapsed_secs: f64,
}

/// Fails with `CoreError::InputNotFound` unless `path` is an existing file.
pub fn ensure_input_exists(path: &Path) -> CoreResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CoreError::InputNotFound(path.to_path_buf()))
    }
}

pub struct Pipeline<'a, P, S, R>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    R: ToolRunner,
{
    config: &'a CoreConfig,
    ffprobe: &'a P,
    spawner: &'a S,
    runner: &'a R,
    on_progress: Option<ProgressCallback>,
}

impl<'a, P, S, R> Pipeline<'a, P, S, R>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    R: ToolRunner,
{
    pub fn new(config: &'a CoreConfig, ffprobe: &'a P, spawner: &'a S, runner: &'a R) -> Self {
        Self {
            config,
            ffprobe,
            spawner,
            runner,
            on_progress: None,
        }
    }

    /// Called with `(completed, total)` as each rendition finishes.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Runs the whole pipeline for `input`.
    ///
    /// Individual transcode failures are tolerated and listed in the report.
    /// Any packaging failure, including having no rendition to package,
    /// fails the run.
    pub fn run(&self, input: &Path) -> CoreResult<PipelineReport> {
        let started = Instant::now();
        let started_at = Local::now();
        info!("Ladder run started: {}", started_at.format("%Y-%m-%d %H:%M:%S"));

        ensure_input_exists(input)?;
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let source = probe_source(self.ffprobe, input);
        info!("Is HDR: {}", source.is_hdr);
        self.check_metadata(&source)?;

        let jobs = plan_renditions(source.is_hdr);
        let transcoder = Transcoder::new(self.spawner, self.config, &source)?;
        let mut coordinator = JobCoordinator::new(self.config.worker_count());
        info!("Planned {} renditions, up to {} at a time", jobs.len(), coordinator.workers());
        if let Some(cb) = &self.on_progress {
            let cb = Arc::clone(cb);
            coordinator = coordinator.on_progress(move |done, total| cb(done, total));
        }
        let batch = coordinator.run(&jobs, |job| transcoder.transcode(job))?;

        for failure in &batch.failures {
            warn!("Skipping {} in the package: {}", failure.job, failure.error);
        }

        let manifest_dir = Packager::new(self.runner, self.config).package(&batch.outputs)?;

        let elapsed = started.elapsed().as_secs_f64();
        info!(
            "Ladder run finished: {} (took {})",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            format_duration(elapsed)
        );

        Ok(PipelineReport {
            input: input.to_path_buf(),
            source,
            outputs: batch.outputs,
            failures: batch.failures,
            manifest_dir,
            started_at: started_at.to_rfc3339(),
            elapsed_secs: elapsed,
        })
    }

    fn check_metadata(&self, source: &SourceVideo) -> CoreResult<()> {
        let mut missing = Vec::new();
        if source.duration_secs.is_none() {
            missing.push("duration");
        }
        if source.frame_rate.is_none() {
            missing.push("frame rate");
        }
        if missing.is_empty() {
            return Ok(());
        }

        match self.config.metadata_policy {
            MetadataPolicy::Require => Err(CoreError::MissingMetadata(format!(
                "{} unknown for {}",
                missing.join(" and "),
                source.path.display()
            ))),
            MetadataPolicy::SkipUnknown => {
                warn!(
                    "{} unknown for {}, renditions will not be constrained by it",
                    missing.join(" and "),
                    source.path.display()
                );
                Ok(())
            }
        }
    }
}

/// Runs the pipeline against the real ffprobe, ffmpeg and Bento4 binaries
/// named in `config.tools`.
pub fn run_with_system_tools<F>(
    config: &CoreConfig,
    input: &Path,
    on_progress: Option<F>,
) -> CoreResult<PipelineReport>
where
    F: Fn(usize, usize) + Send + Sync + 'static,
{
    let runner = SystemToolRunner::new(config.command_timeout);
    let ffprobe = CommandFfprobeExecutor::with_runner(runner.clone(), config.tools.ffprobe.clone());
    let spawner = SidecarSpawner::new(config.tools.ffmpeg.clone());

    let mut pipeline = Pipeline::new(config, &ffprobe, &spawner, &runner);
    if let Some(cb) = on_progress {
        pipeline = pipeline.on_progress(cb);
    }
    pipeline.run(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_input_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"").unwrap();

        assert!(ensure_input_exists(&file).is_ok());
        assert!(matches!(
            ensure_input_exists(&dir.path().join("missing.mp4")),
            Err(CoreError::InputNotFound(_))
        ));
        // A directory is not a valid input.
        assert!(matches!(ensure_input_exists(dir.path()), Err(CoreError::InputNotFound(_))));
    }
}
