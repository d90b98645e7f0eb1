//! One rendition, one ffmpeg invocation.
//!
//! The transcoder scales the source, burns in the range marker and encodes
//! with the configured video and audio codecs. When the source's duration and
//! frame rate are known they are pinned with `-t` and `-r`.

use crate::config::CoreConfig;
use crate::encoding::filters::{TONEMAP_TO_BT709, VideoFilterChain};
use crate::error::{CoreError, CoreResult, command_failed_error, command_timeout_error};
use crate::external::{FfmpegProcess, FfmpegSpawner};
use crate::media::SourceVideo;
use crate::rendition::RenditionJob;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use log::{debug, error, info, trace, warn};

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Lines of ffmpeg error output kept for the failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Encodes rendition jobs for a single source.
///
/// Shared by reference between worker threads; every call to
/// [`Transcoder::transcode`] spawns its own ffmpeg process.
pub struct Transcoder<'a, S: FfmpegSpawner> {
    spawner: &'a S,
    config: &'a CoreConfig,
    source: &'a SourceVideo,
    stem: String,
}

impl<'a, S: FfmpegSpawner> Transcoder<'a, S> {
    pub fn new(
        spawner: &'a S,
        config: &'a CoreConfig,
        source: &'a SourceVideo,
    ) -> CoreResult<Self> {
        let stem = source.stem()?;
        Ok(Self {
            spawner,
            config,
            source,
            stem,
        })
    }

    /// Where the rendition for `job` is written.
    pub fn output_path(&self, job: &RenditionJob) -> PathBuf {
        self.config.output_dir.join(job.output_file_name(&self.stem))
    }

    /// Whether `job` gets the BT.709 tone mapping chain.
    fn tonemaps(&self, job: &RenditionJob) -> bool {
        self.config.tonemap_sdr && self.source.is_hdr && !job.is_hdr
    }

    /// The `-vf` chain for `job`.
    pub fn filter_chain(&self, job: &RenditionJob) -> String {
        let mut chain = VideoFilterChain::new()
            .add_scale(job.resolution.width, job.resolution.height);
        if self.tonemaps(job) {
            chain = chain.add_filter(TONEMAP_TO_BT709);
        }
        chain
            .add_filter(job.overlay().drawtext_filter())
            .build()
            .unwrap_or_default()
    }

    /// Builds the full ffmpeg command for `job` writing to `output`.
    pub fn build_command(&self, job: &RenditionJob, output: &Path) -> FfmpegCommand {
        let config = self.config;
        let mut cmd = self.spawner.command();

        cmd.args(["-y"])
            .input(self.source.path.to_string_lossy().as_ref())
            .args(["-vf", &self.filter_chain(job)])
            .args(["-c:v", &config.video_codec])
            .args(["-crf", &config.crf.to_string()])
            .args(["-preset", &config.preset]);

        if let Some(fps) = self.source.frame_rate {
            cmd.args(["-r", &fps.to_string()]);
        }

        cmd.args(["-c:a", &config.audio_codec])
            .args(["-b:a", &config.audio_bitrate]);

        if let Some(duration) = self.source.duration_secs {
            cmd.args(["-t", &duration.to_string()]);
        }

        if self.tonemaps(job) {
            cmd.args(["-color_primaries", "bt709"])
                .args(["-color_trc", "bt709"])
                .args(["-colorspace", "bt709"]);
        }

        cmd.output(output.to_string_lossy().as_ref());
        cmd
    }

    /// Runs the transcode for `job` and returns the rendition path.
    ///
    /// A failed or timed out encode leaves no file behind.
    pub fn transcode(&self, job: &RenditionJob) -> CoreResult<PathBuf> {
        let output = self.output_path(job);
        let cmd = self.build_command(job, &output);
        debug!("Transcode command for {job}: {cmd:?}");
        info!("Transcoding {} -> {}", job, output.display());

        let result = self.run(job, cmd);
        if result.is_err() {
            remove_partial_output(&output);
        }
        result.map(|()| output)
    }

    fn run(&self, job: &RenditionJob, cmd: FfmpegCommand) -> CoreResult<()> {
        let started = Instant::now();
        let timeout = self.config.command_timeout;
        let label = format!("ffmpeg ({job})");

        let mut process = self.spawner.spawn(cmd)?;
        let events = match process.events() {
            Ok(events) => events,
            Err(e) => {
                stop(&mut process, &label);
                return Err(e);
            }
        };

        // Events are forwarded from a reader thread so the deadline is
        // enforced even while ffmpeg prints nothing.
        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("ffmpeg-events".to_string())
            .spawn(move || {
                for event in events {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = reader {
            stop(&mut process, &label);
            return Err(e.into());
        }

        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        loop {
            let next = match timeout {
                Some(limit) => {
                    let remaining = check_deadline(&label, started, limit);
                    let received = remaining.and_then(|left| match rx.recv_timeout(left) {
                        Ok(event) => Ok(Some(event)),
                        Err(RecvTimeoutError::Disconnected) => {
                            check_deadline(&label, started, limit).map(|_| None)
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            Err(command_timeout_error(&label, limit))
                        }
                    });
                    match received {
                        Ok(next) => next,
                        Err(e) => {
                            warn!("{label} exceeded its time limit, killing it");
                            stop(&mut process, &label);
                            return Err(e);
                        }
                    }
                }
                None => rx.recv().ok(),
            };
            let Some(event) = next else { break };

            match event {
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line)
                | FfmpegEvent::Error(line) => {
                    error!(target: "ffmpeg_log", "[{job}] {line}");
                    if stderr_tail.len() == STDERR_TAIL_LINES {
                        stderr_tail.pop_front();
                    }
                    stderr_tail.push_back(line);
                }
                FfmpegEvent::Log(LogLevel::Warning, line) => {
                    debug!(target: "ffmpeg_log", "[{job}] {line}");
                }
                FfmpegEvent::Progress(progress) => {
                    trace!(
                        "[{job}] frame={} time={} speed={:.2}x",
                        progress.frame, progress.time, progress.speed
                    );
                }
                _ => {}
            }
        }

        let status = process.wait()?;
        if !status.success() {
            let stderr = Vec::from(stderr_tail).join("\n");
            error!("{label} exited with {status}");
            return Err(command_failed_error(label, status, stderr));
        }

        info!("Finished {} in {:.1}s", job, started.elapsed().as_secs_f64());
        Ok(())
    }
}

/// Time left before `limit` runs out, or a timeout error once it has.
fn check_deadline(label: &str, started: Instant, limit: Duration) -> CoreResult<Duration> {
    match limit.checked_sub(started.elapsed()) {
        Some(left) if !left.is_zero() => Ok(left),
        _ => Err(command_timeout_error(label, limit)),
    }
}

/// Kills `process` and reaps it.
fn stop<P: FfmpegProcess>(process: &mut P, label: &str) {
    if let Err(e) = process.kill() {
        warn!("Failed to kill {label}: {e}");
    }
    if let Err(e) = process.wait() {
        warn!("Failed to reap {label}: {e}");
    }
}

fn remove_partial_output(output: &Path) {
    if output.exists() {
        match std::fs::remove_file(output) {
            Ok(()) => debug!("Removed partial output {}", output.display()),
            Err(e) => warn!("Failed to remove partial output {}: {e}", output.display()),
        }
    }
}
