//! Source inspection: HDR status, duration and frame rate.
//!
//! Probing never fails as a whole. Each fact is queried on its own; a failed
//! query is logged and leaves that fact at its fallback (SDR, or `None` for
//! duration and frame rate) while the others are still collected.

use crate::error::{CoreError, CoreResult};
use crate::external::FfprobeExecutor;

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Color tag values that mark a stream as HDR.
pub const HDR_MARKERS: [&str; 4] = ["bt2020", "smpte2084", "arib-std-b67", "bt2020nc"];

/// Probed facts about the input file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceVideo {
    pub path: PathBuf,
    pub is_hdr: bool,
    /// `None` when ffprobe could not report a duration
    pub duration_secs: Option<f64>,
    /// `None` when ffprobe could not report a frame rate
    pub frame_rate: Option<f64>,
}

impl SourceVideo {
    /// File name without extension, used to name every rendition.
    pub fn stem(&self) -> CoreResult<String> {
        crate::utils::file_stem_safe(&self.path)
    }
}

/// Returns true if any tag value contains one of [`HDR_MARKERS`].
pub fn contains_hdr_marker<I, S>(values: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .any(|value| HDR_MARKERS.iter().any(|marker| value.as_ref().contains(marker)))
}

/// Parses an ffprobe rational such as `30000/1001` into frames per second.
///
/// A rate that is not strictly positive (`0/1`, `-5/1`) is rejected.
pub fn parse_frame_rate(raw: &str) -> CoreResult<f64> {
    let invalid = || CoreError::FfprobeParse(format!("invalid frame rate '{raw}'"));

    let (num, den) = raw.trim().split_once('/').ok_or_else(invalid)?;
    let num: i64 = num.trim().parse().map_err(|_| invalid())?;
    let den: i64 = den.trim().parse().map_err(|_| invalid())?;
    if den == 0 {
        return Err(invalid());
    }
    let fps = num as f64 / den as f64;
    if is_usable(fps) {
        Ok(fps)
    } else {
        Err(invalid())
    }
}

/// Whether a probed duration or rate can be passed on to ffmpeg.
pub fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Probes `input_path` for HDR status, duration and frame rate.
pub fn probe_source<P: FfprobeExecutor>(ffprobe: &P, input_path: &Path) -> SourceVideo {
    let is_hdr = match ffprobe.color_tags(input_path) {
        Ok(tags) => {
            log::debug!("Color tags for {}: {:?}", input_path.display(), tags);
            contains_hdr_marker(&tags)
        }
        Err(e) => {
            log::warn!("Error checking HDR with ffprobe, assuming SDR: {e}");
            false
        }
    };

    let duration_secs = match ffprobe.duration_secs(input_path) {
        Ok(duration) if is_usable(duration) => Some(duration),
        Ok(duration) => {
            log::warn!("Ignoring unusable duration {duration} for {}", input_path.display());
            None
        }
        Err(e) => {
            log::warn!("Error getting duration: {e}");
            None
        }
    };

    let frame_rate = match ffprobe
        .frame_rate_raw(input_path)
        .and_then(|raw| parse_frame_rate(&raw))
    {
        Ok(fps) => Some(fps),
        Err(e) => {
            log::warn!("Error getting frame rate: {e}");
            None
        }
    };

    SourceVideo {
        path: input_path.to_path_buf(),
        is_hdr,
        duration_secs,
        frame_rate,
    }
}
