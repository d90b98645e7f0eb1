//! The rendition ladder: target resolutions, job planning and output naming.

pub mod overlay;

pub use overlay::{OverlayColor, OverlayCorner, OverlaySpec};

use serde::Serialize;
use std::fmt;

/// A named output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Resolution {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

/// The ladder, smallest first.
pub const RESOLUTIONS: [Resolution; 4] = [
    Resolution {
        label: "360p",
        width: 640,
        height: 360,
    },
    Resolution {
        label: "480p",
        width: 854,
        height: 480,
    },
    Resolution {
        label: "720p",
        width: 1280,
        height: 720,
    },
    Resolution {
        label: "1080p",
        width: 1920,
        height: 1080,
    },
];

/// Looks up a ladder entry by label, e.g. `"720p"`.
pub fn resolution_by_label(label: &str) -> Option<Resolution> {
    RESOLUTIONS.iter().copied().find(|r| r.label == label)
}

/// One unit of work for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RenditionJob {
    pub resolution: Resolution,
    /// Whether this rendition is marked (overlay and file name) as HDR
    pub is_hdr: bool,
}

impl RenditionJob {
    pub fn new(resolution: Resolution, is_hdr: bool) -> Self {
        Self { resolution, is_hdr }
    }

    pub fn range_label(&self) -> &'static str {
        if self.is_hdr { "HDR" } else { "SDR" }
    }

    /// `{stem}_{label}_{HDR|SDR}.mp4`
    pub fn output_file_name(&self, stem: &str) -> String {
        format!("{}_{}_{}.mp4", stem, self.resolution.label, self.range_label())
    }

    pub fn overlay(&self) -> OverlaySpec {
        OverlaySpec::for_frame(self.resolution.width, self.resolution.height, self.is_hdr)
    }
}

impl fmt::Display for RenditionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.resolution.label, self.range_label())
    }
}

/// Enumerates the jobs for a source.
///
/// Every resolution gets a job carrying the source's own HDR state. An HDR
/// source additionally gets an SDR-marked job per resolution, so the result
/// is 4 jobs for SDR input and 8 for HDR input.
pub fn plan_renditions(source_is_hdr: bool) -> Vec<RenditionJob> {
    let mut jobs = Vec::with_capacity(RESOLUTIONS.len() * 2);
    for resolution in RESOLUTIONS {
        jobs.push(RenditionJob::new(resolution, source_is_hdr));
        if source_is_hdr {
            jobs.push(RenditionJob::new(resolution, false));
        }
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_table() {
        let dims: Vec<(&str, u32, u32)> = RESOLUTIONS
            .iter()
            .map(|r| (r.label, r.width, r.height))
            .collect();
        assert_eq!(
            dims,
            vec![("360p", 640, 360), ("480p", 854, 480), ("720p", 1280, 720), ("1080p", 1920, 1080)]
        );
        assert_eq!(resolution_by_label("720p").map(|r| r.width), Some(1280));
        assert!(resolution_by_label("4k").is_none());
    }

    #[test]
    fn test_sdr_source_plans_four_sdr_jobs() {
        let jobs = plan_renditions(false);
        assert_eq!(jobs.len(), 4);
        assert!(jobs.iter().all(|j| !j.is_hdr));
        let labels: Vec<_> = jobs.iter().map(|j| j.resolution.label).collect();
        assert_eq!(labels, vec!["360p", "480p", "720p", "1080p"]);
    }

    #[test]
    fn test_hdr_source_plans_hdr_and_sdr_per_resolution() {
        let jobs = plan_renditions(true);
        assert_eq!(jobs.len(), 8);
        for resolution in RESOLUTIONS {
            assert!(jobs.contains(&RenditionJob::new(resolution, true)));
            assert!(jobs.contains(&RenditionJob::new(resolution, false)));
        }
    }

    #[test]
    fn test_output_file_name() {
        let job = RenditionJob::new(RESOLUTIONS[2], true);
        assert_eq!(job.output_file_name("movie"), "movie_720p_HDR.mp4");
        let job = RenditionJob::new(RESOLUTIONS[0], false);
        assert_eq!(job.output_file_name("movie.final"), "movie.final_360p_SDR.mp4");
        assert_eq!(job.to_string(), "360p SDR");
    }
}
