//! Encoding module for ladder
//!
//! Builds and runs one ffmpeg transcode per rendition job, and fans the jobs
//! out over a bounded worker pool.

pub mod coordinator;
pub mod filters;
pub mod transcode;

pub use coordinator::{BatchOutcome, JobCoordinator, ProgressCallback, RenditionFailure};
pub use filters::{TONEMAP_TO_BT709, VideoFilterChain};
pub use transcode::Transcoder;
