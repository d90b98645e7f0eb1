//! Core library for building an adaptive-bitrate rendition ladder with
//! ffprobe, ffmpeg and Bento4.
//!
//! A run probes the source for HDR markers, duration and frame rate, plans
//! one rendition per ladder step (two per step for HDR sources), transcodes
//! them in parallel with a burned-in range marker, and packages whatever
//! succeeded into an MPEG-DASH presentation.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ladder_core::config::CoreConfigBuilder;
//! use ladder_core::run_with_system_tools;
//! use std::path::Path;
//!
//! let config = CoreConfigBuilder::new().output_dir("output").jobs(4).build();
//! config.validate().unwrap();
//!
//! let report = run_with_system_tools(
//!     &config,
//!     Path::new("input.mov"),
//!     Some(|done: usize, total: usize| println!("{done}/{total}")),
//! )
//! .unwrap();
//! println!("Manifest in {}", report.manifest_dir.display());
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod external;
pub mod media;
pub mod packaging;
pub mod pipeline;
pub mod rendition;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, MetadataPolicy, ToolPaths};
pub use encoding::{BatchOutcome, JobCoordinator, RenditionFailure, Transcoder};
pub use error::{CoreError, CoreResult};
pub use external::{check_dependencies, check_dependency};
pub use media::{SourceVideo, probe_source};
pub use packaging::Packager;
pub use pipeline::{Pipeline, PipelineReport, ensure_input_exists, run_with_system_tools};
pub use rendition::{RESOLUTIONS, RenditionJob, Resolution, plan_renditions};
pub use utils::format_duration;
