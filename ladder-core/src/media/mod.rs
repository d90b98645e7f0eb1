//! Media probing module
//!
//! Inspects the source file once, up front, and freezes the result into a
//! [`SourceVideo`] that every rendition job reads.

pub mod probe;

pub use probe::{
    HDR_MARKERS, SourceVideo, contains_hdr_marker, is_usable, parse_frame_rate, probe_source,
};
