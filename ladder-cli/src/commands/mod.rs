//! Command implementations for the CLI.

/// Runs the rendition ladder pipeline for one input file.
pub mod process;
