// ladder-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::Parser;
use clap::builder::PossibleValuesParser;
use ladder_core::config::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_CRF, DEFAULT_FRAGMENT_DURATION_MS, DEFAULT_OUTPUT_DIR,
    DEFAULT_PRESET, VALID_PRESETS,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Ladder: HDR-aware rendition ladder and DASH packager",
    long_about = "Probes a source video, transcodes it into a 360p-1080p rendition ladder \
                  (HDR and SDR variants for HDR sources) with ffmpeg, and packages the \
                  results for MPEG-DASH with Bento4."
)]
pub struct Cli {
    /// Source video file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory receiving renditions, fragments and the DASH package
    #[arg(short = 'o', long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum number of concurrent transcodes (defaults to the CPU count)
    #[arg(short = 'j', long, value_name = "N", env = "LADDER_JOBS",
          value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    // --- Encoder Overrides ---
    /// x265 constant rate factor (0-51, lower is better quality)
    #[arg(long, value_name = "CRF", default_value_t = DEFAULT_CRF,
          value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// x265 preset
    #[arg(long, value_name = "PRESET", default_value = DEFAULT_PRESET,
          value_parser = PossibleValuesParser::new(VALID_PRESETS))]
    pub preset: String,

    /// AAC bitrate, e.g. 128k
    #[arg(long, value_name = "RATE", default_value = DEFAULT_AUDIO_BITRATE)]
    pub audio_bitrate: String,

    // --- Packaging ---
    /// Fragment duration handed to mp4fragment, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_FRAGMENT_DURATION_MS,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub fragment_duration_ms: u32,

    // --- Behaviour ---
    /// Kill any single ffmpeg or Bento4 call running longer than this
    #[arg(long, value_name = "SECONDS", env = "LADDER_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Tone map the SDR variant of an HDR source to BT.709 instead of only relabelling it
    #[arg(long)]
    pub tonemap_sdr: bool,

    /// Fail instead of encoding unconstrained when duration or frame rate cannot be probed
    #[arg(long)]
    pub require_metadata: bool,

    /// Do not check that ffprobe, ffmpeg, mp4fragment and mp4dash are installed
    #[arg(long)]
    pub skip_dependency_check: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for troubleshooting
    #[arg(short, long)]
    pub verbose: bool,
}
