// ============================================================================
// ladder-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup
//
// The core library logs through the `log` facade; the CLI installs
// `env_logger` as the backend. RUST_LOG always wins over the default level:
// - default: info
// - --verbose: debug
// - RUST_LOG=trace: per-frame ffmpeg progress

use log::LevelFilter;

/// Initializes env_logger. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp_secs()
        .format_target(verbose)
        .try_init();
}
