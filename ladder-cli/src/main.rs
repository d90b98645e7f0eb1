// ladder-cli/src/main.rs
//
// Entry point for the `ladder` binary.
//
// Responsibilities:
// - Parsing arguments (usage errors exit with code 1, --help/--version with 0).
// - Initializing env_logger.
// - Running the process command and mapping any error to exit code 1.

use clap::Parser;
use ladder_cli::error::EXIT_FAILURE;
use ladder_cli::{Cli, logging, run_process, terminal};
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version are rendered on stdout and are not failures.
            let code = if e.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    logging::init_logging(cli.verbose);

    if let Err(e) = run_process(&cli) {
        log::debug!("Run failed: {e:?}");
        terminal::print_error(&e.to_string());
        process::exit(EXIT_FAILURE);
    }
}
