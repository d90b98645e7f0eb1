// ============================================================================
// ladder-cli/src/commands/process.rs
// ============================================================================
//
// PROCESS COMMAND: Run the ladder pipeline for one input file
//
// Maps the parsed arguments onto a CoreConfig, checks the input and the
// external tools, runs the pipeline against the real binaries and prints the
// outcome either as a terminal summary or as JSON.

use crate::cli::Cli;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

use ladder_core::config::{CoreConfig, CoreConfigBuilder, MetadataPolicy};
use ladder_core::{
    PipelineReport, check_dependencies, ensure_input_exists, format_duration,
    run_with_system_tools,
};

use log::debug;
use std::time::Duration;

/// Builds the core configuration from the command line.
pub fn build_config(args: &Cli) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .output_dir(&args.output_dir)
        .crf(args.crf)
        .preset(&args.preset)
        .audio_bitrate(&args.audio_bitrate)
        .fragment_duration_ms(args.fragment_duration_ms)
        .tonemap_sdr(args.tonemap_sdr)
        .metadata_policy(if args.require_metadata {
            MetadataPolicy::Require
        } else {
            MetadataPolicy::SkipUnknown
        });

    if let Some(jobs) = args.jobs {
        builder = builder.jobs(usize::from(jobs));
    }
    if let Some(secs) = args.timeout {
        builder = builder.command_timeout(Duration::from_secs(secs));
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Runs the pipeline for `args.input`.
pub fn run_process(args: &Cli) -> CliResult<()> {
    // Checked first so a bad path never creates the output directory.
    ensure_input_exists(&args.input)?;
    let config = build_config(args)?;

    if args.skip_dependency_check {
        debug!("Skipping external dependency check");
    } else {
        check_dependencies(&config)?;
    }

    debug!("Run started: {}", chrono::Local::now());
    debug!("Configuration: {config:?}");

    if !args.json {
        terminal::print_section("Ladder");
        terminal::print_status("Input", args.input.display());
        terminal::print_status("Output", config.output_dir.display());
        terminal::print_status("Workers", config.worker_count());
    }

    let pb = terminal::create_progress_bar(args.json);
    let bar = pb.clone();
    let result = run_with_system_tools(
        &config,
        &args.input,
        Some(move |done: usize, total: usize| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        }),
    );
    pb.finish_and_clear();
    let report = result?;

    debug!("Finished at: {}", chrono::Local::now());

    if args.json {
        let json = serde_json::to_string_pretty(&report).cli_context("Serializing run report")?;
        println!("{json}");
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    terminal::print_section("Summary");
    terminal::print_status("HDR source", if report.source.is_hdr { "yes" } else { "no" });
    terminal::print_status(
        "Duration",
        report
            .source
            .duration_secs
            .map_or_else(|| "unknown".to_string(), format_duration),
    );
    terminal::print_status(
        "Frame rate",
        report
            .source
            .frame_rate
            .map_or_else(|| "unknown".to_string(), |fps| format!("{fps:.3}")),
    );
    terminal::print_status("Renditions", report.outputs.len());

    for failure in &report.failures {
        terminal::print_warning(&format!("{} failed: {}", failure.job, failure.error));
    }

    terminal::print_success(&format!(
        "DASH package written to {} in {}",
        report.manifest_dir.display(),
        format_duration(report.elapsed_secs)
    ));
}
