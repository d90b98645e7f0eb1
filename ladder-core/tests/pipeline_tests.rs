// ladder-core/tests/pipeline_tests.rs
#![cfg(unix)]

use ladder_core::config::{CoreConfig, MetadataPolicy};
use ladder_core::error::CoreError;
use ladder_core::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor, MockToolRunner};
use ladder_core::pipeline::Pipeline;

use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

struct Workspace {
    _dir: TempDir,
    input: PathBuf,
    config: CoreConfig,
}

fn workspace(name: &str) -> Workspace {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join(name);
    std::fs::write(&input, b"dummy content").expect("write input");
    let mut config = CoreConfig::new(dir.path().join("output"));
    config.jobs = Some(2);
    Workspace {
        _dir: dir,
        input,
        config,
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn arg_after(call: &[String], flag: &str) -> Option<String> {
    call.iter()
        .position(|a| a == flag)
        .and_then(|i| call.get(i + 1).cloned())
}

#[test]
fn test_sdr_source_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1");
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();

    let report = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input)?;

    assert!(!report.source.is_hdr);
    assert_eq!(
        file_names(&report.outputs),
        vec!["clip_1080p_SDR.mp4", "clip_360p_SDR.mp4", "clip_480p_SDR.mp4", "clip_720p_SDR.mp4"]
    );
    assert!(report.failures.is_empty());
    assert_eq!(report.manifest_dir, ws.config.output_dir.join("output_dash"));
    for output in &report.outputs {
        assert!(output.exists(), "{} should exist", output.display());
    }

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 4);
    for call in &calls {
        assert_eq!(arg_after(call, "-c:v").as_deref(), Some("libx265"));
        assert_eq!(arg_after(call, "-crf").as_deref(), Some("28"));
        assert_eq!(arg_after(call, "-preset").as_deref(), Some("medium"));
        assert_eq!(arg_after(call, "-r").as_deref(), Some("30"));
        assert_eq!(arg_after(call, "-t").as_deref(), Some("10"));
        assert_eq!(arg_after(call, "-b:a").as_deref(), Some("128k"));
        assert!(arg_after(call, "-vf").unwrap().contains("fontcolor=white"));
    }

    let fragments = runner.calls_to("mp4fragment");
    assert_eq!(fragments.len(), 4);
    for cmd in &fragments {
        assert_eq!(&cmd.args[..2], ["--fragment-duration", "7000"]);
        assert!(cmd.args[3].ends_with("-fragmented.mp4"));
    }

    let dash = runner.calls_to("mp4dash");
    assert_eq!(dash.len(), 1);
    assert_eq!(dash[0].args.iter().filter(|a| a.ends_with("-fragmented.mp4")).count(), 4);
    assert!(ws.config.manifest_dir().is_dir());
    Ok(())
}

#[test]
fn test_hdr_source_produces_eight_renditions() -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace("movie.mov");
    let ffprobe = MockFfprobeExecutor::hdr(4.0, "24000/1001");
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();

    let report = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input)?;

    assert!(report.source.is_hdr);
    let names = file_names(&report.outputs);
    assert_eq!(names.len(), 8);
    assert_eq!(names.iter().filter(|n| n.ends_with("_HDR.mp4")).count(), 4);
    assert_eq!(names.iter().filter(|n| n.ends_with("_SDR.mp4")).count(), 4);

    let calls = spawner.get_received_calls();
    let green = calls
        .iter()
        .filter(|c| arg_after(c, "-vf").is_some_and(|vf| vf.contains("fontcolor=green")))
        .count();
    assert_eq!(green, 4);

    assert_eq!(runner.calls_to("mp4fragment").len(), 8);
    assert_eq!(runner.calls_to("mp4dash").len(), 1);
    Ok(())
}

#[test]
fn test_failed_transcode_is_left_out_of_the_package() -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "25/1");
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    spawner.add_exit_error_expectation(
        "clip_480p_SDR.mp4",
        vec![FfmpegEvent::Error("Simulated encoder failure".to_string())],
        1,
    );
    let runner = MockToolRunner::with_dummy_outputs();

    let report = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input)?;

    assert_eq!(report.outputs.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].job.resolution.label, "480p");
    assert!(report.failures[0].error.contains("Simulated encoder failure"));
    assert!(!ws.config.output_dir.join("clip_480p_SDR.mp4").exists());

    let fragments = runner.calls_to("mp4fragment");
    assert_eq!(fragments.len(), 3);
    assert!(fragments.iter().all(|c| !c.args.iter().any(|a| a.contains("480p"))));
    let dash = runner.calls_to("mp4dash");
    assert_eq!(dash[0].args.iter().filter(|a| a.ends_with("-fragmented.mp4")).count(), 3);
    Ok(())
}

#[test]
fn test_fragment_failure_stops_before_manifest() {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1");
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();
    runner.fail_when("mp4fragment", 1);

    let result = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input);

    assert!(matches!(result, Err(CoreError::Fragmentation { .. })));
    assert_eq!(runner.calls_to("mp4fragment").len(), 1);
    assert!(runner.calls_to("mp4dash").is_empty());
}

#[test]
fn test_manifest_failure_fails_the_run() {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1");
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();
    runner.fail_when("mp4dash", 2);

    let result = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input);
    assert!(matches!(result, Err(CoreError::ManifestGeneration(_))));
}

#[test]
fn test_all_transcodes_failing_is_an_error() {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1");
    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation("libx265", Vec::new(), 1);
    let runner = MockToolRunner::with_dummy_outputs();

    let result = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input);

    assert!(matches!(result, Err(CoreError::NothingToPackage)));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_unknown_metadata_is_skipped_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1")
        .with_duration(None)
        .with_frame_rate(None);
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();

    let report = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input)?;

    assert_eq!(report.outputs.len(), 4);
    assert_eq!(report.source.duration_secs, None);
    for call in spawner.get_received_calls() {
        assert!(!call.contains(&"-t".to_string()));
        assert!(!call.contains(&"-r".to_string()));
    }
    Ok(())
}

#[test]
fn test_require_policy_fails_before_any_transcode() {
    let mut ws = workspace("clip.mp4");
    ws.config.metadata_policy = MetadataPolicy::Require;
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1").with_frame_rate(None);
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();

    let result = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input);

    match result {
        Err(CoreError::MissingMetadata(msg)) => assert!(msg.contains("frame rate")),
        other => panic!("expected MissingMetadata, got {other:?}"),
    }
    assert!(spawner.get_received_calls().is_empty());
}

#[test]
fn test_failed_hdr_probe_falls_back_to_sdr() -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::hdr(10.0, "30/1").with_color_tags(None);
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();

    let report = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(&ws.input)?;

    assert!(!report.source.is_hdr);
    assert_eq!(report.outputs.len(), 4);
    Ok(())
}

#[test]
fn test_missing_input_creates_nothing() {
    let ws = workspace("clip.mp4");
    let missing = Path::new("/definitely/not/here.mp4");
    let ffprobe = MockFfprobeExecutor::sdr(10.0, "30/1");
    let spawner = MockFfmpegSpawner::new();
    let runner = MockToolRunner::new();

    let result = Pipeline::new(&ws.config, &ffprobe, &spawner, &runner).run(missing);

    assert!(matches!(result, Err(CoreError::InputNotFound(_))));
    assert!(!ws.config.output_dir.exists());
    assert!(spawner.get_received_calls().is_empty());
}

#[test]
fn test_progress_callback_sees_every_job() -> Result<(), Box<dyn std::error::Error>> {
    let ws = workspace("clip.mp4");
    let ffprobe = MockFfprobeExecutor::hdr(2.0, "30/1");
    let spawner = MockFfmpegSpawner::with_dummy_outputs();
    let runner = MockToolRunner::with_dummy_outputs();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    Pipeline::new(&ws.config, &ffprobe, &spawner, &runner)
        .on_progress(move |done, total| sink.lock().unwrap().push((done, total)))
        .run(&ws.input)?;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 8);
    assert_eq!(seen.last(), Some(&(8, 8)));
    Ok(())
}
