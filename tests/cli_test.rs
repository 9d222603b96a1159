//! Tests that drive the compiled binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn write_jpeg(dir: &Path, name: &str) {
    let img = image::RgbImage::from_fn(32, 24, |x, y| {
        image::Rgb([(x * 8) as u8, (y * 10) as u8, ((x + y) * 4) as u8])
    });
    img.save(dir.join(name)).unwrap();
}

fn dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "metroLocal_IPC_main_20230101000000.jpg");
    write_jpeg(dir.path(), "metroLocal_IPC_main_20230101000500.jpg");
    write_jpeg(dir.path(), "metroLocal_IPC_main_20230101002000.jpg");
    fs::write(dir.path().join("random.txt"), b"not an image").unwrap();
    dir
}

fn run(folder: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_timelapse-audit"))
        .arg("--image-folder")
        .arg(folder)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_report_gaps_prints_lines() {
    let dir = dataset();

    let output = run(dir.path(), &["report-gaps", "--min-bytes", "0"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.trim_end().ends_with(", 15.0"));
}

#[test]
fn test_dataset_with_gap_fails() {
    let dir = dataset();

    let output = run(dir.path(), &["test-dataset", "--min-bytes", "0"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("15.0"));
}

#[test]
fn test_dataset_healthy_with_wide_threshold() {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "metroLocal_IPC_main_20230101000000.jpg");
    write_jpeg(dir.path(), "metroLocal_IPC_main_20230101000500.jpg");

    let output = run(
        dir.path(),
        &["test-dataset", "--min-bytes", "0", "--gap-minutes", "30"],
    );

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_build_dry_run_logs_frame_count() {
    let dir = dataset();
    let video = dir.path().join("out.mp4");

    let output = run(
        dir.path(),
        &[
            "build",
            "--min-bytes",
            "0",
            "--output-video",
            video.to_str().unwrap(),
            "--dry-run",
        ],
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dry-run: 3 frames would be written"));
    assert!(!video.exists());
}

#[test]
fn test_check_writes_report_and_metrics() {
    let dir = dataset();
    let out = TempDir::new().unwrap();
    let report = out.path().join("report.json");
    let metrics = out.path().join("run.prom");

    let output = run(
        dir.path(),
        &[
            "--report-out",
            report.to_str().unwrap(),
            "--metrics-out",
            metrics.to_str().unwrap(),
            "check",
            "--min-bytes",
            "0",
        ],
    );

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 4);
    let text = fs::read_to_string(&metrics).unwrap();
    assert!(text.contains("timelapse_files_valid 3"));
}

#[test]
fn test_invalid_pattern_exits_with_error() {
    let dir = dataset();

    let output = run(dir.path(), &["--pattern", r"img_\d+\.jpg", "check"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_file_and_flag_override() {
    let dir = dataset();
    let config = dir.path().join("timelapse.toml");
    fs::write(&config, "[scan]\nmin_bytes = 0\n\n[gaps]\nthreshold_minutes = 30\n").unwrap();

    let output = run(
        dir.path(),
        &["--config", config.to_str().unwrap(), "report-gaps"],
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let output = run(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "report-gaps",
            "--gap-minutes",
            "10",
        ],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
}
