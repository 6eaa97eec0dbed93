//! Offline tests for the s3up binary
//!
//! These run the real binary with `--dry-run` or against paths that fail
//! before any network access, so no S3 server is needed.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_s3up(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s3up"))
        .args(args)
        .env("S3UP_CONFIG_DIR", config_dir)
        .env_remove("S3UP_BUCKET")
        .env_remove("S3UP_PREFIX")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute s3up")
}

fn dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("x.csv"), "a,b\n").unwrap();
    std::fs::write(dir.path().join("sub").join("y.csv"), "c,d\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    dir
}

#[test]
fn test_dry_run_json_summary() {
    let data = dataset();
    let config = TempDir::new().unwrap();

    let output = run_s3up(
        &[
            "--json",
            "upload",
            data.path().to_str().unwrap(),
            "--bucket",
            "reports-bucket",
            "--prefix",
            "reports/",
            "--dry-run",
        ],
        config.path(),
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["succeeded"], 2);
    assert_eq!(json["failed"], 0);
    assert_eq!(json["prefix"], "reports/");
}

#[test]
fn test_dry_run_human_lists_keys() {
    let data = dataset();
    let config = TempDir::new().unwrap();

    let output = run_s3up(
        &[
            "--no-color",
            "--no-progress",
            "upload",
            data.path().to_str().unwrap(),
            "-b",
            "reports-bucket",
            "-p",
            "reports",
            "--dry-run",
        ],
        config.path(),
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reports-bucket/reports/x.csv"));
    assert!(stdout.contains("reports-bucket/reports/sub/y.csv"));
    assert!(!stdout.contains("notes.txt"));
    assert!(stdout.contains("Would upload 2 file(s)"));
}

#[test]
fn test_missing_source_exits_not_found() {
    let config = TempDir::new().unwrap();
    let missing = config.path().join("missing");

    let output = run_s3up(
        &[
            "upload",
            missing.to_str().unwrap(),
            "--bucket",
            "reports-bucket",
            "--dry-run",
        ],
        config.path(),
    );

    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_invalid_bucket_is_usage_error() {
    let data = dataset();
    let config = TempDir::new().unwrap();

    let output = run_s3up(
        &[
            "upload",
            data.path().to_str().unwrap(),
            "--bucket",
            "Not_A_Bucket",
            "--dry-run",
        ],
        config.path(),
    );

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_init_and_show() {
    let config = TempDir::new().unwrap();

    let output = run_s3up(&["config", "init"], config.path());
    assert!(output.status.success());
    assert!(config.path().join("config.toml").exists());

    let output = run_s3up(&["config", "init"], config.path());
    assert_eq!(output.status.code(), Some(2));

    let output = run_s3up(&["--json", "config", "show"], config.path());
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["exists"], true);
    assert_eq!(json["config"]["defaults"]["extension"], ".csv");
}

#[test]
fn test_config_defaults_apply_to_upload() {
    let data = dataset();
    let config = TempDir::new().unwrap();
    std::fs::write(
        config.path().join("config.toml"),
        "schema_version = 1\n\n[defaults]\nprefix = \"from-config\"\nextension = \"txt\"\n",
    )
    .unwrap();

    let output = run_s3up(
        &[
            "--json",
            "upload",
            data.path().to_str().unwrap(),
            "--bucket",
            "reports-bucket",
            "--dry-run",
        ],
        config.path(),
    );

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["prefix"], "from-config/");
    assert_eq!(json["succeeded"], 1);
}

#[test]
fn test_upload_logs_at_info_by_default() {
    let data = dataset();
    let config = TempDir::new().unwrap();

    let output = run_s3up(
        &[
            "--no-progress",
            "upload",
            data.path().to_str().unwrap(),
            "--bucket",
            "my-bucket",
            "--dry-run",
        ],
        config.path(),
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Starting upload"), "stderr: {stderr}");
    assert!(stderr.contains("my-bucket"), "stderr: {stderr}");
}

#[test]
fn test_rust_log_overrides_debug_flag() {
    let data = dataset();
    let config = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_s3up"))
        .args([
            "--debug",
            "--no-progress",
            "upload",
            data.path().to_str().unwrap(),
            "--bucket",
            "my-bucket",
            "--dry-run",
        ])
        .env("S3UP_CONFIG_DIR", config.path())
        .env_remove("S3UP_BUCKET")
        .env_remove("S3UP_PREFIX")
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute s3up");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("DEBUG"), "stderr: {stderr}");
    assert!(!stderr.contains("Starting upload"), "stderr: {stderr}");
}
