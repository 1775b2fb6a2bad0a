//! CLI integration tests
//!
//! These tests run the compiled binary and check:
//! - Help and version output
//! - Argument validation and exit codes
//! - That a rejected request leaves the filesystem untouched

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the apkforge binary
fn apkforge_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // Test binaries live in deps/
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join(format!("apkforge{}", env::consts::EXE_SUFFIX))
}

/// Runs the binary with an isolated toolset and work directory
fn apkforge(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(apkforge_bin())
        .args(args)
        .env("APKFORGE_HOME", temp_dir.path().join("toolset"))
        .env("APKFORGE_WORK_DIR", temp_dir.path().join("work"))
        .env_remove("APKFORGE_CATALOGUE")
        .env_remove("APKFORGE_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute apkforge")
}

#[test]
fn test_cli_help() {
    let temp_dir = TempDir::new().unwrap();
    let output = apkforge(&temp_dir, &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("apkforge"));
    assert!(stdout.contains("install"));
    assert!(stdout.contains("update"));
    assert!(stdout.contains("compact-install"));
    assert!(stdout.contains("decompile"));
}

#[test]
fn test_cli_version() {
    let temp_dir = TempDir::new().unwrap();
    let output = apkforge(&temp_dir, &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_decompile_help_lists_decompilers() {
    let temp_dir = TempDir::new().unwrap();
    let output = apkforge(&temp_dir, &["decompile", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["cfr", "fernflower", "jadx", "jdcmd", "procyon", "jeb3"] {
        assert!(stdout.contains(name), "missing {} in help", name);
    }
}

#[test]
fn test_unknown_decompiler_is_a_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let output = apkforge(
        &temp_dir,
        &["decompile", "dad", "app.apk", output_dir.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(!output_dir.exists());
}

#[test]
fn test_missing_arguments_is_a_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = apkforge(&temp_dir, &["decompile", "jadx"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_nonexistent_package_fails_without_side_effects() {
    let temp_dir = TempDir::new().unwrap();
    let package = temp_dir.path().join("missing.apk");
    let output_dir = temp_dir.path().join("out");

    let output = apkforge(
        &temp_dir,
        &[
            "decompile",
            "JADX",
            package.to_str().unwrap(),
            output_dir.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Package does not exist"));
    assert!(stderr.contains("see the output of the tools above"));
    assert!(!output_dir.exists());
    assert!(!temp_dir.path().join("work").exists());
}

#[test]
fn test_output_that_is_a_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let package = temp_dir.path().join("app.apk");
    fs::write(&package, b"PK").unwrap();
    let output_file = temp_dir.path().join("out.txt");
    fs::write(&output_file, "occupied").unwrap();

    let output = apkforge(
        &temp_dir,
        &[
            "decompile",
            "cfr",
            package.to_str().unwrap(),
            output_file.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fs::read_to_string(&output_file).unwrap(), "occupied");
}

#[test]
fn test_invalid_catalogue_fails() {
    let temp_dir = TempDir::new().unwrap();
    let catalogue = temp_dir.path().join("tools.toml");
    fs::write(&catalogue, "[[tool]]\nname = \"\"\n").unwrap();

    let output = Command::new(apkforge_bin())
        .arg("install")
        .env("APKFORGE_HOME", temp_dir.path().join("toolset"))
        .env("APKFORGE_WORK_DIR", temp_dir.path().join("work"))
        .env("APKFORGE_CATALOGUE", &catalogue)
        .output()
        .expect("Failed to execute apkforge");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not load the tool catalogue"));
    assert!(!temp_dir.path().join("toolset").exists());
}
