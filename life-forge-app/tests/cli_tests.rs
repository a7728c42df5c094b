use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::fs;
use std::process::Command; // Run programs
use tempfile::tempdir; // Create temporary directories for testing

fn life_forge() -> Command {
    let mut cmd = Command::cargo_bin("life-forge").expect("binary should be built");
    // Keep the environment from leaking settings into the tests.
    for (key, _) in std::env::vars() {
        if key.starts_with("LIFE_FORGE_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

#[test]
fn test_help_lists_settings() {
    life_forge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--width"))
        .stdout(predicate::str::contains("--workgroup-size"))
        .stdout(predicate::str::contains("--headless"));
}

#[test]
fn test_zero_width_rejected() {
    life_forge()
        .args(["--headless", "--width", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid grid dimensions 0x32"));
}

#[test]
fn test_probability_out_of_range_rejected() {
    life_forge()
        .args(["--headless", "--probability", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid live-cell probability 1.5"));
}

#[test]
fn test_zero_workgroup_size_rejected() {
    life_forge()
        .args(["--headless", "--workgroup-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workgroup_size must be positive"));
}

#[test]
fn test_env_setting_rejected() {
    life_forge()
        .env("LIFE_FORGE_HEIGHT", "0")
        .arg("--headless")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid grid dimensions 32x0"));
}

#[test]
fn test_config_file_settings_validated() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let path = tmp_dir.path().join("life.toml");
    fs::write(&path, "width = 16\nprobability = -0.1\n")?;

    life_forge()
        .arg("--config")
        .arg(&path)
        .arg("--headless")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid live-cell probability -0.1"));
    Ok(())
}

#[test]
fn test_missing_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    life_forge()
        .arg("--config")
        .arg(tmp_dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn test_headless_run() -> Result<(), Box<dyn std::error::Error>> {
    let output = life_forge()
        .env("RUST_LOG", "info")
        .args([
            "--headless",
            "--width",
            "8",
            "--height",
            "8",
            "--seed",
            "1",
            "--steps",
            "3",
            "--visualize",
        ])
        .output()?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        if stderr.contains("GPU capability unavailable") || stderr.contains("GPU device") {
            eprintln!("Skipping GPU test: {}", stderr);
            return Ok(());
        }
        panic!("headless run failed: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- step 3 | 8x8 |"), "stdout: {stdout}");
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 8);
    assert!(rows
        .iter()
        .all(|row| row.len() == 8 && row.chars().all(|c| c == '#' || c == '.')));
    assert!(stderr.contains("Completed 3 steps"));
    Ok(())
}
