use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn seedpaint(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seedpaint"))
        .env("SEEDPAINT_CONFIG_DIR", root.join("config"))
        .env("SEEDPAINT_DATA_DIR", root.join("data"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run seedpaint")
}

fn config_json(root: &Path, args: &[&str]) -> Value {
    let output = seedpaint(root, args);
    assert!(
        output.status.success(),
        "seedpaint failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("config output is JSON")
}

#[test]
fn config_for_seed_42_is_pinned() {
    let root = TempDir::new().unwrap();
    let config = config_json(root.path(), &["config", "--seed", "42"]);

    assert_eq!(config["seedName"], "42");
    assert_eq!(config["backgroundSrc"], "maps/pattern-01.jpg");
    assert_eq!(config["pointilism"].as_f64(), Some(0.017185490054868188));
    assert_eq!(config["noiseScalar"][0].as_f64(), Some(1e-6));
    assert_eq!(config["noiseScalar"][1].as_f64(), Some(0.001749570442014146));
    assert_eq!(config["startArea"].as_f64(), Some(1.3840317641390085));
    assert_eq!(config["maxRadius"].as_f64(), Some(79.75820851696913));
    assert_eq!(config["lineStyle"], "round");
    assert_eq!(config["interval"].as_f64(), Some(0.006668332565613198));
    assert_eq!(
        config["palette"],
        serde_json::json!(["#c7f464", "#ff6b6b", "#556270", "#c44d58", "#4ecdc4"])
    );
    assert_eq!(config["steps"], 8000);
    assert_eq!(config["endlessBrowser"], true);
}

#[test]
fn same_seed_prints_identical_config() {
    let root = TempDir::new().unwrap();
    let first = config_json(root.path(), &["config", "--seed", "repeatable"]);
    let second = config_json(root.path(), &["config", "--seed", "repeatable"]);
    assert_eq!(first, second);
}

#[test]
fn settings_file_overrides_undrawn_fields_only() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("seedpaint.toml"),
        "version = 1\n\n[sketch]\nsteps = 120\nendless = false\nwidth = 1280\nheight = 720\n",
    )
    .unwrap();

    let config = config_json(root.path(), &["config", "--seed", "42"]);
    assert_eq!(config["steps"], 120);
    assert_eq!(config["endlessBrowser"], false);
    assert_eq!(config["width"], 1280);
    assert_eq!(config["height"], 720);
    assert_eq!(config["pointilism"].as_f64(), Some(0.017185490054868188));
    assert_eq!(config["backgroundSrc"], "maps/pattern-01.jpg");
}

#[test]
fn invalid_settings_fail_with_context() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("seedpaint.toml"), "version = 2\n").unwrap();

    let output = seedpaint(root.path(), &["config", "--seed", "42"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load settings"), "{stderr}");
}

#[test]
fn paths_reports_env_overrides() {
    let root = TempDir::new().unwrap();
    let output = seedpaint(root.path(), &["paths"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&root.path().join("config").display().to_string()));
    assert!(stdout.contains(&root.path().join("data").display().to_string()));
}

#[test]
fn bounded_run_survives_missing_images() {
    let root = TempDir::new().unwrap();
    let output = seedpaint(
        root.path(),
        &["--seed", "42", "--duration", "200ms", "--fps", "120"],
    );
    assert!(
        output.status.success(),
        "seedpaint run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
