//! Integration tests for the modhost CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use modhost_test_utils::{ModuleProject, TestHost};
use predicates::prelude::*;

fn modhost_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("modhost"));
    cmd.env_remove("RUST_LOG").env_remove("MODHOST_CONFIG");
    cmd
}

fn sample_host() -> TestHost {
    let host = TestHost::new();
    host.add(ModuleProject::new("org.example.core").activator("modhost.LoggingActivator"));
    host.add(
        ModuleProject::new("org.example.ui")
            .depends_on(&["org.example.core"])
            .extensions("point: org.example.views\nprefix: view\nid: console\nlabel: Console\n"),
    );
    host.add(ModuleProject::new("org.example.orphan").depends_on(&["org.example.missing"]));
    host
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_output() {
    modhost_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("extensions"));
}

#[test]
fn test_missing_subcommand_fails() {
    modhost_cmd().assert().failure();
}

// ============================================================================
// pack
// ============================================================================

#[test]
fn test_pack_writes_archive() {
    let host = TestHost::new();
    let project = ModuleProject::new("org.example.tool").version("0.3");
    let dir = host.project_dir("org.example.tool");
    let artifact = project.write(&dir);
    let out = host.root().join("dist");

    modhost_cmd()
        .arg("pack")
        .arg(&dir)
        .arg(&artifact)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.tool-0.3.0.mpk"));

    assert!(out.join("org.example.tool-0.3.0.mpk").is_file());
}

#[test]
fn test_pack_without_manifest_fails() {
    let host = TestHost::new();
    let dir = host.root().join("empty");
    std::fs::create_dir_all(&dir).unwrap();
    let artifact = dir.join("a.bin");
    std::fs::write(&artifact, "x").unwrap();
    let out = host.root().join("dist");

    modhost_cmd()
        .arg("pack")
        .arg(&dir)
        .arg(&artifact)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("MANIFEST.MF"));

    assert!(!out.exists());
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_shows_states_without_activating() {
    let host = sample_host();

    modhost_cmd()
        .arg("list")
        .arg("--modules-dir")
        .arg(host.modules_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.core"))
        .stdout(predicate::str::contains("provided"))
        .stdout(predicate::str::contains("found"))
        .stdout(predicate::str::contains("activated").not())
        .stderr(predicate::str::contains("org.example.missing"));
}

#[test]
fn test_list_json() {
    let host = sample_host();

    let output = modhost_cmd()
        .args(["list", "--json", "--modules-dir"])
        .arg(host.modules_dir())
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let orphan = rows
        .iter()
        .find(|r| r["symbolic_name"] == "org.example.orphan")
        .unwrap();
    assert_eq!(orphan["state"], "found");
    assert!(orphan["problem"]
        .as_str()
        .unwrap()
        .contains("org.example.missing"));
}

#[test]
fn test_list_uses_config_file() {
    let host = sample_host();
    let config = host.root().join("modhost.toml");
    std::fs::write(&config, "modules_dir = \"modules\"\nlog_filter = \"warn\"\n").unwrap();

    modhost_cmd()
        .arg("list")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example.ui"));
}

#[test]
fn test_missing_config_file_fails() {
    let host = TestHost::new();
    modhost_cmd()
        .arg("list")
        .arg("--config")
        .arg(host.root().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

// ============================================================================
// extensions
// ============================================================================

#[test]
fn test_extensions_lists_contributions() {
    let host = sample_host();

    modhost_cmd()
        .args(["extensions", "org.example.views", "--modules-dir"])
        .arg(host.modules_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("console"))
        .stdout(predicate::str::contains("label = Console"));
}

#[test]
fn test_extensions_unknown_point() {
    let host = sample_host();

    modhost_cmd()
        .args(["extensions", "org.example.nothing", "--modules-dir"])
        .arg(host.modules_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("No contributions"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_starts_and_stops_modules() {
    let host = sample_host();

    modhost_cmd()
        .arg("run")
        .arg("--modules-dir")
        .arg(host.modules_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("started org.example.core"))
        .stdout(predicate::str::contains("started org.example.ui"))
        .stdout(predicate::str::contains("stopped org.example.ui"))
        .stdout(predicate::str::contains("Runtime stopped"))
        .stderr(predicate::str::contains("org.example.missing"));
}

#[test]
fn test_run_with_start_and_stop() {
    let host = sample_host();

    modhost_cmd()
        .arg("run")
        .arg("--modules-dir")
        .arg(host.modules_dir())
        .args(["--start", "org.example.ui", "--stop", "org.example.core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stopped org.example.core"))
        .stderr(predicate::str::contains("still depend on it"));
}

#[test]
fn test_run_unregistered_activator_is_reported() {
    let host = TestHost::new();
    host.add(ModuleProject::new("org.example.native").activator("org.example.NativeActivator"));

    modhost_cmd()
        .arg("run")
        .arg("--modules-dir")
        .arg(host.modules_dir())
        .assert()
        .success()
        .stderr(predicate::str::contains("org.example.NativeActivator"));
}
