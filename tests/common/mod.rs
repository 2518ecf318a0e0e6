//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get an o360 command
pub fn o360() -> Command {
    Command::new(cargo::cargo_bin!("o360"))
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    o360()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

fn captured_id(output: std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a sector and return its id
pub fn create_sector(tmp: &TempDir, name: &str) -> String {
    let output = o360()
        .current_dir(tmp.path())
        .args(["sector", "new", name, "--format", "id"])
        .output()
        .unwrap();
    captured_id(output)
}

/// Create an orchard under the given sector and return its id
pub fn create_orchard(tmp: &TempDir, sector: &str, name: &str) -> String {
    let output = o360()
        .current_dir(tmp.path())
        .args(["orchard", "new", name, "--sector", sector, "--format", "id"])
        .output()
        .unwrap();
    captured_id(output)
}

/// Create a block under the given orchard and return its id
pub fn create_block(tmp: &TempDir, orchard: &str, name: &str, variety: &str) -> String {
    let output = o360()
        .current_dir(tmp.path())
        .args([
            "block", "new", name, "--orchard", orchard, "--variety", variety, "--format", "id",
        ])
        .output()
        .unwrap();
    captured_id(output)
}

/// Record an event against the given block and return its id
pub fn create_event(tmp: &TempDir, block: &str, quantity: &str, status: &str) -> String {
    let output = o360()
        .current_dir(tmp.path())
        .args([
            "event", "add", "--block", block, "--quantity", quantity, "--status", status,
            "--format", "id",
        ])
        .output()
        .unwrap();
    captured_id(output)
}
