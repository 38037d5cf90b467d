//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a taller command isolated from the caller's environment
pub fn taller() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("taller"));
    cmd.env_remove("TALLER_SHOP")
        .env_remove("TALLER_AUTHOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test shop in a temp directory
pub fn setup_test_shop() -> TempDir {
    let tmp = TempDir::new().unwrap();
    taller().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to register a repair, returning its full id
pub fn create_test_repair(tmp: &TempDir, customer: &str, device: &str, problem: &str) -> String {
    let output = taller()
        .current_dir(tmp.path())
        .args([
            "repair", "new", "--customer", customer, "--device", device, "--problem", problem,
        ])
        .output()
        .unwrap();

    find_token(&String::from_utf8_lossy(&output.stdout), "REP-")
}

/// Helper to add a customer, returning its full id
pub fn create_test_customer(tmp: &TempDir, name: &str, phone: &str) -> String {
    let output = taller()
        .current_dir(tmp.path())
        .args(["-o", "id", "customer", "new", "--name", name, "--phone", phone])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Path of a repair document inside the shop
pub fn repair_path(tmp: &TempDir, id: &str) -> PathBuf {
    tmp.path().join("repairs").join(format!("{}.taller.yaml", id))
}

/// Rewrite the first line of a document whose trimmed text starts with `key:`
pub fn replace_line(path: &PathBuf, key: &str, value: &str) {
    let content = std::fs::read_to_string(path).unwrap();
    let mut replaced = false;
    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if !replaced && trimmed.starts_with(&format!("{}:", key)) {
                replaced = true;
                let indent = &line[..line.len() - trimmed.len()];
                format!("{}{}: {}", indent, key, value)
            } else {
                line.to_string()
            }
        })
        .collect();
    assert!(replaced, "no '{}' line in {}", key, path.display());
    std::fs::write(path, lines.join("\n") + "\n").unwrap();
}

fn find_token(stdout: &str, prefix: &str) -> String {
    stdout
        .split_whitespace()
        .find(|w| w.starts_with(prefix))
        .map(|s| s.to_string())
        .unwrap_or_default()
}
