use std::process::Command;

/// Integration tests for the forksync CLI
/// These tests run the actual binary and verify its surface

#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Verify help contains expected commands
    assert!(stdout.contains("fork"));
    assert!(stdout.contains("sync"));
    assert!(stdout.contains("auth"));
}

#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("forksync"));
}

#[test]
fn test_fork_requires_url_argument() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--", "fork"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("URL") || stderr.contains("url"));
}
