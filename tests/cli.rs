//! Exit codes of the command-line front end for inputs rejected before the
//! interpreter starts.

use std::process::Command;

fn maskrect() -> Command {
    Command::new(env!("CARGO_BIN_EXE_maskrect"))
}

#[test]
fn help_exits_zero() {
    let output = maskrect().arg("--help").output().expect("binary runs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--no-interaction"));
    assert!(stdout.contains("--save-file"));
}

#[test]
fn missing_input_file_exits_one() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let missing = dir.path().join("missing.jpg");
    let output = maskrect()
        .args(["--no-interaction", "--input"])
        .arg(&missing)
        .output()
        .expect("binary runs");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input file not found"), "{}", stderr);
    assert!(!dir.path().join("output.jpg").exists());
}

#[test]
fn no_interaction_without_input_exits_one() {
    let output = maskrect().arg("-n").output().expect("binary runs");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn save_file_without_no_interaction_exits_one() {
    let output = maskrect()
        .args(["--save-file", "--input", "image.jpg"])
        .output()
        .expect("binary runs");
    assert_eq!(output.status.code(), Some(1));
}
