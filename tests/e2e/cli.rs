//! Argument handling and exit codes

use super::helpers::pdfdog;

#[test]
fn test_missing_filename_exits_with_one() {
    let output = pdfdog().output().expect("Failed to run pdfdog");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must specify a file name"), "stderr: {stderr}");
}

#[test]
fn test_version_flag() {
    let output = pdfdog().arg("--version").output().expect("Failed to run pdfdog");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "stdout: {stdout}");
}

#[test]
fn test_help_lists_flags() {
    let output = pdfdog().arg("--help").output().expect("Failed to run pdfdog");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["-q", "-l", "--viewer", "--poll-interval", "--config"] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn test_quiet_and_log_conflict() {
    let output = pdfdog()
        .args(["-q", "-l", "doc.pdf"])
        .output()
        .expect("Failed to run pdfdog");
    assert!(!output.status.success());
}

#[test]
fn test_unknown_viewer_fails() {
    let output = pdfdog()
        .args(["--viewer", "/nonexistent/pdfdog-viewer", "doc.pdf"])
        .output()
        .expect("Failed to run pdfdog");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot determine a viewer"), "stderr: {stderr}");
}

#[test]
fn test_missing_config_file_fails() {
    let output = pdfdog()
        .args(["--config", "/nonexistent/pdfdog.toml", "doc.pdf"])
        .output()
        .expect("Failed to run pdfdog");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_zero_poll_interval_fails() {
    let output = pdfdog()
        .args(["--poll-interval", "0", "doc.pdf"])
        .output()
        .expect("Failed to run pdfdog");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("poll interval"), "stderr: {stderr}");
}
