//! Integration tests for the `secureauth` CLI binary.
//!
//! These run the CLI as a subprocess and check exit codes and output. None
//! of them needs a running server; server commands are pointed at a closed
//! port to exercise the error path.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::Command;

/// Helper: locate the `secureauth` binary built by `cargo test`.
fn secureauth_bin() -> String {
    let path = env!("CARGO_BIN_EXE_secureauth");
    assert!(
        Path::new(path).exists(),
        "secureauth binary not found at {path}"
    );
    path.to_owned()
}

/// Helper: run secureauth with args and return (`exit_code`, stdout, stderr).
fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(secureauth_bin())
        .args(args)
        .env("SECUREAUTH_ADDR", "http://127.0.0.1:19999") // Non-existent server
        .env_remove("SECUREAUTH_PUBLIC_URL")
        .env_remove("SECUREAUTH_PASSWORD")
        .output()
        .expect("failed to execute secureauth");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("secureauth"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0);
    for cmd in [
        "validate", "link", "callback", "outcome", "logs", "login", "signup", "session",
    ] {
        assert!(stdout.contains(cmd), "help should list '{cmd}'");
    }
}

// ── validate ─────────────────────────────────────────────────────────

#[test]
fn test_validate_full_url() {
    let (code, stdout, _) = run(&[
        "validate",
        "https://secureauth.ir/incoming?role=admin&website=https://panel.company.ir&name=Fatemeh",
    ]);
    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("valid redirect"));
    assert!(stdout.contains("Fatemeh"));
}

#[test]
fn test_validate_invalid_query_exits_one() {
    let (code, stdout, _) = run(&["validate", "role=superuser&website=localhost"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("invalid redirect"));
    assert!(stdout.contains(r#"role "superuser" is not valid"#));
    assert!(stdout.contains(r#"website format "localhost" is not valid"#));
}

#[test]
fn test_validate_json_output() {
    let (code, stdout, _) = run(&["validate", "--json", "?website=example.com"]);
    assert_eq!(code, 1);
    let verdict: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(verdict["isValid"], false);
    assert_eq!(verdict["errors"][0], "role parameter is required.");
    assert_eq!(verdict["data"]["website"], "example.com");
}

#[test]
fn test_validate_file_with_one_bad_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.txt");
    fs::write(
        &path,
        "# partner links\n\
         role=visitor&website=example.com\n\
         \n\
         role=user&website=shop.example.ir\n\
         role=admin&website=a.b.c.example.com\n",
    )
    .unwrap();

    let (code, stdout, _) = run(&["validate", "--json", "--file", path.to_str().unwrap()]);
    assert_eq!(code, 1);
    let valid: Vec<bool> = stdout
        .lines()
        .map(|line| {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            v["isValid"].as_bool().unwrap()
        })
        .collect();
    assert_eq!(valid, [true, true, false]);
}

#[test]
fn test_validate_without_input_fails() {
    let (code, _, stderr) = run(&["validate"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nothing to validate"));
}

// ── link / callback / outcome ────────────────────────────────────────

#[test]
fn test_link_builds_incoming_url() {
    let (code, stdout, _) = run(&[
        "link",
        "--role",
        "user",
        "--website",
        "shop.domain.ir",
        "--name",
        "Ali Reza",
        "--base-url",
        "https://auth.example.com",
    ]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout.trim(),
        "https://auth.example.com/incoming?role=user&website=shop.domain.ir&name=Ali+Reza"
    );
}

#[test]
fn test_link_requires_website() {
    let (code, stdout, stderr) = run(&["link", "--role", "user"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("website is required"));
}

#[test]
fn test_callback_url() {
    let (code, stdout, _) = run(&["callback", "--website", "http://shop.ir", "--name", "Sara"]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout.trim(),
        "https://shop.ir/auth-callback?token=JWT_TOKEN&status=success&user=Sara"
    );
}

#[test]
fn test_outcome_success_and_failure() {
    let (code, stdout, _) = run(&[
        "outcome",
        "https://shop.ir/auth-callback?token=abc&status=success",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("abc"));

    let (code, stdout, _) = run(&["outcome", "status=success&token="]);
    assert_eq!(code, 1);
    assert!(stdout.contains("sign-in failed"));
}

// ── Server commands ──────────────────────────────────────────────────

#[test]
fn test_logs_without_server_fails() {
    let (code, _, stderr) = run(&["logs"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("request to http://127.0.0.1:19999 failed"));
}

#[test]
fn test_login_requires_password() {
    let (code, _, stderr) = run(&["login", "--email", "a@b.co"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--password"));
}
