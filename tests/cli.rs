//! Command-line behaviour of the `conf-ts` binary

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(path)
}

fn run(args: &[&str], file: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_conf-ts"))
        .arg(fixture(file))
        .args(args)
        .env("CONF_TS_EXISTS", "from-cli")
        .env_remove("CONF_TS_MISSING")
        .output()
        .unwrap()
}

#[test]
fn test_prints_json_by_default() {
    let output = run(&[], "key_order/main.ts");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("{\n  \"2\": \"two\","), "{stdout}");
}

#[test]
fn test_yaml_with_macros_from_process_env() {
    let output = run(&["--format", "yaml", "--macro"], "macros/main.ts");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("exists: from-cli\nmissing: default\n"), "{stdout}");
}

#[test]
fn test_failure_exits_with_error_message() {
    let output = run(&[], "macros/main.ts");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("env"), "{stderr}");
}

#[test]
fn test_deps_are_listed_on_stderr() {
    let output = run(&["--deps"], "multi_file/main.ts");
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let deps: Vec<&str> = stderr.lines().collect();
    assert_eq!(deps.len(), 3, "{stderr}");
    assert!(deps[0].ends_with("main.ts"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let output = run(&["--format", "xml"], "key_order/main.ts");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: Unsupported format: xml"), "{stderr}");
}
