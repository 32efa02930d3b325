//! CLI integration tests: run the cgtool binary against unit files.
//! Uses CARGO_BIN_EXE_cgtool when set (e.g. by `cargo test`).

use std::process::Command;

const SHAPES_UNIT: &str = "tests/fixtures/shapes_unit.json";

fn bin() -> Option<std::path::PathBuf> {
    std::env::var_os("CARGO_BIN_EXE_cgtool").map(std::path::PathBuf::from)
}

#[test]
fn test_cli_help_succeeds() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(bin)
        .arg("--help")
        .output()
        .expect("run --help");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("cgtool"));
    assert!(stdout.contains("dump"));
}

#[test]
fn test_cli_load_error_when_file_missing() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(&bin)
        .args(["nonexistent_unit_12345.json", "stats"])
        .output()
        .expect("run stats with missing file");
    assert!(!out.status.success(), "expected failure when unit file missing");
}

#[test]
fn test_cli_rejects_dangling_reference() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{ "name": "bad.c", "decls": [ { "id": 0, "kind": "function", "name": "f", "children": [4] } ], "top_level": [0] }"#,
    )
    .expect("write unit");

    let out = Command::new(&bin)
        .arg(&path)
        .arg("dump")
        .output()
        .expect("run dump");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown declaration 4"), "stderr: {stderr}");
}

#[test]
fn test_cli_dump_prints_graph() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(&bin)
        .args([SHAPES_UNIT, "dump"])
        .output()
        .expect("run dump");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with(" --- Call graph Dump --- "));
    assert!(stdout.contains("  Function: < root > calls: "));
    assert!(stdout.contains("  Function: main calls: < > apply "));
}

#[test]
fn test_cli_heuristic_flag_removes_pointer_edge() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(&bin)
        .args([SHAPES_UNIT, "--no-fn-ptr-heuristic", "callees", "apply"])
        .output()
        .expect("run callees");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[shapes.m] apply"));
    assert!(!stdout.contains("calls:"), "stdout: {stdout}");
}

#[test]
fn test_cli_callees_not_found() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(&bin)
        .args([SHAPES_UNIT, "callees", "nonexistent_function_xyz"])
        .output()
        .expect("run callees");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_cli_json_is_parseable() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(&bin)
        .args([SHAPES_UNIT, "json"])
        .output()
        .expect("run json");
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid JSON");
    assert_eq!(value["units"][0]["unit"], "shapes.m");
}

#[test]
fn test_cli_dot_output() {
    let Some(bin) = bin() else {
        eprintln!("Skipping CLI test: CARGO_BIN_EXE not set");
        return;
    };
    let out = Command::new(&bin)
        .args([SHAPES_UNIT, "dot"])
        .output()
        .expect("run dot");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("digraph {"));
}
