// Integration tests for `tabula replay` and `tabula kinds`.
//
// Run with: cargo test -p tabula-cli --test replay_cli -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Every run gets its own settings file so nothing is read from or written
/// to the user config directory.
fn tabula(dir: &Path) -> Command {
    let config = dir.join("settings.json");
    if !config.exists() {
        std::fs::write(&config, "{}").unwrap();
    }
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabula"));
    cmd.current_dir(dir);
    cmd.env_remove("TABULA_LOG");
    cmd.arg("--config").arg(config);
    cmd
}

fn write_script(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const RENAME: &str = r#"{"op":"invoke","actions":[{"sheet_id":1,"kind":"set_sheet_name","name":"Budget"}]}"#;
const FREEZE: &str = r#"{"op":"invoke","label":"Freeze","actions":[{"sheet_id":1,"kind":"set_frozen_rows","count":3},{"sheet_id":1,"kind":"set_frozen_columns","count":2}]}"#;
const BAD_FREEZE: &str = r#"{"op":"invoke","actions":[{"sheet_id":1,"kind":"set_frozen_rows","count":-1}]}"#;
const UNDO: &str = r#"{"op":"undo"}"#;
const REDO: &str = r#"{"op":"redo"}"#;

// ===========================================================================
// tabula replay --json
// ===========================================================================

#[test]
fn replay_json_report_shape() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "s.jsonl", &[RENAME, FREEZE, UNDO, UNDO, REDO]);

    let output = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "--json"])
        .output()
        .expect("tabula replay --json");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["steps"], 5);
    assert_eq!(report["invoked"], 2);
    assert_eq!(report["undone"], 2);
    assert_eq!(report["redone"], 1);
    assert_eq!(report["rejected"], 0);
    assert_eq!(report["can_undo"], true);
    assert_eq!(report["can_redo"], true);
    assert!(report["fingerprint"].as_str().unwrap().starts_with("v1:5:"));
}

#[test]
fn replay_writes_workbook_and_resumes_from_it() {
    let dir = TempDir::new().unwrap();
    let first = write_script(&dir, "a.jsonl", &[RENAME, FREEZE]);
    let book = dir.path().join("book.json");

    let output = tabula(dir.path())
        .args(["replay", first.to_str().unwrap(), "-q", "-o", book.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&book).unwrap()).unwrap();
    assert_eq!(saved["sheets"][0]["name"], "Budget");
    assert_eq!(saved["sheets"][0]["frozen_rows"], 3);

    // History does not persist: undo on a resumed workbook finds nothing.
    let second = write_script(&dir, "b.jsonl", &[UNDO]);
    let output = tabula(dir.path())
        .args(["replay", second.to_str().unwrap(), "--workbook", book.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["empty_history"], 1);
}

#[test]
fn fingerprint_depends_on_end_state() {
    let dir = TempDir::new().unwrap();
    let a = write_script(&dir, "a.jsonl", &[RENAME, UNDO, REDO]);
    let b = write_script(&dir, "b.jsonl", &[FREEZE, UNDO, REDO]);

    let run = |script: &Path| {
        let output = tabula(dir.path())
            .args(["replay", script.to_str().unwrap(), "--fingerprint"])
            .output()
            .unwrap();
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    };

    let (fa, fb) = (run(&a), run(&b));
    assert!(fa.starts_with("v1:3:"), "{}", fa);
    assert_ne!(fa, fb);
    assert_eq!(fa, run(&a), "fingerprint must be deterministic");
}

#[test]
fn expect_checks_the_final_fingerprint() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "s.jsonl", &[RENAME, FREEZE]);

    let output = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "--fingerprint"])
        .output()
        .unwrap();
    let recorded = String::from_utf8(output.stdout).unwrap().trim().to_string();

    let matching = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "-q", "--expect", &recorded])
        .output()
        .unwrap();
    assert!(matching.status.success(), "stderr: {}", stderr(&matching));

    let other = write_script(&dir, "t.jsonl", &[RENAME]);
    let mismatch = tabula(dir.path())
        .args(["replay", other.to_str().unwrap(), "-q", "--expect", &recorded])
        .output()
        .unwrap();
    assert_eq!(mismatch.status.code(), Some(33));
    assert!(stderr(&mismatch).contains("fingerprint mismatch"));

    let malformed = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "--expect", "v1:nope"])
        .output()
        .unwrap();
    assert_eq!(malformed.status.code(), Some(2));

    let wide = format!("v1:2:a{}b", "é".repeat(15));
    let non_hex = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "--expect", &wide])
        .output()
        .unwrap();
    assert_eq!(non_hex.status.code(), Some(2), "stderr: {}", stderr(&non_hex));
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn parse_error_exits_30() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "bad.jsonl", &[RENAME, r#"{"op":"explode"}"#]);

    let output = tabula(dir.path()).args(["replay", script.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(30));
    assert!(stderr(&output).contains("line 2"), "stderr: {}", stderr(&output));
}

#[test]
fn rejection_is_counted_unless_strict() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "s.jsonl", &[BAD_FREEZE, RENAME]);

    let output = tabula(dir.path()).args(["replay", script.to_str().unwrap(), "--json"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rejected"], 1);
    assert_eq!(report["invoked"], 1);

    let output = tabula(dir.path()).args(["replay", script.to_str().unwrap(), "--strict"]).output().unwrap();
    assert_eq!(output.status.code(), Some(31));
}

#[test]
fn strict_from_settings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{\n  // strict everywhere\n  \"replay.strict\": true\n}").unwrap();
    let script = write_script(&dir, "s.jsonl", &[BAD_FREEZE]);

    let output = tabula(dir.path()).args(["replay", script.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(31));
}

#[test]
fn dropped_entry_exits_32_under_strict() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "s.jsonl",
        &[
            r#"{"op":"add_sheet","name":"Data"}"#,
            r#"{"op":"invoke","actions":[{"sheet_id":2,"kind":"set_sheet_name","name":"Numbers"}]}"#,
            r#"{"op":"delete_sheet","sheet_id":2}"#,
            UNDO,
        ],
    );

    let output = tabula(dir.path()).args(["replay", script.to_str().unwrap(), "--strict"]).output().unwrap();
    assert_eq!(output.status.code(), Some(32));
}

#[test]
fn missing_script_exits_3() {
    let dir = TempDir::new().unwrap();
    let output = tabula(dir.path()).args(["replay", "nope.jsonl"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn max_history_zero_keeps_nothing() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "s.jsonl", &[RENAME, UNDO]);

    let output = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "--json", "--max-history", "0"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["undone"], 0);
    assert_eq!(report["empty_history"], 1);
}

#[test]
fn json_and_fingerprint_conflict_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "s.jsonl", &[RENAME]);
    let output = tabula(dir.path())
        .args(["replay", script.to_str().unwrap(), "--json", "--fingerprint"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// tabula kinds
// ===========================================================================

#[test]
fn kinds_lists_every_action_kind() {
    let dir = TempDir::new().unwrap();
    let output = tabula(dir.path()).args(["kinds", "--json"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let kinds: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = kinds.as_array().unwrap().iter().map(|k| k["kind"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "set_sheet_name",
            "set_frozen_rows",
            "set_frozen_columns",
            "set_range_style",
            "set_border",
            "add_merges",
            "remove_merges",
        ]
    );
}
