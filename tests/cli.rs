use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn colsweep() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("colsweep"));
    cmd.env_remove("COLSWEEP_WORKBOOK")
        .env_remove("COLSWEEP_COLUMN_HEADER");
    cmd
}

/// Repository with two SQL files and a workbook with two scan sheets
fn scan_fixture(root: &Path) {
    write_file(
        &root.join("repo/sql/orders.sql"),
        "SELECT [order_id], Status\nFROM orders\nWHERE order_id > 10 AND order_id_old IS NULL",
    );
    write_file(
        &root.join("repo/sql/users.sql"),
        "select \"user_id\", username from users",
    );
    write_file(&root.join("book/orders.csv"), "Column Name\norder_id\nstatus\n");
    write_file(&root.join("book/users.csv"), "Column Name\nuser_id\n\n");
}

#[test]
fn scan_counts_identifiers_per_file() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let scans: Vec<_> = items.iter().filter(|i| i["kind"] == "scan").collect();
    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0]["path"], "sql/orders.sql");
    assert_eq!(
        scans[0]["data"],
        json!({"orders": {"order_id": 2, "status": 1}, "users": {}})
    );
    assert_eq!(scans[1]["path"], "sql/users.sql");
    assert_eq!(
        scans[1]["data"],
        json!({"orders": {}, "users": {"user_id": 1}})
    );

    let summary = items.last().unwrap();
    assert_eq!(summary["kind"], "sheet");
    assert_eq!(summary["label"], "result");
    assert!(summary["meta"]["generated_at"].is_string());
}

#[test]
fn scan_writes_result_sheet() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join("book/result.csv")).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("file_name,orders,users"));
    assert_eq!(
        lines.next(),
        Some(r#"sql/orders.sql,"{""order_id"":2,""status"":1}",{}"#)
    );
    assert_eq!(
        lines.next(),
        Some(r#"sql/users.sql,{},"{""user_id"":1}""#)
    );

    // A second run skips the result sheet and rewrites it
    colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(temp.path().join("book/result.csv")).unwrap(),
        written
    );
}

#[test]
fn scan_no_write_and_sheet_selection() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--sheet")
        .arg("users")
        .arg("--no-write")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["data"], json!({"users": {"user_id": 1}}));
    assert!(!temp.path().join("book/result.csv").exists());
}

#[test]
fn scan_reads_workbook_from_env() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    let assert = colsweep()
        .env("COLSWEEP_WORKBOOK", temp.path().join("book"))
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--no-write")
        .assert()
        .success();

    assert_eq!(parse_jsonl(&assert.get_output().stdout).len(), 2);
}

#[test]
fn scan_unknown_sheet_emits_error_item() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--sheet")
        .arg("missing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "error");
    assert_eq!(items[0]["errors"][0]["code"], "UNKNOWN_SHEET");
}

#[test]
fn scan_undecodable_file_fails_without_writing() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());
    fs::write(temp.path().join("repo/sql/latin1.sql"), b"select caf\xe9").unwrap();

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .failure();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items[0]["errors"][0]["code"], "DECODE_FAILED");
    assert!(!temp.path().join("book/result.csv").exists());
}

#[test]
fn scan_walks_hidden_and_ignored_files_unless_filtered() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("repo/.gitignore"), "build/\n");
    write_file(&temp.path().join("repo/a.sql"), "select id from t");
    write_file(&temp.path().join("repo/.archive/old.sql"), "select id from t");
    write_file(&temp.path().join("repo/build/gen.sql"), "select id from t");
    write_file(&temp.path().join("book/ids.csv"), "Column Name\nid\n");

    let paths = |extra: &[&str]| -> Vec<String> {
        let assert = colsweep()
            .arg("--root")
            .arg(temp.path().join("repo"))
            .arg("scan")
            .arg("--workbook")
            .arg(temp.path().join("book"))
            .arg("--no-write")
            .args(extra)
            .assert()
            .success();
        parse_jsonl(&assert.get_output().stdout)
            .iter()
            .filter_map(|i| i["path"].as_str().map(str::to_string))
            .collect()
    };

    assert_eq!(paths(&[]), vec![".archive/old.sql", "a.sql", "build/gen.sql"]);
    assert_eq!(paths(&["--skip-hidden"]), vec!["a.sql", "build/gen.sql"]);
    assert_eq!(paths(&["--respect-ignore"]), vec![".archive/old.sql", "a.sql"]);
}

#[test]
fn scan_custom_column_header() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("repo/a.sql"), "select col_a from t");
    write_file(&temp.path().join("book/t.csv"), "Field\ncol_a\n");

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--column-header")
        .arg("Field")
        .arg("--no-write")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items[0]["data"], json!({"t": {"col_a": 1}}));
}

#[test]
fn scan_markdown_output() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("--format")
        .arg("md")
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--no-write")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Column Occurrences"))
        .stdout(predicate::str::contains("### `sql/orders.sql`"))
        .stdout(predicate::str::contains("- **orders**: order_id ×2, status ×1"))
        .stdout(predicate::str::contains("- **users**: none"));
}

#[test]
fn sheets_lists_workbook_sheets() {
    let temp = tempdir().unwrap();
    scan_fixture(temp.path());

    let assert = colsweep()
        .arg("sheets")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let labels: Vec<_> = items.iter().map(|i| i["label"].clone()).collect();
    assert_eq!(labels, vec![json!("orders"), json!("users")]);
    assert_eq!(items[0]["data"]["rows"], 2);
}

#[test]
fn sheets_rejects_missing_workbook() {
    let temp = tempdir().unwrap();

    let assert = colsweep()
        .arg("sheets")
        .arg("--workbook")
        .arg(temp.path().join("nope"))
        .assert()
        .failure();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items[0]["errors"][0]["code"], "INVALID_INPUT");
}

/// Repository with one SQL file and a rename sheet for it
fn rename_fixture(root: &Path) {
    write_file(
        &root.join("repo/users.sql"),
        "SELECT [user_id], username FROM users WHERE user_id = 5\n",
    );
    write_file(
        &root.join("book/changes.csv"),
        "Change Type,Search Key,Renamed objects,File\n\
COL RENAME,user_id,account_id,users.sql\n\
TABLE DROP,users,,\n\
COL RENAME,username,login,users.sql\n",
    );
}

#[test]
fn rename_rewrites_files_in_order() {
    let temp = tempdir().unwrap();
    rename_fixture(temp.path());

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("rename")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(
        fs::read_to_string(temp.path().join("repo/users.sql")).unwrap(),
        "SELECT [account_id], login FROM users WHERE account_id = 5\n"
    );

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "rename");
    assert_eq!(items[0]["path"], "users.sql");
    assert_eq!(items[0]["label"], "changes");
    assert_eq!(items[0]["data"]["replacements"], 2);
    assert_eq!(items[0]["meta"]["changed"], true);
    assert_eq!(items[1]["data"]["old"], "username");
}

#[test]
fn rename_dry_run_leaves_files() {
    let temp = tempdir().unwrap();
    rename_fixture(temp.path());
    let before = fs::read_to_string(temp.path().join("repo/users.sql")).unwrap();

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("rename")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--dry-run")
        .assert()
        .success()
        .stderr(predicate::str::contains("Dry run"));
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(
        fs::read_to_string(temp.path().join("repo/users.sql")).unwrap(),
        before
    );
    assert_eq!(items[0]["data"]["dry_run"], true);
    assert_eq!(items[1]["data"]["replacements"], 1);
}

#[test]
fn rename_then_scan_round_trip() {
    let temp = tempdir().unwrap();
    rename_fixture(temp.path());
    write_file(&temp.path().join("book/users.csv"), "Column Name\nuser_id\naccount_id\n");

    colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("rename")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--sheet")
        .arg("changes")
        .assert()
        .success();

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("scan")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--sheet")
        .arg("users")
        .arg("--no-write")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items[0]["data"], json!({"users": {"account_id": 2}}));
}

#[test]
fn rename_reports_row_with_empty_cell() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("repo/a.sql"), "select a");
    write_file(
        &temp.path().join("book/changes.csv"),
        "Change Type,Search Key,Renamed objects,File\nCOL RENAME,a,,a.sql\n",
    );

    let assert = colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("rename")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .assert()
        .failure();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items[0]["errors"][0]["code"], "INVALID_INPUT");
    let message = items[0]["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("row 2"));
    assert_eq!(
        fs::read_to_string(temp.path().join("repo/a.sql")).unwrap(),
        "select a"
    );
}

#[test]
fn rename_push_requires_branch_flags() {
    let temp = tempdir().unwrap();
    rename_fixture(temp.path());

    colsweep()
        .arg("--root")
        .arg(temp.path().join("repo"))
        .arg("rename")
        .arg("--workbook")
        .arg(temp.path().join("book"))
        .arg("--push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--default-branch"));
}

#[test]
fn invalid_format_is_rejected() {
    colsweep()
        .arg("--format")
        .arg("raw")
        .arg("doctor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn doctor_reports_git() {
    let assert = colsweep().arg("doctor").assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "check");
    assert!(items[0]["excerpt"].as_str().unwrap().contains("git"));
}
