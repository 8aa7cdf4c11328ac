//! E2E CLI lifecycle tests: add, edit, check, move, sort, rm, list.
//!
//! Each test runs the `chores` binary as a subprocess against a database in
//! an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the chores binary with its database in `dir`.
fn chores_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chores"));
    cmd.current_dir(dir);
    cmd.env("CHORES_DB", db_path(dir));
    // Keep the user's real config out of the way.
    cmd.env("CHORES_CONFIG", dir.join("no-such-config.toml"));
    cmd.env("CHORES_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn db_path(dir: &Path) -> PathBuf {
    dir.join("data/chores.sqlite3")
}

/// Add an item via CLI, return its key.
fn add_item(dir: &Path, text: &str) -> u64 {
    let output = chores_cmd(dir)
        .args(["add", text, "--json"])
        .output()
        .expect("add should not crash");
    assert!(
        output.status.success(),
        "add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("add --json should produce valid JSON");
    json["item"]["key"]
        .as_u64()
        .expect("add output should have item.key")
}

fn list_json(dir: &Path, extra: &[&str]) -> Value {
    let output = chores_cmd(dir)
        .arg("list")
        .args(extra)
        .arg("--json")
        .output()
        .expect("list should not crash");
    assert!(
        output.status.success(),
        "list failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("list --json should produce valid JSON")
}

fn texts(list: &Value) -> Vec<String> {
    list["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["text"].as_str().expect("text").to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn empty_database_lists_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let list = list_json(dir.path(), &[]);
    assert_eq!(list["items"], Value::Array(vec![]));
    assert_eq!(list["counts"]["total"], 0);
}

#[test]
fn add_puts_newest_first_and_persists() {
    let dir = TempDir::new().expect("temp dir");
    add_item(dir.path(), "buy milk");
    add_item(dir.path(), "walk dog");

    let list = list_json(dir.path(), &[]);
    assert_eq!(texts(&list), ["walk dog", "buy milk"]);
    assert_eq!(list["items"][0]["position"], 1);
    assert_eq!(list["items"][0]["checked"], false);
    assert!(db_path(dir.path()).exists());
}

#[test]
fn multi_word_text_is_joined() {
    let dir = TempDir::new().expect("temp dir");
    chores_cmd(dir.path())
        .args(["add", "call", "the", "plumber", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added\t").and(predicate::str::contains("call the plumber")));

    assert_eq!(texts(&list_json(dir.path(), &[])), ["call the plumber"]);
}

#[test]
fn check_uncheck_and_filters() {
    let dir = TempDir::new().expect("temp dir");
    let milk = add_item(dir.path(), "buy milk");
    add_item(dir.path(), "walk dog");

    chores_cmd(dir.path())
        .args(["check", &milk.to_string()])
        .assert()
        .success();

    let done = list_json(dir.path(), &["--done"]);
    assert_eq!(texts(&done), ["buy milk"]);
    assert_eq!(done["items"][0]["position"], 2);

    let pending = list_json(dir.path(), &["--pending"]);
    assert_eq!(texts(&pending), ["walk dog"]);

    chores_cmd(dir.path())
        .args(["uncheck", &milk.to_string()])
        .assert()
        .success();
    assert_eq!(list_json(dir.path(), &["--done"])["items"], Value::Array(vec![]));
}

#[test]
fn edit_replaces_text_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let key = add_item(dir.path(), "wlak dog");
    add_item(dir.path(), "buy milk");

    chores_cmd(dir.path())
        .args(["edit", &key.to_string(), "walk", "dog", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": true"));

    assert_eq!(texts(&list_json(dir.path(), &[])), ["buy milk", "walk dog"]);
}

#[test]
fn move_uses_one_based_positions() {
    let dir = TempDir::new().expect("temp dir");
    for text in ["c", "b", "a"] {
        add_item(dir.path(), text);
    }

    chores_cmd(dir.path()).args(["move", "3", "1"]).assert().success();
    assert_eq!(texts(&list_json(dir.path(), &[])), ["c", "a", "b"]);
}

#[test]
fn sort_and_search() {
    let dir = TempDir::new().expect("temp dir");
    for text in ["buy milk", "Walk dog", "feed dog"] {
        add_item(dir.path(), text);
    }

    chores_cmd(dir.path()).arg("sort").assert().success();
    assert_eq!(
        texts(&list_json(dir.path(), &[])),
        ["Walk dog", "buy milk", "feed dog"]
    );

    chores_cmd(dir.path())
        .args(["sort", "--descending"])
        .assert()
        .success();
    assert_eq!(
        texts(&list_json(dir.path(), &[])),
        ["feed dog", "buy milk", "Walk dog"]
    );

    assert_eq!(
        texts(&list_json(dir.path(), &["--search", "walk"])),
        Vec::<String>::new()
    );
    assert_eq!(
        texts(&list_json(dir.path(), &["--search", "walk", "--ignore-case"])),
        ["Walk dog"]
    );
}

#[test]
fn rm_removes_only_that_item() {
    let dir = TempDir::new().expect("temp dir");
    add_item(dir.path(), "keep");
    let gone = add_item(dir.path(), "drop");

    chores_cmd(dir.path())
        .args(["rm", &gone.to_string()])
        .assert()
        .success();
    assert_eq!(texts(&list_json(dir.path(), &[])), ["keep"]);
}

#[test]
fn text_list_is_tab_separated() {
    let dir = TempDir::new().expect("temp dir");
    add_item(dir.path(), "water plants");

    chores_cmd(dir.path())
        .args(["list", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("POS\tKEY\tSTATE\tTEXT\n"))
        .stdout(predicate::str::contains("\tpending\twater plants"));
}

#[test]
fn db_flag_overrides_env() {
    let dir = TempDir::new().expect("temp dir");
    let other = dir.path().join("other.sqlite3");

    chores_cmd(dir.path())
        .args(["add", "elsewhere", "--db"])
        .arg(&other)
        .assert()
        .success();

    assert!(other.exists());
    assert_eq!(list_json(dir.path(), &[])["counts"]["total"], 0);
}
