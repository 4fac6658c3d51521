//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn twofold() -> Command {
    Command::cargo_bin("twofold").expect("binary builds")
}

#[test]
fn test_dry_run_prints_plan_and_changes_nothing() {
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    fs::write(src.path().join("a.txt"), b"payload").expect("write");

    twofold()
        .arg(src.path())
        .arg(dst.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan:"))
        .stdout(predicate::str::contains("Copy: 1"))
        .stdout(predicate::str::contains("Dry-run mode: no changes were made."));

    assert!(!dst.path().join("a.txt").exists());
}

#[test]
fn test_sync_copies_files() {
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");
    fs::write(src.path().join("a.txt"), b"payload").expect("write");

    twofold().arg(src.path()).arg(dst.path()).assert().success();

    assert_eq!(fs::read(dst.path().join("a.txt")).expect("read"), b"payload");
}

#[test]
fn test_missing_arguments_fail_with_usage() {
    twofold()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_nonexistent_source_is_rejected() {
    let dst = TempDir::new().expect("dst");

    twofold()
        .arg("/definitely/not/a/folder")
        .arg(dst.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("source folder does not exist"));
}

#[test]
fn test_empty_trees_have_nothing_to_sync() {
    let src = TempDir::new().expect("src");
    let dst = TempDir::new().expect("dst");

    twofold()
        .arg(src.path())
        .arg(dst.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to sync."));
}
