//! E2E: create -> toggle --apply -> mode switch -> backup -> relocate.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn hostswitch(home: &Path, hosts: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hostswitch").unwrap();
    cmd.env("HOSTSWITCH_HOME", home)
        .env("HOSTSWITCH_HOSTS_FILE", hosts)
        .env_remove("HOSTSWITCH_LOG");
    cmd
}

#[test]
fn e2e_happy_path() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts = common::hosts_file(dir.path(), "127.0.0.1 localhost\n");

    // create
    let out = hostswitch(&home, &hosts)
        .args(["group", "create", "dev", "--content", "10.0.0.5 api.dev"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let id = String::from_utf8_lossy(&out.stdout).trim().to_string();
    assert!(!id.is_empty());

    // list shows it inactive
    hostswitch(&home, &hosts)
        .args(["group", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{id}\toff\tdev")));

    // toggle and apply
    hostswitch(&home, &hosts)
        .args(["group", "toggle", &id, "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev: on"));
    let content = std::fs::read_to_string(&hosts).unwrap();
    assert!(content.starts_with("127.0.0.1 localhost\n"));
    assert!(content.contains("10.0.0.5 api.dev"));

    // hosts show prints the file
    hostswitch(&home, &hosts)
        .args(["hosts", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.5 api.dev"));

    // invalid mode is rejected
    hostswitch(&home, &hosts)
        .args(["config", "set", "hosts-mode", "vpn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vpn"));

    // exclusive mode rewrites the file
    hostswitch(&home, &hosts)
        .args(["config", "set", "hosts-mode", "exclusive"])
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&hosts).unwrap(), "10.0.0.5 api.dev\n");

    // explicit backup
    hostswitch(&home, &hosts)
        .args(["hosts", "backup"])
        .assert()
        .success();
    hostswitch(&home, &hosts)
        .args(["hosts", "backups"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".bak"));

    // relocate and keep working from the new place
    let moved = dir.path().join("moved");
    hostswitch(&home, &hosts)
        .args(["location", "set", moved.to_str().unwrap()])
        .assert()
        .success();
    hostswitch(&home, &hosts)
        .args(["location", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moved"));
    hostswitch(&home, &hosts)
        .args(["group", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.5 api.dev"));

    // delete and re-apply
    hostswitch(&home, &hosts)
        .args(["group", "delete", &id, "--apply"])
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&hosts).unwrap(), "");
}

#[test]
fn unknown_group_fails_with_message() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts = common::hosts_file(dir.path(), "");

    hostswitch(&home, &hosts)
        .args(["group", "toggle", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("group 'nope' not found"));
}

#[test]
fn missing_content_file_names_the_path() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts = common::hosts_file(dir.path(), "");

    hostswitch(&home, &hosts)
        .args(["group", "create", "dev", "--file", "no-such-file.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: cannot read no-such-file.txt"));
}

#[test]
fn hosts_show_prints_raw_bytes() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let original = b"# caf\xe9\n127.0.0.1 localhost\n";
    let hosts = common::hosts_file(dir.path(), original);

    hostswitch(&home, &hosts)
        .args(["hosts", "show"])
        .assert()
        .success()
        .stdout(original.as_slice());
}
