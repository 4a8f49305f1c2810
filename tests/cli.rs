//! End-to-end checks of the CLI surface that need no network access

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("gitrel")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn release_requires_repository_and_tag() {
    Command::cargo_bin("gitrel")
        .unwrap()
        .arg("release")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--repository"))
        .stderr(predicate::str::contains("--tag"));
}

#[test]
fn bad_repository_url_fails_before_any_work() {
    Command::cargo_bin("gitrel")
        .unwrap()
        .args([
            "release",
            "--repository",
            "not-a-url",
            "--tag",
            "v1.0",
            "--force",
            "--skip-build",
            "--message",
            "notes",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse repository URL"));
}
