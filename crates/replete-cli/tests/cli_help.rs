use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_help_shows_options_and_commands() {
    cargo_bin_cmd!("replete")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--width"))
        .stdout(predicate::str::contains("--no-masthead"))
        .stdout(predicate::str::contains("ENGINE"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("replete")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_engine_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("replete")
        .env("REPLETE_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing engine command"));
}

#[test]
fn test_zero_width_is_rejected() {
    cargo_bin_cmd!("replete")
        .args(["--width", "0", "--", "cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--width"));
}
