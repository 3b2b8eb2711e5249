//! Binary-level tests for the `oc` CLI

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn oc(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("oc").expect("binary should build");
    cmd.current_dir(temp.path())
        .env("XDG_DATA_HOME", temp.path().join("data"))
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("HOME", temp.path());
    cmd
}

#[test]
fn test_show_config_prints_defaults() {
    let temp = TempDir::new().unwrap();
    oc(&temp)
        .args(["show-config", "--profile", "modern"])
        .assert()
        .success()
        .stdout(predicate::str::contains("word-limit: 500"))
        .stdout(predicate::str::contains("model: gpt-4o-mini"))
        .stdout(predicate::str::contains("modern_gpt4o_regex_cleaned.csv"));
}

#[test]
fn test_local_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".ocrclean.yml"), "pipeline:\n  word-limit: 42\n").unwrap();
    oc(&temp)
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("word-limit: 42"));
}

#[test]
fn test_run_without_api_key_fails_fast() {
    let temp = TempDir::new().unwrap();
    oc(&temp)
        .env_remove("OPENAI_API_KEY")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_clean_test_mode() {
    let temp = TempDir::new().unwrap();
    let datasets = temp.path().join("datasets");
    fs::create_dir_all(&datasets).unwrap();
    let mut raw = String::from("Date,Text\n");
    for i in 1..=7 {
        raw.push_str(&format!("1880-01-0{i},\"Storm  number {i}!!! *\"\n"));
    }
    fs::write(datasets.join("historical.csv"), raw).unwrap();

    oc(&temp)
        .args(["clean", "--test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TEST MODE"))
        .stdout(predicate::str::contains("SAMPLE OUTPUT"));

    let cleaned = fs::read_to_string(datasets.join("historical_regex_cleaned_TEST.csv")).unwrap();
    assert_eq!(cleaned.lines().count(), 6);
    assert!(cleaned.contains("1880-01-01,Storm number I!"));
}
