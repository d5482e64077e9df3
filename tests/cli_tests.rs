//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the fitmatch binary, isolated from any local config
fn fitmatch_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fitmatch").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("FITMATCH_CONFIG")
        .env_remove("FITMATCH_INPUT")
        .env_remove("FITMATCH_OUTPUT")
        .env_remove("FITMATCH_TEAM_SIZE");
    cmd
}

/// Write the bundled sample CSV into `dir` and return its path
fn sample_csv(dir: &TempDir) -> String {
    let path = dir.path().join("participants.csv");
    fitmatch_cmd(dir)
        .args(["sample", "--output"])
        .arg(&path)
        .assert()
        .success();
    path.to_string_lossy().into_owned()
}

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("form"))
        .stdout(predicate::str::contains("sample"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_short_version_flag() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fitmatch"));
}

// ─────────────────────────────────────────────────────────────────
// Sample Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_sample_writes_twenty_rows() {
    let dir = TempDir::new().unwrap();
    let path = sample_csv(&dir);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 21);
    assert!(content.starts_with("ID,Name,Email,PreferredGame"));
}

#[test]
fn test_sample_refuses_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = sample_csv(&dir);

    fitmatch_cmd(&dir)
        .args(["sample", "--output", &path])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("already exists"));

    fitmatch_cmd(&dir)
        .args(["sample", "--force", "--output", &path])
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────
// Classify Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_classify_score() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .args(["classify", "85"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balanced"))
        .stdout(predicate::str::contains("5 points to reach Leader"));
}

#[test]
fn test_classify_responses() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .args(["classify", "--responses", "5,5,4,5,4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Survey score: 92"))
        .stdout(predicate::str::contains("Leader"));
}

#[test]
fn test_classify_out_of_range() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .args(["classify", "150"])
        .assert()
        .failure()
        .code(30)
        .stderr(predicate::str::contains("E302"));
}

#[test]
fn test_classify_wrong_response_count() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .args(["classify", "--responses", "5,5,5"])
        .assert()
        .failure()
        .code(30);
}

// ─────────────────────────────────────────────────────────────────
// Form Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_form_sample_to_csv() {
    let dir = TempDir::new().unwrap();
    let input = sample_csv(&dir);
    let output = dir.path().join("teams.csv");

    fitmatch_cmd(&dir)
        .args(["form", "--input", &input, "--team-size", "4", "--threads", "2", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("TEAM-001"))
        .stdout(predicate::str::contains("Formation Statistics"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("TeamID,TeamName"));
    assert!(content.lines().count() >= 2);
}

#[test]
fn test_form_sequential_to_json() {
    let dir = TempDir::new().unwrap();
    let input = sample_csv(&dir);
    let output = dir.path().join("teams.json");

    fitmatch_cmd(&dir)
        .args(["--quiet", "form", "--sequential", "--format", "json", "-s", "5", "-i", &input, "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let teams = report["teams"].as_array().unwrap();
    assert!(!teams.is_empty());
    assert_eq!(report["statistics"]["total_teams"].as_u64(), Some(teams.len() as u64));
}

#[test]
fn test_form_pick_lock_scope() {
    let dir = TempDir::new().unwrap();
    let input = sample_csv(&dir);

    fitmatch_cmd(&dir)
        .args(["form", "-i", &input, "-s", "3", "--lock-scope", "pick"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Teams formed:"));
}

#[test]
fn test_form_missing_input_file() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .args(["form", "--input", "does-not-exist.csv"])
        .assert()
        .failure()
        .code(20)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn test_form_without_input() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .arg("form")
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("no participant file given"));
}

#[test]
fn test_form_rejects_small_team_size() {
    let dir = TempDir::new().unwrap();
    let input = sample_csv(&dir);

    fitmatch_cmd(&dir)
        .args(["form", "-i", &input, "-s", "2"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("team_size"));
}

#[test]
fn test_form_without_leaders() {
    let dir = TempDir::new().unwrap();
    let input = common::write_participant_csv(
        dir.path(),
        "no_leaders.csv",
        &[
            "P001,Ann Lee,ann@university.edu,FIFA,5,Attacker,60,THINKER",
            "P002,Bo Park,bo@university.edu,Chess,6,Defender,75,BALANCED",
            "P003,Cy Ray,cy@university.edu,Valorant,4,Supporter,88,BALANCED",
            "P004,Di Fox,di@university.edu,Basketball,7,Strategist,40,THINKER",
        ],
    );

    fitmatch_cmd(&dir)
        .args(["form", "-s", "3", "-i"])
        .arg(&input)
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("no leaders"));
}

// ─────────────────────────────────────────────────────────────────
// Argument Validation Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_lock_scope_value() {
    let dir = TempDir::new().unwrap();
    fitmatch_cmd(&dir)
        .args(["form", "--lock-scope", "row"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
