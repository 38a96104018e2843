use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Integration tests for the merit-gov binary, each against an isolated
/// state directory.

const DAY: u64 = 86_400;
const BASE: u64 = 5 * DAY;

fn gov_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("merit-gov").unwrap();
    cmd.env("MERIT_GOV_DIR", dir);
    cmd
}

fn extract_proposal_id(stdout: &[u8]) -> u64 {
    let stdout = String::from_utf8_lossy(stdout);
    stdout
        .lines()
        .find_map(|line| line.split("Proposal created:").nth(1))
        .expect("propose output should name the id")
        .trim()
        .parse()
        .expect("proposal id should be numeric")
}

fn propose(dir: &Path, topic: u32, description: &str) -> u64 {
    let output = gov_cmd(dir)
        .args([
            "propose",
            "--as",
            "alice",
            "--topic",
            &topic.to_string(),
            "--target",
            "counter",
            "--value",
            "0",
            "--calldata",
            "00",
            "--description",
            description,
            "--now",
            &BASE.to_string(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "propose failed: {output:?}");
    extract_proposal_id(&output.stdout)
}

#[test]
fn test_cli_runs() {
    let dir = TempDir::new().unwrap();
    gov_cmd(dir.path()).arg("--version").assert().success();
}

#[test]
fn test_cli_shows_help() {
    let dir = TempDir::new().unwrap();
    gov_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("governance"));
}

#[test]
fn test_config_show() {
    let dir = TempDir::new().unwrap();
    gov_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration"));
}

#[test]
fn test_demo_then_status_then_replay() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .args(["demo", "--now", &BASE.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    gov_cmd(dir.path())
        .args(["status", "--now", &(BASE + 100).to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Proposal"));

    gov_cmd(dir.path())
        .arg("replay")
        .assert()
        .success()
        .stdout(predicate::str::contains("match live state"));
}

#[test]
fn test_propose_vote_replay_flow() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .args([
            "set-power", "--account", "alice", "--power", "1000000",
            "--now", &BASE.to_string(),
        ])
        .assert()
        .success();

    gov_cmd(dir.path())
        .args([
            "publish-weights", "--as", "admin", "--day", "5", "--topic", "1",
            "--account", "alice", "--cap", "100000", "--context", "cli-test",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 1 weight caps"));

    let id = propose(dir.path(), 1, "CLI flow proposal");

    // Voting before the window opens is an invalid transition
    gov_cmd(dir.path())
        .args([
            "vote", "--as", "alice", "--proposal", &id.to_string(),
            "--choice", "for", "--now", &BASE.to_string(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pending"));

    gov_cmd(dir.path())
        .args([
            "vote", "--as", "alice", "--proposal", &id.to_string(),
            "--choice", "for", "--reason", "cli says FOR",
            "--now", &(BASE + 70).to_string(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("effective weight 100000"));

    // Second vote by the same account is rejected
    gov_cmd(dir.path())
        .args([
            "vote", "--as", "alice", "--proposal", &id.to_string(),
            "--choice", "against", "--now", &(BASE + 80).to_string(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already voted"));

    gov_cmd(dir.path())
        .args(["status", "--proposal", &id.to_string(), "--now", &(BASE + 90).to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("100000"));

    gov_cmd(dir.path())
        .arg("replay")
        .assert()
        .success()
        .stdout(predicate::str::contains("match live state"));
}

#[test]
fn test_unauthorized_publisher_rejected() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .args([
            "publish-weights", "--as", "mallory", "--day", "5", "--topic", "1",
            "--account", "alice", "--cap", "100000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not authorized"));
}

#[test]
fn test_propose_arity_mismatch_rejected() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .args([
            "propose", "--as", "alice", "--topic", "1",
            "--target", "a", "--target", "b",
            "--value", "0",
            "--calldata", "00", "--calldata", "00",
            "--description", "bad arity",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatch"));
}

#[test]
fn test_propose_rejects_non_hex_calldata() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .args([
            "propose", "--as", "alice", "--topic", "1",
            "--target", "a", "--value", "0", "--calldata", "not-hex",
            "--description", "bad calldata",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid calldata"));
}

#[test]
fn test_idempotent_propose_returns_same_id() {
    let dir = TempDir::new().unwrap();

    let first = propose(dir.path(), 1, "identical content");
    let second = propose(dir.path(), 1, "identical content");
    assert_eq!(first, second);
}

#[test]
fn test_cancel_pending_then_vote_fails() {
    let dir = TempDir::new().unwrap();
    let id = propose(dir.path(), 1, "cancel me");

    gov_cmd(dir.path())
        .args(["cancel", "--proposal", &id.to_string(), "--now", &(BASE + 1).to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("canceled"));

    gov_cmd(dir.path())
        .args([
            "vote", "--as", "alice", "--proposal", &id.to_string(),
            "--choice", "for", "--now", &(BASE + 70).to_string(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Canceled"));
}

#[test]
fn test_replay_without_log_fails_cleanly() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .arg("replay")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Event log not found"));
}

#[test]
fn test_unknown_proposal_is_diagnosable() {
    let dir = TempDir::new().unwrap();

    gov_cmd(dir.path())
        .args(["status", "--proposal", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("12345"));
}
