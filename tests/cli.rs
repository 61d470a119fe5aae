// ABOUTME: Integration tests for the proxyforge CLI commands.
// ABOUTME: Drives init, plan, deploy, upgrade, and status against the simulated backend.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn proxyforge_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("proxyforge"))
}

/// A temp project with the starter config (simulated backend).
fn project() -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success();
    temp_dir
}

fn ledger(dir: &Path) -> serde_json::Value {
    let content = fs::read_to_string(dir.join("deployed-addresses.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn help_shows_commands() {
    proxyforge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("upgrade"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = project();
    let config_path = temp_dir.path().join("deploy.yml");

    assert!(config_path.exists(), "deploy.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("components:"));
    assert!(content.contains("backend: simulated"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("deploy.yml"), "existing: config").unwrap();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_without_config_fail() {
    let temp_dir = tempfile::tempdir().unwrap();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn plan_lists_order_and_deferred_links() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. governance (PlatformGovernance)"))
        .stdout(predicate::str::contains("4. achievementSBT (AchievementSBT)"))
        .stdout(predicate::str::contains("governance.initAddress -> fencer"))
        .stdout(predicate::str::contains("Seed steps: 8"));

    assert!(!temp_dir.path().join("deployed-addresses.json").exists());
}

#[test]
fn plan_json_emits_structured_data() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"plan""#))
        .stdout(predicate::str::contains(r#""deferred_links""#));
}

#[test]
fn deploy_writes_ledger_and_is_idempotent() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("deploy")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 deployed, 0 already present, seeded"));

    let first = ledger(temp_dir.path());
    assert_eq!(first["network"], "localhost");
    assert_eq!(first["components"].as_object().unwrap().len(), 4);
    assert!(first["seeded_at"].is_string());
    assert!(!temp_dir.path().join("deployed-addresses.json.lock").exists());

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("deploy")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 deployed, 4 already present"))
        .stderr(predicate::str::contains("seed steps skipped"));

    let second = ledger(temp_dir.path());
    for name in ["governance", "fencer", "tournament", "achievementSBT"] {
        assert_eq!(
            first["components"][name]["address"],
            second["components"][name]["address"]
        );
    }
}

#[test]
fn deploy_refuses_a_held_lock_unless_forced() {
    let temp_dir = project();
    let lock = serde_json::json!({
        "holder": "ci-runner",
        "pid": 4242,
        "started_at": chrono::Utc::now(),
        "operation": "deploy",
    });
    fs::write(
        temp_dir.path().join("deployed-addresses.json.lock"),
        lock.to_string(),
    )
    .unwrap();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ci-runner"));

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "--force", "--skip-seed"])
        .assert()
        .success()
        .stderr(predicate::str::contains("--skip-seed"));
}

#[test]
fn status_reports_ledger_contents() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 4 component(s) deployed"))
        .stdout(predicate::str::contains("Not seeded"));

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "--skip-seed"])
        .assert()
        .success();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 of 4 component(s) deployed on localhost"));
}

#[test]
fn upgrade_of_unchanged_builds_keeps_everything() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "--skip-seed"])
        .assert()
        .success();
    let before = ledger(temp_dir.path());

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("upgrade")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 upgraded, 4 unchanged"));

    assert_eq!(before["components"], ledger(temp_dir.path())["components"]);
}

#[test]
fn upgrade_before_deploy_fails() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .arg("upgrade")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no ledger entry"));
}

#[test]
fn unknown_destination_fails() {
    let temp_dir = project();

    proxyforge_cmd()
        .current_dir(temp_dir.path())
        .args(["--destination", "mainnet", "plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown destination: mainnet"));
}
