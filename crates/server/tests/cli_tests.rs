//! CLI surface tests for the server binary. None of these reach the network.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn server() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("statuspage-server"));
    for var in [
        "GITHUB_TOKEN",
        "STATUSPAGE_ADDR",
        "STATUSPAGE_PROJECT_OWNER",
        "STATUSPAGE_PROJECT_OWNER_IS_ORG",
        "STATUSPAGE_PROJECT_NUMBER",
        "STATUSPAGE_IMPACT_TYPES",
        "STATUSPAGE_LAST_PHASE",
        "STATUSPAGE_GITHUB_API_URL",
        "STATUSPAGE_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_project_flags() {
    server()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--github-project-owner"))
        .stdout(predicate::str::contains("--github-project-number"))
        .stdout(predicate::str::contains("--last-phase"))
        .stdout(predicate::str::contains("--impact-types"));
}

#[test]
fn test_missing_project_owner_fails() {
    server()
        .args(["--github-project-number", "1"])
        .env("GITHUB_TOKEN", "dummy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("project owner is not set"))
        .stderr(predicate::str::contains("--github-project-owner"));
}

#[test]
fn test_missing_token_fails() {
    server()
        .args(["--github-project-owner", "octocat", "--github-project-number", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN is not set"));
}

#[test]
fn test_organization_owner_rejected_before_querying() {
    server()
        .args([
            "--github-project-owner",
            "acme",
            "--github-project-owner-is-org",
            "--github-project-number",
            "1",
            "--github-api-url",
            "http://127.0.0.1:9/graphql",
        ])
        .env("GITHUB_TOKEN", "dummy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("organization"));
}

#[test]
fn test_unreadable_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    server()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn test_config_file_supplies_project() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statuspage.toml");
    std::fs::write(
        &path,
        "[project]\nowner = \"acme\"\nowner_is_org = true\nnumber = 3\n",
    )
    .unwrap();

    server()
        .arg("--config")
        .arg(&path)
        .env("GITHUB_TOKEN", "dummy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'acme' is an organization"));
}
