//! CLI subprocess integration tests.
//!
//! These tests invoke the `strata` binary against a temporary store and a
//! temporary `HOME`, and check exit codes and JSON output.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

struct Sandbox {
    home: tempfile::TempDir,
    store: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
            store: tempfile::tempdir().unwrap(),
        }
    }

    fn strata(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_strata"))
            .env("HOME", self.home.path())
            .env_remove("STRATA_LOG")
            .arg("--store")
            .arg(self.store.path())
            .args(["--user", "alice", "--tenant", "acme"])
            .args(args)
            .output()
            .unwrap()
    }

    fn json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.strata(&full);
        assert!(
            output.status.success(),
            "{args:?} failed. stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn write_draft(&self, content: &str) -> std::path::PathBuf {
        let path = self.home.path().join("draft.json");
        std::fs::write(&path, content).unwrap();
        path
    }
}

fn path_str(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

#[test]
fn cli_help_lists_command_groups() {
    let output = Command::new(env!("CARGO_BIN_EXE_strata"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for group in ["env", "session", "tasks"] {
        assert!(stdout.contains(group), "help must list '{group}'");
    }
}

#[test]
fn cli_env_create_and_list() {
    let sb = Sandbox::new();
    let env = sb.json(&["env", "create", "web"]);
    assert_eq!(env["name"], "web");
    assert_eq!(env["version"], 0);

    let list = sb.json(&["env", "list"]);
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "ready");
}

#[test]
fn cli_duplicate_name_fails() {
    let sb = Sandbox::new();
    sb.json(&["env", "create", "web"]);
    let output = sb.strata(&["env", "create", "web"]);
    assert!(!output.status.success());
}

#[test]
fn cli_deploy_cycle_bumps_version() {
    let sb = Sandbox::new();
    sb.json(&["env", "create", "web"]);
    let session = sb.json(&["session", "open", "web"]);
    let sid = session["id"].as_str().unwrap().to_owned();

    let draft = sb.write_draft(r#"{"vm": {"image": "debian"}}"#);
    sb.json(&["session", "edit", &sid, &path_str(&draft), "--objects"]);

    let intent = sb.json(&["session", "deploy", &sid]);
    assert_eq!(intent["action"], "deploy");

    let status = sb.json(&["env", "status", "web"]);
    assert_eq!(status["status"], "deploying");

    let tasks = sb.json(&["tasks", "list"]);
    let task_id = tasks[0]["task_id"].as_str().unwrap().to_owned();
    let done = sb.json(&["tasks", "complete", &task_id]);
    assert_eq!(done["state"], "deployed");

    let env = sb.json(&["env", "show", "web"]);
    assert_eq!(env["version"], 1);
    assert_eq!(env["status"], "ready");

    let objects = sb.json(&["env", "describe", "web"]);
    assert_eq!(objects["vm"]["image"], "debian");
    assert!(sb.json(&["tasks", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn cli_stale_session_exits_with_conflict() {
    let sb = Sandbox::new();
    sb.json(&["env", "create", "web"]);
    let a = sb.json(&["session", "open", "web"])["id"]
        .as_str()
        .unwrap()
        .to_owned();
    let b = sb.json(&["session", "open", "web"])["id"]
        .as_str()
        .unwrap()
        .to_owned();

    sb.json(&["session", "deploy", &a]);
    let output = sb.strata(&["session", "deploy", &b]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_unknown_environment_exits_not_found() {
    let sb = Sandbox::new();
    let output = sb.strata(&["env", "show", "nope"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no environment matching"));
}

#[test]
fn cli_env_delete_removes_environment_on_success() {
    let sb = Sandbox::new();
    sb.json(&["env", "create", "web"]);
    let intent = sb.json(&["env", "delete", "web"]);
    assert!(intent["action"].is_null());

    let task_id = sb.json(&["tasks", "list"])[0]["task_id"]
        .as_str()
        .unwrap()
        .to_owned();
    let done = sb.json(&["tasks", "complete", &task_id]);
    assert_eq!(done["state"], "deleted");
    assert!(sb.json(&["env", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn cli_encrypt_data_keeps_plaintext_off_disk() {
    let sb = Sandbox::new();
    sb.json(&["--encrypt-data", "env", "create", "vault-backed"]);

    let env = sb.json(&["--encrypt-data", "env", "show", "vault-backed"]);
    assert_eq!(env["description"]["Objects"]["name"], "vault-backed");

    let output = sb.strata(&["--no-encrypt-data", "env", "show", "vault-backed"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("encrypt_data is disabled"));
}

#[test]
fn cli_tenants_are_isolated() {
    let sb = Sandbox::new();
    sb.json(&["env", "create", "web"]);
    let output = Command::new(env!("CARGO_BIN_EXE_strata"))
        .env("HOME", sb.home.path())
        .arg("--store")
        .arg(sb.store.path())
        .args(["--tenant", "globex", "--json", "env", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(rows.as_array().unwrap().is_empty());
}
