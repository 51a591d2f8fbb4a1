#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ACTION_ENV: &[&str] = &[
    "TASK_ID",
    "ACTION_TASK_GROUP_ID",
    "ACTION_TASK_ID",
    "ACTION_TASK",
    "ACTION_INPUT",
    "ACTION_CALLBACK",
    "ACTION_PARAMETERS",
];

fn actions(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taskgraph-actions").unwrap();
    cmd.current_dir(dir.path()).env("ACTIONS_ROOT", dir.path());
    for var in ACTION_ENV {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A tree with an in-tree decision image and a parameters file for `project`.
fn project(project: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let docker = dir.path().join("taskcluster/docker");
    std::fs::create_dir_all(docker.join("decision")).unwrap();
    std::fs::write(docker.join("REGISTRY"), "taskcluster\n").unwrap();
    std::fs::write(docker.join("decision/VERSION"), "0.1.10\n").unwrap();
    std::fs::write(
        dir.path().join("parameters.yml"),
        format!(
            "head_repository: https://hg.mozilla.org/{project}\n\
             head_rev: abcdef0123\n\
             head_ref: default\n\
             level: '1'\n\
             owner: dev@example.com\n\
             project: {project}\n\
             pushlog_id: '42'\n"
        ),
    )
    .unwrap();
    dir
}

fn render_json(dir: &TempDir, extra: &[&str]) -> serde_json::Value {
    let output = actions(dir)
        .args(["render", "--parameters", "parameters.yml"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_try_push_includes_hello() {
    let dir = project("try");
    let manifest = render_json(&dir, &["--task-group-id", "groupId1234"]);

    assert_eq!(manifest["version"], 1);
    assert_eq!(manifest["variables"]["parameters"]["project"], "try");
    let names: Vec<&str> = manifest["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["retrigger-decision", "hello"]);

    let hello = &manifest["actions"][1];
    assert_eq!(hello["kind"], "task");
    assert_eq!(hello["task"]["taskGroupId"], "groupId1234");
    assert_eq!(hello["task"]["payload"]["image"], "taskcluster/decision:0.1.10");
    assert_eq!(hello["task"]["payload"]["env"]["ACTION_CALLBACK"], "hello_world_action");
}

#[test]
fn render_reads_task_group_from_env() {
    let dir = project("try");
    let output = actions(&dir)
        .args(["render", "--parameters", "parameters.yml"])
        .env("TASK_ID", "fromEnvironment")
        .output()
        .unwrap();
    assert!(output.status.success());
    let manifest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(manifest["actions"][1]["task"]["taskGroupId"], "fromEnvironment");
}

#[test]
fn render_hides_hello_off_try() {
    let dir = project("mozilla-central");
    let manifest = render_json(&dir, &[]);
    let actions = manifest["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["name"], "retrigger-decision");
    assert!(actions[0].get("schema").is_none());
}

#[test]
fn render_writes_output_file() {
    let dir = project("try");
    actions(&dir)
        .args(["render", "-p", "parameters.yml", "-o", "artifacts/actions.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(dir.path().join("artifacts/actions.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(manifest["version"], 1);
}

#[test]
fn render_fails_on_missing_parameter() {
    let dir = project("try");
    std::fs::write(dir.path().join("parameters.yml"), "project: try\n").unwrap();
    actions(&dir)
        .args(["render", "--parameters", "parameters.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("head_repository"));
}

#[test]
fn render_fails_for_unrecognized_repository() {
    let dir = project("try");
    let params = std::fs::read_to_string(dir.path().join("parameters.yml"))
        .unwrap()
        .replace("https://hg.mozilla.org/try", "https://github.com/example/try");
    std::fs::write(dir.path().join("parameters.yml"), params).unwrap();
    actions(&dir)
        .args(["render", "--parameters", "parameters.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("github.com/example/try"));
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_shows_builtin_actions() {
    let dir = project("try");
    actions(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("retrigger-decision"))
        .stdout(predicate::str::contains("hello"))
        .stdout(predicate::str::contains("Callbacks: hello_world_action"));
}

#[test]
fn list_json() {
    let dir = project("try");
    let output = actions(&dir).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["callbacks"][0], "hello_world_action");
    assert_eq!(value["actions"][0]["name"], "retrigger-decision");
    assert_eq!(value["actions"][1]["order"], 10000);
}

// ---------------------------------------------------------------------------
// action-callback
// ---------------------------------------------------------------------------

const TRY_PARAMETERS: &str = r#"{
    "head_repository": "https://hg.mozilla.org/try",
    "head_rev": "abcdef0123",
    "head_ref": "default",
    "level": "1",
    "owner": "dev@example.com",
    "project": "try",
    "pushlog_id": "42"
}"#;

#[test]
fn action_callback_unknown_callback_fails() {
    let dir = project("try");
    actions(&dir)
        .arg("action-callback")
        .env("ACTION_TASK_GROUP_ID", "tg")
        .env("ACTION_CALLBACK", "no_such_callback")
        .env("ACTION_PARAMETERS", TRY_PARAMETERS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_callback"))
        .stderr(predicate::str::contains("hello_world_action"));
}

#[test]
fn action_callback_runs_hello_in_test_mode() {
    let dir = project("try");
    actions(&dir)
        .args(["action-callback", "--test"])
        .env("ACTION_TASK_GROUP_ID", "tg")
        .env("ACTION_TASK_ID", "null")
        .env("ACTION_TASK", "null")
        .env("ACTION_INPUT", r#"{"greeting": "Hi", "name": "tester"}"#)
        .env("ACTION_CALLBACK", "hello_world_action")
        .env("ACTION_PARAMETERS", TRY_PARAMETERS)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Hi, tester"))
        .stderr(predicate::str::contains("testing mode"));
}

#[test]
fn action_callback_without_test_flag_stays_live() {
    let dir = project("try");
    actions(&dir)
        .arg("action-callback")
        .env("ACTION_TASK_GROUP_ID", "tg")
        .env("ACTION_CALLBACK", "hello_world_action")
        .env("ACTION_PARAMETERS", TRY_PARAMETERS)
        .assert()
        .success()
        .stderr(predicate::str::contains("Hello, world"))
        .stderr(predicate::str::contains("testing mode").not());
}

#[test]
fn action_callback_reports_callback_failure() {
    let dir = project("try");
    actions(&dir)
        .arg("action-callback")
        .env("ACTION_TASK_GROUP_ID", "tg")
        .env("ACTION_INPUT", r#"{"unexpected": true}"#)
        .env("ACTION_CALLBACK", "hello_world_action")
        .env("ACTION_PARAMETERS", TRY_PARAMETERS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("hello_world_action"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults_is_clean() {
    let dir = project("try");
    actions(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_init_then_show() {
    let dir = project("try");
    actions(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("taskcluster/actions.yml").exists());

    actions(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    actions(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trust_domain: gecko"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = project("try");
    std::fs::write(
        dir.path().join("taskcluster/actions.yml"),
        "trust_domain: ''\nmax_run_time: 0\n",
    )
    .unwrap();
    actions(&dir)
        .args(["config", "validate", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"level\": \"error\""))
        .stderr(predicate::str::contains("config validation found errors"));
}
