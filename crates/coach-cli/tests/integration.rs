#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn coach(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("coach").unwrap();
    cmd.current_dir(dir.path())
        .env("COACH_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn json_out(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

fn shortcut_file(dir: &TempDir, app: &str) -> std::path::PathBuf {
    dir.path().join("shortcuts_data").join(format!("{app}.json"))
}

// ---------------------------------------------------------------------------
// coach init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_data_dir() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .coach/config.yaml"));

    assert!(dir.path().join(".coach/config.yaml").exists());
    assert!(dir.path().join("shortcuts_data").is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    coach(&dir).arg("init").assert().success();
    coach(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .coach/config.yaml"));
}

#[test]
fn config_show_works_without_init() {
    let dir = TempDir::new().unwrap();
    let value = json_out(coach(&dir).args(["--json", "config", "show"]));
    assert_eq!(value["model"], "llama3");
    assert_eq!(value["server"]["endpoint"], "http://localhost:11434");
    assert_eq!(value["poll_interval_secs"], 5);
}

#[test]
fn config_validate_fails_on_bad_endpoint() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".coach")).unwrap();
    std::fs::write(
        dir.path().join(".coach/config.yaml"),
        "server:\n  endpoint: localhost:11434\n",
    )
    .unwrap();

    coach(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

// ---------------------------------------------------------------------------
// coach shortcut
// ---------------------------------------------------------------------------

#[test]
fn starred_shortcut_is_listed() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "add", "Firefox", "Cmd+L", "Focus", "address", "bar", "--star"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added shortcut [Cmd+L] for Firefox"));

    coach(&dir)
        .args(["shortcut", "list", "Firefox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cmd+L"))
        .stdout(predicate::str::contains("Focus address bar"));
}

#[test]
fn unstarred_shortcut_is_dropped_on_next_load() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "add", "Firefox", "Cmd+T", "New tab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not starred"));

    // Still on disk until the next save.
    let raw = std::fs::read_to_string(shortcut_file(&dir, "Firefox")).unwrap();
    assert!(raw.contains("Cmd+T"));

    coach(&dir)
        .args(["shortcut", "list", "Firefox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No starred shortcuts for Firefox."));

    // The next mutation saves the filtered collection.
    coach(&dir)
        .args(["shortcut", "add", "Firefox", "Cmd+L", "Address bar", "--star"])
        .assert()
        .success();
    let raw = std::fs::read_to_string(shortcut_file(&dir, "Firefox")).unwrap();
    assert!(!raw.contains("Cmd+T"));
    assert!(raw.contains("Cmd+L"));
}

#[test]
fn list_json_orders_starred_first() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("shortcuts_data")).unwrap();
    std::fs::write(
        shortcut_file(&dir, "Code"),
        r#"{"Cmd+P": {"desc": "Quick open", "starred": true},
            "Cmd+B": {"desc": "Sidebar", "starred": true},
            "Cmd+J": {"desc": "Panel", "starred": false}}"#,
    )
    .unwrap();

    let value = json_out(coach(&dir).args(["-j", "shortcut", "list", "Code"]));
    let keys: Vec<&str> = value["shortcuts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["keys"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["Cmd+B", "Cmd+P"]);
    assert_eq!(value["shortcuts"][0]["description"], "Sidebar");
}

#[test]
fn toggle_then_remove() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "add", "Notes", "Cmd+N", "New note", "--star"])
        .assert()
        .success();

    let value = json_out(coach(&dir).args(["--json", "shortcut", "toggle", "Notes", "Cmd+N"]));
    assert_eq!(value["starred"], false);

    // Unstarred by the toggle, so the next load drops it.
    coach(&dir)
        .args(["shortcut", "remove", "Notes", "Cmd+N"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn star_unknown_shortcut_fails() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "star", "Safari", "Cmd+Q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shortcut 'Cmd+Q' not found for Safari"));
}

#[test]
fn remove_starred_shortcut() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "add", "Xcode", "Cmd+R", "Run", "--star"])
        .assert()
        .success();
    coach(&dir)
        .args(["shortcut", "remove", "Xcode", "Cmd+R"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed [Cmd+R] from Xcode"));

    let raw = std::fs::read_to_string(shortcut_file(&dir, "Xcode")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({}));
}

#[test]
fn apps_lists_stored_collections() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "apps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No shortcuts stored"));

    for app in ["Zed", "Arc"] {
        coach(&dir)
            .args(["shortcut", "add", app, "Cmd+K", "Command palette", "--star"])
            .assert()
            .success();
    }
    let value = json_out(coach(&dir).args(["--json", "shortcut", "apps"]));
    assert_eq!(value, serde_json::json!(["Arc", "Zed"]));
}

#[test]
fn invalid_app_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["shortcut", "add", "../etc", "Cmd+L", "x", "--star"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid app name"));
}

#[test]
fn corrupt_storage_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("shortcuts_data")).unwrap();
    std::fs::write(shortcut_file(&dir, "Broken"), "not json").unwrap();

    coach(&dir)
        .args(["shortcut", "list", "Broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt shortcut storage for 'Broken'"));
}

#[test]
fn custom_data_dir_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".coach")).unwrap();
    std::fs::write(dir.path().join(".coach/config.yaml"), "data_dir: keys\n").unwrap();

    coach(&dir)
        .args(["shortcut", "add", "Finder", "Cmd+Shift+G", "Go to folder", "--star"])
        .assert()
        .success();
    assert!(dir.path().join("keys/Finder.json").exists());
}

// ---------------------------------------------------------------------------
// coach model
// ---------------------------------------------------------------------------

#[test]
fn model_use_persists_to_config() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["model", "use", "mistral"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[System] Switched to: mistral"));

    let value = json_out(coach(&dir).args(["--json", "config", "show"]));
    assert_eq!(value["model"], "mistral");
}

#[test]
fn model_use_json_prints_only_json() {
    let dir = TempDir::new().unwrap();
    let value = json_out(coach(&dir).args(["--json", "model", "use", "mistral"]));
    assert_eq!(value, serde_json::json!({ "model": "mistral" }));
}

#[test]
fn model_choose_refuses_json() {
    let dir = TempDir::new().unwrap();
    coach(&dir)
        .args(["--json", "model", "choose"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot be combined with --json"));
}

#[test]
fn model_list_reports_unreachable_server() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".coach")).unwrap();
    std::fs::write(
        dir.path().join(".coach/config.yaml"),
        "server:\n  endpoint: http://127.0.0.1:1\n  timeout_secs: 2\n",
    )
    .unwrap();

    coach(&dir)
        .args(["model", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to list models at http://127.0.0.1:1"));
}
