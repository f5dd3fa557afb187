use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DEMO_MANIFEST: &str = r#"{
    "core": {
        "controllers": { "heartbeat": "demo:heartbeat" },
        "modules": { "settings": "demo:settings" },
        "services": { "clock": "demo:clock" },
        "objects": { "config": "demo:config", "nothing": "demo:empty" }
    },
    "plugins": { "greeter": "demo:greeter" },
    "widgets": { "status": "demo:status" }
}"#;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn test_validate_summarizes_groups() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "app.json", DEMO_MANIFEST);

    Command::cargo_bin("citadel")?
        .arg("validate")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (7 entries)"))
        .stdout(predicate::str::contains("core.objects: 2"))
        .stdout(predicate::str::contains("plugins: 1"));

    Ok(())
}

#[test]
fn test_validate_rejects_non_string_identifier() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "bad.json", r#"{ "plugins": { "greeter": 42 } }"#);

    Command::cargo_bin("citadel")?
        .arg("validate")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("greeter"));

    Ok(())
}

#[test]
fn test_validate_rejects_unknown_section() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "bad.json", r#"{ "daemons": {} }"#);

    Command::cargo_bin("citadel")?
        .arg("validate")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown section 'daemons'"));

    Ok(())
}

#[test]
fn test_boot_activates_demo_manifest() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "app.json", DEMO_MANIFEST);

    Command::cargo_bin("citadel")?
        .arg("boot")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("plugins: greeter\n"))
        .stdout(predicate::str::contains("widgets: status, greeter-echo"))
        .stdout(predicate::str::contains("core.services: clock"))
        .stdout(predicate::str::contains("-> plugin:greeter"))
        .stdout(predicate::str::contains("-> widget:greeter-echo"))
        .stdout(predicate::str::contains("-> widget:status"))
        .stdout(predicate::str::contains("Shutting down..."));

    Ok(())
}

#[test]
fn test_boot_with_priority_strategy_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "app.json", DEMO_MANIFEST);
    let config = write_file(&dir, "citadel.json", r#"{ "load_strategy": "priority", "load_timeout_ms": 500 }"#);

    Command::cargo_bin("citadel")?
        .arg("boot")
        .arg(&manifest)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("widgets: status"));

    Ok(())
}

#[test]
fn test_boot_times_out_on_pending_section() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "stuck.json", r#"{ "core": { "modules": { "stuck": "demo:never" } } }"#);

    Command::cargo_bin("citadel")?
        .arg("boot")
        .arg(&manifest)
        .arg("--timeout-ms")
        .arg("50")
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out after 50 ms"));

    Ok(())
}

#[test]
fn test_boot_rejects_unknown_strategy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_file(&dir, "app.json", DEMO_MANIFEST);

    Command::cargo_bin("citadel")?
        .arg("boot")
        .arg(&manifest)
        .arg("--strategy")
        .arg("random")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown load strategy"));

    Ok(())
}
