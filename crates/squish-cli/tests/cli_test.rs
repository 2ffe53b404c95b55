use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_init_then_validate() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("squish")
        .args(["init", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let config = dir.path().join("squish.yaml");
    assert!(config.exists());

    cargo_bin_cmd!("squish")
        .args(["--config", config.to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid"));

    // a second init must not clobber the file
    cargo_bin_cmd!("squish")
        .args(["init", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already contains"));
}

#[test]
fn test_validate_rejects_bad_test_option() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("squish.yaml");
    std::fs::write(&config, "test:\n  - 42\n").unwrap();

    cargo_bin_cmd!("squish")
        .args(["--config", config.to_str().unwrap(), "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
}

#[test]
fn test_validate_rejects_unknown_plugin() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("squish.yaml");
    std::fs::write(&config, "plugins:\n  - name: mystery\n    options: {}\n").unwrap();

    cargo_bin_cmd!("squish")
        .args(["--config", config.to_str().unwrap(), "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown plugin 'mystery'"));
}

#[test]
fn test_optimize_without_plugins_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("a.png"), [7u8; 64]).unwrap();

    let config = dir.path().join("squish.yaml");
    std::fs::write(&config, "test: '*.png'\n").unwrap();

    cargo_bin_cmd!("squish")
        .args([
            "--config",
            config.to_str().unwrap(),
            "optimize",
            out.to_str().unwrap(),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unchanged\": 1"));

    assert_eq!(std::fs::read(out.join("a.png")).unwrap(), vec![7u8; 64]);
}

#[cfg(unix)]
fn write_truncating_config(dir: &std::path::Path) -> std::path::PathBuf {
    let config = dir.join("squish.yaml");
    std::fs::write(
        &config,
        r#"
test:
  - "**/*.png"
max_concurrency: 2
plugins:
  - name: exec
    options:
      command: head
      args: ["-c", "16"]
"#,
    )
    .unwrap();
    config
}

#[cfg(unix)]
#[test]
fn test_optimize_rewrites_only_matching_smaller_assets() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    std::fs::create_dir_all(out.join("img")).unwrap();
    std::fs::write(out.join("img/big.png"), [1u8; 100]).unwrap();
    std::fs::write(out.join("tiny.png"), [2u8; 8]).unwrap();
    std::fs::write(out.join("app.js"), [3u8; 100]).unwrap();
    let config = write_truncating_config(dir.path());

    let output = cargo_bin_cmd!("squish")
        .args([
            "--config",
            config.to_str().unwrap(),
            "optimize",
            out.to_str().unwrap(),
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["optimized"], 1);
    assert_eq!(report["unchanged"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["assets"]["img/big.png"], "committed");

    assert_eq!(std::fs::read(out.join("img/big.png")).unwrap(), vec![1u8; 16]);
    assert_eq!(std::fs::read(out.join("tiny.png")).unwrap(), vec![2u8; 8]);
    assert_eq!(std::fs::read(out.join("app.js")).unwrap(), vec![3u8; 100]);
}

#[cfg(unix)]
#[test]
fn test_optimize_dry_run_and_test_override() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("a.png"), [1u8; 100]).unwrap();
    std::fs::write(out.join("b.gif"), [1u8; 100]).unwrap();
    let config = write_truncating_config(dir.path());

    cargo_bin_cmd!("squish")
        .args([
            "--config",
            config.to_str().unwrap(),
            "optimize",
            out.to_str().unwrap(),
            "--test",
            "*.gif",
            "--dry-run",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Dry run: 1 assets would be rewritten"));

    assert_eq!(std::fs::read(out.join("a.png")).unwrap(), vec![1u8; 100]);
    assert_eq!(std::fs::read(out.join("b.gif")).unwrap(), vec![1u8; 100]);
}

#[cfg(unix)]
#[test]
fn test_optimize_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("a.png"), [1u8; 100]).unwrap();

    let config = dir.path().join("squish.yaml");
    std::fs::write(
        &config,
        "plugins:\n  - name: exec\n    options:\n      command: \"false\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("squish")
        .args(["--config", config.to_str().unwrap(), "optimize", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.png"));

    assert_eq!(std::fs::read(out.join("a.png")).unwrap(), vec![1u8; 100]);
}
