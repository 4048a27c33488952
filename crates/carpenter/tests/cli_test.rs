#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
mod common;
use common::TestProject;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("イメージを組み立てる"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("version"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("carpenter"));
}

/// buildコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_build_help() {
    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--push"))
        .stdout(predicate::str::contains("--engine"))
        .stdout(predicate::str::contains("--config"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// 設定ファイルがない場合はエラー終了
#[test]
fn test_validate_without_config() {
    let project = TestProject::new();
    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.current_dir(project.path())
        .env_remove("CARPENTER_CONFIG_PATH")
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

/// 要件を満たすプロジェクトは終了コード 0
#[test]
fn test_validate_passing_project() {
    let project = TestProject::go_plugin();
    let config = project.write_config("arcaflow-plugin-example", "0.1.0");

    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.current_dir(project.path())
        .env("CARPENTER_CONFIG_PATH", &config)
        .arg("validate")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("container-definition"));
}

/// 要件を満たさないプロジェクトは終了コード 2
#[test]
fn test_validate_failing_project() {
    let project = TestProject::go_plugin();
    std::fs::remove_file(project.path().join("README.md")).unwrap();
    let config = project.write_config("arcaflow-plugin-example", "0.1.0");

    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2);
}

/// 不正なタグは basic チェックで不合格になる
#[test]
fn test_validate_invalid_tag() {
    let project = TestProject::go_plugin();
    let config = project.write_config("arcaflow-plugin-example", "-bad");

    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2);
}

/// 未対応のエンジン名はエラー終了
#[test]
fn test_build_unknown_engine() {
    let project = TestProject::go_plugin();
    let config = project.write_config("arcaflow-plugin-example", "0.1.0");

    let mut cmd = Command::cargo_bin("carpenter").unwrap();
    cmd.arg("build")
        .arg("--engine")
        .arg("containerd")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("containerd"));
}
