use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn yamlhost() -> Command {
    Command::cargo_bin("yamlhost").expect("binary builds")
}

#[test]
fn test_cli_parse_summary() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Pulumi.yaml");
    fs::write(&file, "name: cli-test\nruntime: yaml\n").unwrap();

    yamlhost()
        .arg("parse")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cli-test\""));
}

#[test]
fn test_cli_plan_outputs_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Pulumi.yaml"),
        r#"name: cli-plan
runtime: yaml
resources:
  bucket:
    type: gcp:storage:Bucket
    properties:
      name: my-bucket
"#,
    )
    .unwrap();

    yamlhost()
        .arg("plan")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("gcp:storage/bucket:Bucket"));
}

#[test]
fn test_cli_graph_outputs_dot() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Pulumi.yaml"),
        r#"name: cli-graph
runtime: yaml
resources:
  a:
    type: t:t:T
  b:
    type: t:t:T
    options:
      dependsOn:
        - ${a}
"#,
    )
    .unwrap();

    yamlhost()
        .arg("graph")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph project"))
        .stdout(predicate::str::contains("\"a\" -> \"b\""));
}

#[test]
fn test_cli_eval_builtin() {
    yamlhost()
        .arg("eval")
        .arg("toBase64")
        .arg("\"hello\"")
        .assert()
        .success()
        .stdout(predicate::str::contains("aGVsbG8="));
}

#[test]
fn test_cli_plan_missing_manifest_fails() {
    let dir = TempDir::new().unwrap();
    yamlhost()
        .arg("plan")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing primary manifest"));
}
