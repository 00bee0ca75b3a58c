//! Info command integration tests.

use predicates::prelude::*;

use super::common::{BINARY, TestEnv};

#[test]
fn info_json_describes_target() {
  let env = TestEnv::new();

  let output = env.offline_cmd().args(["info", "--json"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["platform"], "linux-x64");
  assert_eq!(report["supported"], true);
  assert_eq!(report["binary"], BINARY);
  assert_eq!(report["target"]["artifact"], "tool-linux-x64.tar.gz");
  assert_eq!(report["target"]["triple"], "x86_64-unknown-linux-gnu");
  assert!(
    report["target"]["download_url"]
      .as_str()
      .unwrap()
      .ends_with("/acme/tool/releases/download/v1.0.0/tool-linux-x64.tar.gz")
  );
  assert_eq!(report["candidates"].as_array().unwrap().len(), 3);
  assert_eq!(report["candidates"][0]["source"], "installed");
  assert_eq!(report["install"]["status"], "not_installed");
  assert!(report["resolved"].is_null());
}

#[test]
fn info_reads_package_manifest() {
  let env = TestEnv::new();
  std::fs::write(
    env.package_root().join("package.json"),
    r#"{ "name": "tool", "version": "2.5.0", "repository": { "type": "git", "url": "git+https://github.com/other/thing.git" } }"#,
  )
  .unwrap();

  let output = env
    .offline_cmd()
    .env_remove("BINSHIM_VERSION")
    .env_remove("BINSHIM_REPO")
    .args(["info", "--json"])
    .output()
    .unwrap();

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["version"], "2.5.0");
  assert_eq!(report["repository"], "other/thing");
}

#[test]
fn info_text_lists_candidates() {
  let env = TestEnv::new();

  env
    .offline_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Candidates:"))
    .stdout(predicate::str::contains("tool-linux-x64.tar.gz"))
    .stdout(predicate::str::contains("not installed"));
}
