//! Install command integration tests against a mock release server.

use predicates::prelude::*;

use super::common::{BINARY, LINUX_ASSET, SCRIPT, TestEnv, tar_gz};

#[test]
fn install_downloads_and_extracts() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let asset = server
    .mock("GET", LINUX_ASSET)
    .with_status(200)
    .with_body(tar_gz(&[(BINARY, SCRIPT)]))
    .create();

  env
    .cmd(&server.url())
    .arg("install")
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed tool"));

  asset.assert();
  let binary = env.bin_dir().join(BINARY);
  assert_eq!(std::fs::read(&binary).unwrap(), SCRIPT);
  assert!(!env.bin_dir().join("tool-linux-x64.tar.gz").exists());
  assert!(env.bin_dir().join(".tool.install.json").exists());

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
  }
}

#[test]
fn install_follows_redirect_chain() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let first = server
    .mock("GET", LINUX_ASSET)
    .with_status(302)
    .with_header("location", "/cdn/hop")
    .create();
  let second = server
    .mock("GET", "/cdn/hop")
    .with_status(301)
    .with_header("location", "/cdn/blob")
    .create();
  let blob = server
    .mock("GET", "/cdn/blob")
    .with_body(tar_gz(&[("tool-1.0.0/tool", SCRIPT)]))
    .create();

  env.cmd(&server.url()).arg("install").assert().success();

  first.assert();
  second.assert();
  blob.assert();
  assert_eq!(std::fs::read(env.bin_dir().join(BINARY)).unwrap(), SCRIPT);
}

#[test]
fn second_install_makes_no_requests() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let asset = server
    .mock("GET", LINUX_ASSET)
    .with_body(tar_gz(&[(BINARY, SCRIPT)]))
    .expect(1)
    .create();

  env.cmd(&server.url()).arg("install").assert().success();
  let before = std::fs::read(env.bin_dir().join(BINARY)).unwrap();

  env
    .cmd(&server.url())
    .arg("install")
    .assert()
    .success()
    .stdout(predicate::str::contains("already installed"));

  asset.assert();
  assert_eq!(std::fs::read(env.bin_dir().join(BINARY)).unwrap(), before);
}

#[test]
fn force_reinstalls() {
  let env = TestEnv::new();
  std::fs::create_dir_all(env.bin_dir()).unwrap();
  std::fs::write(env.bin_dir().join(BINARY), "stale").unwrap();

  let mut server = mockito::Server::new();
  let asset = server
    .mock("GET", LINUX_ASSET)
    .with_body(tar_gz(&[(BINARY, SCRIPT)]))
    .create();

  env.cmd(&server.url()).args(["install", "--force"]).assert().success();

  asset.assert();
  assert_eq!(std::fs::read(env.bin_dir().join(BINARY)).unwrap(), SCRIPT);
}

#[test]
fn http_error_warns_and_exits_0() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let asset = server.mock("GET", LINUX_ASSET).with_status(404).create();

  env
    .cmd(&server.url())
    .arg("install")
    .assert()
    .success()
    .stderr(predicate::str::contains("HTTP 404"))
    .stdout(predicate::str::contains("cargo install tool"))
    .stdout(predicate::str::contains("https://github.com/acme/tool.git"));

  asset.assert();
  assert!(!env.bin_dir().join(BINARY).exists());
  assert!(!env.bin_dir().join("tool-linux-x64.tar.gz").exists());
}

#[test]
fn endless_redirects_warn_and_exit_0() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let asset = server
    .mock("GET", LINUX_ASSET)
    .with_status(302)
    .with_header("location", LINUX_ASSET)
    .expect(6)
    .create();

  env
    .cmd(&server.url())
    .arg("install")
    .assert()
    .success()
    .stderr(predicate::str::contains("too many redirects"));

  asset.assert();
  assert!(!env.bin_dir().join(BINARY).exists());
}

#[test]
fn windows_target_gets_exe_without_chmod() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let asset = server
    .mock("GET", "/acme/tool/releases/download/v1.0.0/tool-win32-x64.tar.gz")
    .with_body(tar_gz(&[("tool.exe", b"MZ")]))
    .create();

  env
    .cmd(&server.url())
    .env("BINSHIM_PLATFORM", "win32")
    .arg("install")
    .assert()
    .success();

  asset.assert();
  let binary = env.bin_dir().join("tool.exe");
  assert!(binary.exists());

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0);
  }
}

#[test]
fn unsupported_platform_never_contacts_server() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let any = server.mock("GET", mockito::Matcher::Any).expect(0).create();

  env
    .cmd(&server.url())
    .env("BINSHIM_PLATFORM", "freebsd")
    .arg("install")
    .assert()
    .success();

  any.assert();
  assert!(!env.bin_dir().exists());
}

#[test]
fn direct_artifact_is_installed_in_place() {
  let env = TestEnv::new();
  let mut server = mockito::Server::new();
  let asset = server
    .mock(
      "GET",
      "/acme/tool/releases/download/v1.0.0/tool-x86_64-unknown-linux-gnu",
    )
    .with_body(SCRIPT)
    .create();

  env
    .cmd(&server.url())
    .env("BINSHIM_ARTIFACT", "direct")
    .arg("install")
    .assert()
    .success();

  asset.assert();
  assert_eq!(std::fs::read(env.bin_dir().join(BINARY)).unwrap(), SCRIPT);
  assert!(!env.bin_dir().join("tool.part").exists());
}
