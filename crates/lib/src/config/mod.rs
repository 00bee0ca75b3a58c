//! Explicit configuration shared by the resolver and the installer.
//!
//! `Config` is assembled once at startup ([`Config::load`]) and handed to both
//! components, which never read the environment or the working directory
//! themselves. Every field can be overridden with a `BINSHIM_*` variable;
//! the version and repository otherwise come from the package's
//! `package.json`.

mod manifest;

pub use manifest::{PackageManifest, Repository};

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::consts::{
  BIN_DIR, DEFAULT_BINARY, DEFAULT_DOWNLOAD_BASE, DEFAULT_REPO, DEFAULT_TIMEOUT_SECS, MAX_REDIRECTS,
};
use crate::platform::{Arch, Os, PlatformKey};
use crate::target::{ArtifactScheme, TargetDescriptor};

pub const ENV_PLATFORM: &str = "BINSHIM_PLATFORM";
pub const ENV_ARCH: &str = "BINSHIM_ARCH";
pub const ENV_PACKAGE_ROOT: &str = "BINSHIM_PACKAGE_ROOT";
pub const ENV_VERSION: &str = "BINSHIM_VERSION";
pub const ENV_REPO: &str = "BINSHIM_REPO";
pub const ENV_BINARY: &str = "BINSHIM_BINARY";
pub const ENV_DOWNLOAD_BASE: &str = "BINSHIM_DOWNLOAD_BASE";
pub const ENV_ARTIFACT: &str = "BINSHIM_ARTIFACT";
pub const ENV_TIMEOUT_SECS: &str = "BINSHIM_TIMEOUT_SECS";

/// Errors raised while assembling a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for {var}: {message}")]
  InvalidEnv { var: &'static str, message: String },

  #[error("invalid repository '{0}' (expected 'owner/name')")]
  InvalidRepo(String),

  #[error("invalid download base URL '{url}': {message}")]
  InvalidBaseUrl { url: String, message: String },

  #[error("failed to read {path}: {source}")]
  ReadManifest {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  ParseManifest {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("could not determine the package root: {0}")]
  PackageRoot(#[source] io::Error),
}

/// A GitHub-style `owner/name` repository identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
  pub owner: String,
  pub name: String,
}

impl RepoIdentity {
  pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// Parse the repository spellings found in package manifests.
  ///
  /// Accepts `owner/name`, `github:owner/name`, `git@host:owner/name.git` and
  /// `[git+]https://host/owner/name[.git]`.
  pub fn parse(raw: &str) -> Option<Self> {
    let mut s = raw.trim();
    s = s.strip_prefix("git+").unwrap_or(s);
    s = s.strip_prefix("github:").unwrap_or(s);

    if let Some(rest) = s.strip_prefix("git@") {
      s = rest.split_once(':')?.1;
    } else if let Some((_, rest)) = s.split_once("://") {
      // Drop the host
      s = rest.split_once('/')?.1;
    }

    let s = s.trim_end_matches('/');
    let s = s.strip_suffix(".git").unwrap_or(s);

    let mut parts = s.split('/');
    let owner = parts.next()?;
    let name = parts.next()?;
    if parts.next().is_some() || owner.is_empty() || name.is_empty() {
      return None;
    }

    Some(Self::new(owner, name))
  }
}

impl fmt::Display for RepoIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Everything the resolver and the installer need to know about the host and
/// the release they serve.
#[derive(Debug, Clone)]
pub struct Config {
  pub platform: PlatformKey,
  /// Base name of the program (without `.exe`).
  pub binary: String,
  pub repo: RepoIdentity,
  /// Release version; the tag is `v<version>`.
  pub version: String,
  /// Root of the package the shim ships in; the binary lives in `<root>/bin`.
  pub package_root: PathBuf,
  pub download_base: Url,
  pub scheme: ArtifactScheme,
  pub max_redirects: usize,
  pub timeout: Duration,
  /// `PATH`-style list searched as the last resort when locating the binary.
  pub search_path: Option<OsString>,
}

impl Config {
  /// A configuration with built-in defaults for everything but the platform
  /// and the package root.
  pub fn new(platform: PlatformKey, package_root: impl Into<PathBuf>) -> Self {
    Self {
      platform,
      binary: DEFAULT_BINARY.to_string(),
      repo: default_repo(),
      version: env!("CARGO_PKG_VERSION").to_string(),
      package_root: package_root.into(),
      download_base: default_download_base(),
      scheme: ArtifactScheme::default(),
      max_redirects: MAX_REDIRECTS,
      timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      search_path: None,
    }
  }

  /// Assemble the configuration from the process environment and the
  /// package manifest.
  ///
  /// Precedence per field: `BINSHIM_*` variable, then `package.json`, then
  /// the built-in default.
  pub fn load() -> Result<Self, ConfigError> {
    let os = env_var(ENV_PLATFORM).map(|v| Os::parse(&v)).unwrap_or_else(Os::current);
    let arch = env_var(ENV_ARCH).map(|v| Arch::parse(&v)).unwrap_or_else(Arch::current);

    let package_root = match env_var(ENV_PACKAGE_ROOT) {
      Some(root) => PathBuf::from(root),
      None => default_package_root()?,
    };

    let manifest = PackageManifest::load(&package_root)?;
    let mut config = Self::new(PlatformKey::new(os, arch), package_root);

    if let Some(version) = env_var(ENV_VERSION).or_else(|| manifest.as_ref().and_then(|m| m.version.clone())) {
      config.version = version;
    }

    match env_var(ENV_REPO) {
      Some(raw) => config.repo = RepoIdentity::parse(&raw).ok_or(ConfigError::InvalidRepo(raw))?,
      None => {
        if let Some(repo) = manifest.as_ref().and_then(PackageManifest::repository) {
          config.repo = repo;
        }
      }
    }

    if let Some(binary) = env_var(ENV_BINARY) {
      config.binary = binary;
    }

    if let Some(base) = env_var(ENV_DOWNLOAD_BASE) {
      config.download_base = parse_base_url(&base)?;
    }

    if let Some(scheme) = env_var(ENV_ARTIFACT) {
      config.scheme = scheme.parse::<ArtifactScheme>().map_err(|message| ConfigError::InvalidEnv {
        var: ENV_ARTIFACT,
        message,
      })?;
    }

    if let Some(secs) = env_var(ENV_TIMEOUT_SECS) {
      let secs: u64 = secs.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
        var: ENV_TIMEOUT_SECS,
        message: e.to_string(),
      })?;
      config.timeout = Duration::from_secs(secs);
    }

    config.search_path = std::env::var_os("PATH");

    debug!(
      platform = %config.platform,
      version = %config.version,
      repo = %config.repo,
      package_root = ?config.package_root,
      "configuration loaded"
    );

    Ok(config)
  }

  pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
    self.binary = binary.into();
    self
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = version.into();
    self
  }

  pub fn with_repo(mut self, repo: RepoIdentity) -> Self {
    self.repo = repo;
    self
  }

  pub fn with_download_base(mut self, base: Url) -> Self {
    self.download_base = base;
    self
  }

  pub fn with_scheme(mut self, scheme: ArtifactScheme) -> Self {
    self.scheme = scheme;
    self
  }

  pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
    self.max_redirects = max_redirects;
    self
  }

  pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
    self.search_path = Some(search_path.into());
    self
  }

  /// The artifact descriptor for the configured platform, if one is published.
  pub fn target(&self) -> Option<TargetDescriptor> {
    TargetDescriptor::for_platform(&self.platform, self.scheme, &self.binary)
  }

  /// `<package_root>/bin`
  pub fn bin_dir(&self) -> PathBuf {
    self.package_root.join(BIN_DIR)
  }

  /// Canonical install location of the binary described by `target`.
  pub fn install_path(&self, target: &TargetDescriptor) -> PathBuf {
    self.bin_dir().join(&target.binary_file_name)
  }

  pub fn download_url(&self, target: &TargetDescriptor) -> Url {
    target.release_url(&self.download_base, &self.repo, &self.version)
  }

  /// Directory that contains the package root (companion packages and a
  /// local `target/` build live there).
  pub fn package_parent(&self) -> &Path {
    self.package_root.parent().unwrap_or(&self.package_root)
  }
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_repo() -> RepoIdentity {
  RepoIdentity::parse(DEFAULT_REPO).unwrap_or_else(|| RepoIdentity::new("lsendel", "spec-kit-mcp"))
}

fn default_download_base() -> Url {
  Url::parse(DEFAULT_DOWNLOAD_BASE).expect("DEFAULT_DOWNLOAD_BASE is a valid URL")
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
  let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
    url: raw.to_string(),
    message: e.to_string(),
  })?;

  if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
    return Err(ConfigError::InvalidBaseUrl {
      url: raw.to_string(),
      message: "expected an http(s) URL".to_string(),
    });
  }

  Ok(url)
}

/// The shim is installed as `<root>/bin/binshim`; the root is two levels up.
fn default_package_root() -> Result<PathBuf, ConfigError> {
  let exe = std::env::current_exe().map_err(ConfigError::PackageRoot)?;
  let bin_dir = exe.parent().unwrap_or(&exe);
  Ok(bin_dir.parent().unwrap_or(bin_dir).to_path_buf())
}
