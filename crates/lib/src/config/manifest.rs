//! `package.json` reading.
//!
//! The shim ships inside a package whose manifest already records the release
//! version and the source repository, so those are read from there rather
//! than duplicated into the shim's own configuration.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{ConfigError, RepoIdentity};
use crate::consts::PACKAGE_MANIFEST;

/// The subset of `package.json` the shim cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub repository: Option<Repository>,
}

/// `repository` is either a shorthand string or an object with a `url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Repository {
  Shorthand(String),
  Detailed { url: String },
}

impl PackageManifest {
  /// Load `<package_root>/package.json`.
  ///
  /// A missing manifest yields `Ok(None)`; an unreadable or malformed one is an error.
  pub fn load(package_root: &Path) -> Result<Option<Self>, ConfigError> {
    let path = package_root.join(PACKAGE_MANIFEST);
    if !path.is_file() {
      debug!(path = ?path, "no package manifest");
      return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadManifest {
      path: path.clone(),
      source,
    })?;

    let manifest = serde_json::from_str(&content).map_err(|source| ConfigError::ParseManifest { path, source })?;
    Ok(Some(manifest))
  }

  /// The release repository named by `repository`, if it can be parsed.
  pub fn repository(&self) -> Option<RepoIdentity> {
    let raw = match self.repository.as_ref()? {
      Repository::Shorthand(s) => s,
      Repository::Detailed { url } => url,
    };
    RepoIdentity::parse(raw)
  }
}
