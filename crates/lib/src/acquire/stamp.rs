//! Install stamp: a small JSON record written next to the binary after a
//! successful install.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::fs::FileSystem;
use crate::target::TargetDescriptor;
use crate::util::hash::hash_reader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStamp {
  pub version: String,
  pub artifact: String,
  pub url: String,
  pub sha256: String,
  /// Seconds since the Unix epoch.
  pub installed_at: u64,
}

impl InstallStamp {
  pub fn new(version: &str, artifact: &str, url: &str, sha256: &str) -> Self {
    let installed_at = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or_default();
    Self {
      version: version.to_string(),
      artifact: artifact.to_string(),
      url: url.to_string(),
      sha256: sha256.to_string(),
      installed_at,
    }
  }

  /// `<bin_dir>/.<binary_file_name>.install.json`
  pub fn path(config: &Config, target: &TargetDescriptor) -> PathBuf {
    config.bin_dir().join(format!(".{}.install.json", target.binary_file_name))
  }

  /// Read a stamp. A missing or unreadable stamp is `None`.
  pub fn read(fs: &dyn FileSystem, path: &Path) -> Option<Self> {
    if !fs.is_file(path) {
      return None;
    }
    let bytes = fs.read(path).ok()?;
    match serde_json::from_slice(&bytes) {
      Ok(stamp) => Some(stamp),
      Err(e) => {
        debug!(path = ?path, error = %e, "ignoring unreadable install stamp");
        None
      }
    }
  }

  /// Best effort: a stamp that cannot be written only costs the version
  /// check on the next install.
  pub fn write(&self, fs: &dyn FileSystem, path: &Path) {
    let result = serde_json::to_vec_pretty(self)
      .map_err(std::io::Error::other)
      .and_then(|json| fs.write(path, &json));
    if let Err(e) = result {
      warn!(path = ?path, error = %e, "failed to write install stamp");
    }
  }
}

/// How the binary on disk compares with its stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StampStatus {
  /// No binary at the install location.
  NotInstalled,
  /// Binary present but no stamp (installed by other means).
  Unstamped,
  Verified { version: String },
  /// Binary bytes differ from what was installed.
  Modified { expected: String, actual: String },
  /// Stamp records a different version than the one configured.
  Outdated { installed: String, configured: String },
}

/// Compare the installed binary with its stamp.
pub fn check(config: &Config, target: &TargetDescriptor, fs: &dyn FileSystem) -> StampStatus {
  let binary = config.install_path(target);
  if !fs.is_file(&binary) {
    return StampStatus::NotInstalled;
  }

  let Some(stamp) = InstallStamp::read(fs, &InstallStamp::path(config, target)) else {
    return StampStatus::Unstamped;
  };

  let actual = match fs.open(&binary).and_then(hash_reader) {
    Ok(hash) => hash,
    Err(e) => {
      debug!(path = ?binary, error = %e, "failed to hash installed binary");
      return StampStatus::Unstamped;
    }
  };

  if actual != stamp.sha256 {
    return StampStatus::Modified {
      expected: stamp.sha256,
      actual,
    };
  }

  if stamp.version != config.version {
    return StampStatus::Outdated {
      installed: stamp.version,
      configured: config.version.clone(),
    };
  }

  StampStatus::Verified { version: stamp.version }
}
