//! Outcome and error types for the installer.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::platform::PlatformKey;
use crate::transport::TransportError;

/// Options for a single [`Installer::install`](super::Installer::install) run.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
  /// Re-download even when the binary is already present.
  pub force: bool,
}

/// Result of an install run. Installation never fails the caller; problems
/// are reported as [`InstallOutcome::Warned`].
#[derive(Debug)]
pub enum InstallOutcome {
  Installed(InstalledBinary),
  Skipped(SkipReason),
  Warned(InstallError),
}

impl InstallOutcome {
  pub fn is_installed(&self) -> bool {
    matches!(self, Self::Installed(_))
  }
}

#[derive(Debug, Clone)]
pub struct InstalledBinary {
  pub path: PathBuf,
  pub url: String,
  /// Size of the downloaded artifact.
  pub bytes: u64,
  pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// No artifact is published for this platform.
  UnsupportedPlatform { platform: PlatformKey },
  /// The binary is already in place.
  AlreadyInstalled {
    path: PathBuf,
    /// Version recorded by the install stamp, when there is one.
    installed_version: Option<String>,
  },
}

/// Why a download did not produce a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
  /// Final response had a non-2xx status.
  Status(u16),
  /// A redirect response carried no usable `Location`.
  BadRedirect { status: u16, location: Option<String> },
  /// The connection failed or the body broke off.
  Transport(String),
}

impl fmt::Display for DownloadFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Status(status) => write!(f, "HTTP {}", status),
      Self::BadRedirect { status, location: None } => write!(f, "HTTP {} redirect without a Location header", status),
      Self::BadRedirect {
        status,
        location: Some(location),
      } => write!(f, "HTTP {} redirect to invalid location '{}'", status, location),
      Self::Transport(message) => f.write_str(message),
    }
  }
}

#[derive(Debug, Error)]
pub enum InstallError {
  #[error("failed to download {url}: {reason}")]
  DownloadFailed { url: String, reason: DownloadFailure },

  #[error("too many redirects (more than {limit}) while downloading {url}")]
  TooManyRedirects { url: String, limit: usize },

  #[error("failed to extract {archive}: {message}")]
  ExtractFailed { archive: PathBuf, message: String },

  #[error("binary not found at {path} after installation")]
  VerificationFailed { path: PathBuf },

  #[error("I/O error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Transport(#[from] TransportError),
}

impl InstallError {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { path, source }
  }
}
