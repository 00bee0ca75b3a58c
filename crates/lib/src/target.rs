//! Mapping from a [`PlatformKey`] to the release artifact that serves it.
//!
//! Two naming schemes exist for release artifacts. The archive scheme is the
//! canonical one:
//!
//! - `Archive`: `<binary>-<os>-<arch>.tar.gz`, e.g. `spec-kit-mcp-linux-x64.tar.gz`
//! - `Direct`: `<binary>-<target triple>[.exe]`, e.g. `spec-kit-mcp-x86_64-pc-windows-msvc.exe`

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::config::RepoIdentity;
use crate::consts::COMPANION_PREFIX;
use crate::platform::{Arch, Os, PlatformKey};

/// How a release publishes its binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactScheme {
  /// A gzip-compressed tarball that has to be unpacked.
  #[default]
  Archive,
  /// The executable itself, named after its target triple.
  Direct,
}

impl ArtifactScheme {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Archive => "archive",
      Self::Direct => "direct",
    }
  }
}

impl fmt::Display for ArtifactScheme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for ArtifactScheme {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "archive" | "tar.gz" | "tgz" => Ok(Self::Archive),
      "direct" | "binary" => Ok(Self::Direct),
      other => Err(format!("unknown artifact scheme '{}' (expected 'archive' or 'direct')", other)),
    }
  }
}

/// The canonical artifact identity for one supported platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
  /// File name of the executable once installed (`spec-kit-mcp.exe` on Windows).
  pub binary_file_name: String,
  /// File name of the release asset to download.
  pub artifact_name: String,
  /// Directory name of the companion package that may bundle the binary.
  pub platform_dir: String,
  /// Rust target triple the binary was built for.
  pub target_triple: &'static str,
  pub scheme: ArtifactScheme,
}

impl TargetDescriptor {
  /// Compute the descriptor for `platform`.
  ///
  /// Returns `None` for platforms without a published binary; that state is
  /// terminal and callers must not retry.
  pub fn for_platform(platform: &PlatformKey, scheme: ArtifactScheme, binary: &str) -> Option<Self> {
    let target_triple = target_triple(platform)?;
    let exe_suffix = if platform.os.is_windows() { ".exe" } else { "" };

    let artifact_name = match scheme {
      ArtifactScheme::Archive => format!("{}-{}.tar.gz", binary, platform.key()),
      ArtifactScheme::Direct => format!("{}-{}{}", binary, target_triple, exe_suffix),
    };

    Some(Self {
      binary_file_name: format!("{}{}", binary, exe_suffix),
      artifact_name,
      platform_dir: format!("{}-{}", COMPANION_PREFIX, platform.key()),
      target_triple,
      scheme,
    })
  }

  pub fn is_archive(&self) -> bool {
    self.scheme == ArtifactScheme::Archive
  }

  /// Build `<base>/<owner>/<repo>/releases/download/v<version>/<artifact>`.
  pub fn release_url(&self, base: &Url, repo: &RepoIdentity, version: &str) -> Url {
    let tag = if version.starts_with('v') {
      version.to_string()
    } else {
      format!("v{}", version)
    };

    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().extend([
        repo.owner.as_str(),
        repo.name.as_str(),
        "releases",
        "download",
        tag.as_str(),
        self.artifact_name.as_str(),
      ]);
    }
    url
  }
}

fn target_triple(platform: &PlatformKey) -> Option<&'static str> {
  match (&platform.os, &platform.arch) {
    (Os::Darwin, Arch::Arm64) => Some("aarch64-apple-darwin"),
    (Os::Darwin, Arch::X64) => Some("x86_64-apple-darwin"),
    (Os::Linux, Arch::X64) => Some("x86_64-unknown-linux-gnu"),
    (Os::Windows, Arch::X64) => Some("x86_64-pc-windows-msvc"),
    _ => None,
  }
}
