//! Run-time lookup of the installed binary.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, RepoIdentity};
use crate::consts::APP_NAME;
use crate::fs::FileSystem;
use crate::platform::PlatformKey;
use crate::target::TargetDescriptor;

/// Where a candidate location comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
  /// `<root>/bin`, written by the installer.
  Installed,
  /// A sibling per-platform package.
  CompanionPackage,
  /// A local `cargo build --release` next to the package.
  LocalBuild,
  /// Found on `PATH`.
  SearchPath,
}

impl fmt::Display for CandidateSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Installed => "installed",
      Self::CompanionPackage => "companion package",
      Self::LocalBuild => "local build",
      Self::SearchPath => "PATH",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
  pub path: PathBuf,
  pub source: CandidateSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
  pub path: PathBuf,
  pub source: CandidateSource,
}

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("{}", render_unsupported(.platform, .repo))]
  UnsupportedPlatform { platform: PlatformKey, repo: RepoIdentity },

  #[error("{}", render_not_found(.binary, .repo, .searched))]
  BinaryNotFound {
    binary: String,
    repo: RepoIdentity,
    searched: Vec<PathBuf>,
  },
}

fn render_unsupported(platform: &PlatformKey, repo: &RepoIdentity) -> String {
  format!(
    "unsupported platform: {}\n\nNo pre-built binary is published for this platform.\nBuild from source: https://github.com/{}",
    platform, repo
  )
}

fn render_not_found(binary: &str, repo: &RepoIdentity, searched: &[PathBuf]) -> String {
  let mut msg = format!("{} binary not found\n\nSearched locations:\n", binary);
  for path in searched {
    msg.push_str(&format!("  - {}\n", path.display()));
  }
  msg.push_str("  - PATH\n\nPlease install using one of these methods:\n");
  msg.push_str(&format!("  1. cargo install {} (recommended)\n", binary));
  msg.push_str(&format!("  2. {} install --force\n", APP_NAME));
  msg.push_str(&format!("  3. Build from source: https://github.com/{}", repo));
  msg
}

/// Finds the binary among the candidate locations, then on `PATH`.
pub struct Resolver<'a> {
  config: &'a Config,
  fs: &'a dyn FileSystem,
}

impl<'a> Resolver<'a> {
  pub fn new(config: &'a Config, fs: &'a dyn FileSystem) -> Self {
    Self { config, fs }
  }

  /// Candidate locations for `target`, highest priority first. `PATH` is
  /// not included.
  pub fn candidates(&self, target: &TargetDescriptor) -> Vec<Candidate> {
    let name = &target.binary_file_name;
    let parent = self.config.package_parent();
    vec![
      Candidate {
        path: self.config.install_path(target),
        source: CandidateSource::Installed,
      },
      Candidate {
        path: parent.join(&target.platform_dir).join("bin").join(name),
        source: CandidateSource::CompanionPackage,
      },
      Candidate {
        path: parent.join("target").join("release").join(name),
        source: CandidateSource::LocalBuild,
      },
    ]
  }

  pub fn resolve(&self) -> Result<ResolvedBinary, ResolveError> {
    let target = self.config.target().ok_or_else(|| ResolveError::UnsupportedPlatform {
      platform: self.config.platform.clone(),
      repo: self.config.repo.clone(),
    })?;

    let candidates = self.candidates(&target);
    for candidate in &candidates {
      if self.fs.is_file(&candidate.path) {
        debug!(path = ?candidate.path, source = %candidate.source, "binary found");
        return Ok(ResolvedBinary {
          path: candidate.path.clone(),
          source: candidate.source,
        });
      }
      debug!(path = ?candidate.path, "no binary at candidate");
    }

    if let Some(path) = self.search_path(&target.binary_file_name) {
      debug!(path = ?path, "binary found on PATH");
      return Ok(ResolvedBinary {
        path,
        source: CandidateSource::SearchPath,
      });
    }

    Err(ResolveError::BinaryNotFound {
      binary: self.config.binary.clone(),
      repo: self.config.repo.clone(),
      searched: candidates.into_iter().map(|c| c.path).collect(),
    })
  }

  fn search_path(&self, name: &str) -> Option<PathBuf> {
    let paths = self.config.search_path.as_ref()?;
    which::which_in(name, Some(paths), Path::new(".")).ok()
  }
}
