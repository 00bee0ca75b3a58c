//! Install-time acquisition of the platform binary.
//!
//! [`Installer::install`] walks a fixed sequence of steps:
//!
//! 1. platform check: no published artifact means skip, no network
//! 2. idempotence check: an existing binary means skip, no network
//! 3. download, following at most `max_redirects` redirects
//! 4. extract (archive artifacts only) into a staging directory, rename the
//!    files into place, then remove the archive
//! 5. finalize: mark executable on non-Windows targets
//! 6. verify the binary exists
//!
//! Any failure in steps 3-6 is returned as [`InstallOutcome::Warned`] so the
//! surrounding package install still succeeds.

mod download;
pub mod stamp;
mod types;

pub use download::{download_to, fetch_following_redirects};
pub use stamp::{InstallStamp, StampStatus};
pub use types::{DownloadFailure, InstallError, InstallOptions, InstallOutcome, InstalledBinary, SkipReason};

use std::path::Path;

use tracing::{debug, info, warn};

use crate::archive::unpack_tar_gz;
use crate::config::Config;
use crate::fs::FileSystem;
use crate::target::TargetDescriptor;
use crate::transport::Transport;
use crate::util::hash::hash_reader;

pub struct Installer<'a> {
  config: &'a Config,
  transport: &'a dyn Transport,
  fs: &'a dyn FileSystem,
}

impl<'a> Installer<'a> {
  pub fn new(config: &'a Config, transport: &'a dyn Transport, fs: &'a dyn FileSystem) -> Self {
    Self { config, transport, fs }
  }

  pub fn install(&self, options: &InstallOptions) -> InstallOutcome {
    let Some(target) = self.config.target() else {
      warn!(platform = %self.config.platform, "no pre-built binary is published for this platform");
      return InstallOutcome::Skipped(SkipReason::UnsupportedPlatform {
        platform: self.config.platform.clone(),
      });
    };

    let install_path = self.config.install_path(&target);
    if self.fs.exists(&install_path) && !options.force {
      let stamp = InstallStamp::read(self.fs, &InstallStamp::path(self.config, &target));
      if let Some(stamp) = &stamp
        && stamp.version != self.config.version
      {
        warn!(
          installed = %stamp.version,
          configured = %self.config.version,
          "installed binary is from a different release; run with --force to replace it"
        );
      }
      info!(path = ?install_path, "binary already installed");
      return InstallOutcome::Skipped(SkipReason::AlreadyInstalled {
        path: install_path,
        installed_version: stamp.map(|s| s.version),
      });
    }

    match self.acquire(&target, &install_path, options) {
      Ok(installed) => {
        info!(path = ?installed.path, "binary installed");
        InstallOutcome::Installed(installed)
      }
      Err(err) => {
        warn!(error = %err, "binary installation failed");
        InstallOutcome::Warned(err)
      }
    }
  }

  fn acquire(
    &self,
    target: &TargetDescriptor,
    install_path: &Path,
    options: &InstallOptions,
  ) -> Result<InstalledBinary, InstallError> {
    let bin_dir = self.config.bin_dir();
    self.fs.create_dir_all(&bin_dir).map_err(InstallError::io(&bin_dir))?;

    let url = self.config.download_url(target);
    let max_redirects = self.config.max_redirects;

    let bytes = if target.is_archive() {
      let archive = bin_dir.join(&target.artifact_name);
      let bytes = download_to(self.transport, self.fs, &url, &archive, max_redirects)?;
      if options.force && self.fs.exists(install_path) {
        debug!(path = ?install_path, "replacing existing binary");
      }
      self.extract_into_place(target, &archive, &bin_dir)?;
      self.fs.remove_file(&archive).map_err(InstallError::io(&archive))?;
      bytes
    } else {
      let partial = bin_dir.join(format!("{}.part", target.binary_file_name));
      let bytes = download_to(self.transport, self.fs, &url, &partial, max_redirects)?;
      self.fs.rename(&partial, install_path).map_err(InstallError::io(install_path))?;
      bytes
    };

    if !self.fs.is_file(install_path) {
      return Err(InstallError::VerificationFailed {
        path: install_path.to_path_buf(),
      });
    }

    if !self.config.platform.os.is_windows() {
      debug!(path = ?install_path, "marking binary executable");
      self.fs.set_executable(install_path).map_err(InstallError::io(install_path))?;
    }

    let sha256 = self
      .fs
      .open(install_path)
      .and_then(hash_reader)
      .map_err(InstallError::io(install_path))?;

    InstallStamp::new(&self.config.version, &target.artifact_name, url.as_str(), &sha256)
      .write(self.fs, &InstallStamp::path(self.config, target));

    Ok(InstalledBinary {
      path: install_path.to_path_buf(),
      url: url.to_string(),
      bytes,
      sha256,
    })
  }

  /// Unpacks `archive` into a staging directory under `bin_dir`, then renames
  /// the unpacked files over their destinations. An existing binary is only
  /// replaced once its successor is fully on disk.
  fn extract_into_place(&self, target: &TargetDescriptor, archive: &Path, bin_dir: &Path) -> Result<(), InstallError> {
    let staging = bin_dir.join(format!(".{}.extract", target.binary_file_name));
    if self.fs.exists(&staging) {
      self.fs.remove_dir_all(&staging).map_err(InstallError::io(&staging))?;
    }
    self.fs.create_dir_all(&staging).map_err(InstallError::io(&staging))?;

    let unpacked = match unpack_tar_gz(self.fs, archive, &staging) {
      Ok(unpacked) => unpacked,
      Err(e) => {
        self.discard_staging(&staging);
        return Err(InstallError::ExtractFailed {
          archive: archive.to_path_buf(),
          message: e.to_string(),
        });
      }
    };

    if !self.fs.is_file(&staging.join(&target.binary_file_name)) {
      self.discard_staging(&staging);
      return Err(InstallError::VerificationFailed {
        path: bin_dir.join(&target.binary_file_name),
      });
    }

    for staged in &unpacked {
      let Ok(relative) = staged.strip_prefix(&staging) else {
        continue;
      };
      let dest = bin_dir.join(relative);
      if let Some(parent) = dest.parent() {
        self.fs.create_dir_all(parent).map_err(InstallError::io(parent))?;
      }
      self.fs.rename(staged, &dest).map_err(InstallError::io(&dest))?;
    }

    self.discard_staging(&staging);
    Ok(())
  }

  fn discard_staging(&self, staging: &Path) {
    if let Err(e) = self.fs.remove_dir_all(staging) {
      debug!(path = ?staging, error = %e, "failed to remove staging directory");
    }
  }
}

/// Ways to get the binary when the automatic install cannot.
pub fn remediation(config: &Config) -> Vec<String> {
  vec![
    format!("Install with cargo: cargo install {}", config.binary),
    format!(
      "Build from source: git clone https://github.com/{}.git && cd {} && cargo build --release",
      config.repo, config.repo.name
    ),
  ]
}
