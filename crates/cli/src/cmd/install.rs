//! Install command implementation.
//!
//! Every outcome exits 0 so the package manager running the install hook
//! never fails because of the binary.

use anyhow::Result;

use binshim_lib::acquire::{InstallError, InstallOptions, InstallOutcome, Installer, SkipReason, remediation};
use binshim_lib::config::Config;
use binshim_lib::fs::OsFileSystem;
use binshim_lib::transport::HttpTransport;

use crate::output;

pub fn cmd_install(config: &Config, force: bool) -> Result<i32> {
  let outcome = match HttpTransport::new(config.timeout) {
    Ok(transport) => Installer::new(config, &transport, &OsFileSystem).install(&InstallOptions { force }),
    Err(e) => InstallOutcome::Warned(InstallError::from(e)),
  };

  match outcome {
    InstallOutcome::Installed(installed) => {
      output::success(&format!("Installed {} to {}", config.binary, installed.path.display()));
      output::field("Release", &format!("v{} ({})", config.version, config.repo));
      output::field("Downloaded", &output::human_size(installed.bytes));
      output::field("SHA-256", output::short_digest(&installed.sha256));
    }
    InstallOutcome::Skipped(SkipReason::AlreadyInstalled {
      path,
      installed_version,
    }) => {
      output::note(&format!("{} already installed at {}", config.binary, path.display()));
      if let Some(version) = installed_version
        && version != config.version
      {
        output::warning(&format!(
          "Installed version {} differs from {}; run 'install --force' to replace it",
          version, config.version
        ));
      }
    }
    InstallOutcome::Skipped(SkipReason::UnsupportedPlatform { platform }) => {
      output::warning(&format!("No pre-built {} binary is available for {}", config.binary, platform));
      output::remediation(&remediation(config));
    }
    InstallOutcome::Warned(err) => {
      output::warning(&format!("Failed to install {}: {}", config.binary, err));
      output::remediation(&remediation(config));
    }
  }

  Ok(0)
}
