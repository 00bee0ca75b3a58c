//! Info command implementation.
//!
//! Shows the detected platform, the artifact that would be downloaded, every
//! candidate location and the state of the install stamp.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use binshim_lib::acquire::stamp::{self, StampStatus};
use binshim_lib::config::Config;
use binshim_lib::fs::{FileSystem, OsFileSystem};
use binshim_lib::resolve::{CandidateSource, Resolver};

use crate::output;

#[derive(Debug, Serialize)]
struct InfoReport {
  shim_version: &'static str,
  platform: String,
  supported: bool,
  binary: String,
  version: String,
  repository: String,
  package_root: PathBuf,
  target: Option<TargetReport>,
  candidates: Vec<CandidateReport>,
  resolved: Option<PathBuf>,
  install: Option<StampStatus>,
}

#[derive(Debug, Serialize)]
struct TargetReport {
  triple: &'static str,
  artifact: String,
  download_url: String,
}

#[derive(Debug, Serialize)]
struct CandidateReport {
  path: PathBuf,
  source: CandidateSource,
  exists: bool,
}

fn build_report(config: &Config, fs: &dyn FileSystem) -> InfoReport {
  let target = config.target();
  let resolver = Resolver::new(config, fs);

  let candidates = target
    .as_ref()
    .map(|t| {
      resolver
        .candidates(t)
        .into_iter()
        .map(|c| CandidateReport {
          exists: fs.is_file(&c.path),
          path: c.path,
          source: c.source,
        })
        .collect()
    })
    .unwrap_or_default();

  InfoReport {
    shim_version: env!("CARGO_PKG_VERSION"),
    platform: config.platform.to_string(),
    supported: target.is_some(),
    binary: config.binary.clone(),
    version: config.version.clone(),
    repository: config.repo.to_string(),
    package_root: config.package_root.clone(),
    target: target.as_ref().map(|t| TargetReport {
      triple: t.target_triple,
      artifact: t.artifact_name.clone(),
      download_url: config.download_url(t).to_string(),
    }),
    candidates,
    resolved: resolver.resolve().ok().map(|r| r.path),
    install: target.as_ref().map(|t| stamp::check(config, t, fs)),
  }
}

pub fn cmd_info(config: &Config, json: bool) -> Result<i32> {
  let report = build_report(config, &OsFileSystem);

  if json {
    output::json(&report)?;
    return Ok(0);
  }

  output::note(&format!("binshim v{}", report.shim_version));
  output::field("Platform", &report.platform);
  output::field("Binary", &report.binary);
  output::field("Version", &report.version);
  output::field("Repository", &report.repository);
  output::field("Package root", &report.package_root.display().to_string());

  let Some(target) = &report.target else {
    println!();
    output::warning(&format!("No pre-built binary is published for {}", report.platform));
    return Ok(0);
  };

  println!();
  output::field("Target", target.triple);
  output::field("Artifact", &target.artifact);
  output::field("Download URL", &target.download_url);

  println!();
  println!("Candidates:");
  for candidate in &report.candidates {
    output::candidate(&candidate.path, candidate.source, candidate.exists);
  }

  println!();
  match &report.resolved {
    Some(path) => output::success(&format!("Resolved: {}", path.display())),
    None => output::warning("Binary not found"),
  }

  if let Some(status) = &report.install {
    output::field("Install", &describe(status));
  }

  Ok(0)
}

fn describe(status: &StampStatus) -> String {
  match status {
    StampStatus::NotInstalled => "not installed".to_string(),
    StampStatus::Unstamped => "present, no install record".to_string(),
    StampStatus::Verified { version } => format!("v{} (checksum verified)", version),
    StampStatus::Modified { expected, actual } => format!(
      "modified since install (expected {}, found {})",
      output::short_digest(expected),
      output::short_digest(actual)
    ),
    StampStatus::Outdated { installed, configured } => {
      format!("v{} installed, v{} configured", installed, configured)
    }
  }
}
