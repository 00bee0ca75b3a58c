//! Run command implementation.

use std::ffi::OsString;

use anyhow::{Context, Result};
use tracing::debug;

use binshim_lib::config::Config;
use binshim_lib::fs::OsFileSystem;
use binshim_lib::launch::launch;
use binshim_lib::resolve::Resolver;

use crate::output;

/// Resolve the binary and run it, returning the child's exit code.
pub fn cmd_run(config: &Config, args: &[OsString]) -> Result<i32> {
  let resolved = match Resolver::new(config, &OsFileSystem).resolve() {
    Ok(resolved) => resolved,
    Err(e) => {
      output::failure(&e.to_string());
      return Ok(1);
    }
  };

  debug!(path = ?resolved.path, source = %resolved.source, "resolved binary");

  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  match rt.block_on(launch(&resolved, args)) {
    Ok(code) => Ok(code),
    Err(e) => {
      output::failure(&e.to_string());
      Ok(1)
    }
  }
}
