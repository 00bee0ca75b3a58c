//! Run the resolved binary as a child process.
//!
//! stdio is inherited and arguments are passed through verbatim (no shell).
//! Interrupt and terminate signals delivered to the shim are relayed to the
//! child; the shim only exits once the child has.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::resolve::ResolvedBinary;

#[derive(Debug, Error)]
pub enum LaunchError {
  #[error("failed to start {}: {source}", .path.display())]
  SpawnFailed {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed waiting for {}: {source}", .path.display())]
  Wait {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to install signal handler: {0}")]
  SignalHandler(#[source] io::Error),
}

/// Spawn `binary` with `args` and wait for it, returning the exit code to
/// propagate. A child that reports no code (killed by a signal) yields 0.
///
/// Signal handlers are registered before the child is spawned, so a signal
/// that arrives while the child starts up is still relayed.
pub async fn launch(binary: &ResolvedBinary, args: &[OsString]) -> Result<i32, LaunchError> {
  info!(path = ?binary.path, source = %binary.source, args = args.len(), "launching");

  let mut relay = SignalRelay::install()?;

  let mut child = Command::new(&binary.path)
    .args(args)
    .stdin(Stdio::inherit())
    .stdout(Stdio::inherit())
    .stderr(Stdio::inherit())
    .spawn()
    .map_err(|source| LaunchError::SpawnFailed {
      path: binary.path.clone(),
      source,
    })?;

  let status = relay.wait(&mut child).await.map_err(|source| LaunchError::Wait {
    path: binary.path.clone(),
    source,
  })?;

  Ok(exit_code(status))
}

fn exit_code(status: ExitStatus) -> i32 {
  match status.code() {
    Some(code) => code,
    None => {
      #[cfg(unix)]
      {
        use std::os::unix::process::ExitStatusExt;
        debug!(signal = ?status.signal(), "child terminated by signal");
      }
      0
    }
  }
}

/// Interrupt and terminate handlers held for the lifetime of the child.
#[cfg(unix)]
struct SignalRelay {
  sigint: tokio::signal::unix::Signal,
  sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalRelay {
  fn install() -> Result<Self, LaunchError> {
    use tokio::signal::unix::{SignalKind, signal};

    Ok(Self {
      sigint: signal(SignalKind::interrupt()).map_err(LaunchError::SignalHandler)?,
      sigterm: signal(SignalKind::terminate()).map_err(LaunchError::SignalHandler)?,
    })
  }

  async fn wait(&mut self, child: &mut Child) -> io::Result<ExitStatus> {
    use rustix::process::Signal;

    let pid = child.id();
    loop {
      tokio::select! {
        status = child.wait() => return status,
        Some(()) = self.sigint.recv() => forward_signal(pid, Signal::INT),
        Some(()) = self.sigterm.recv() => forward_signal(pid, Signal::TERM),
      }
    }
  }
}

/// Send `signal` to the child; errors are logged, not propagated, since the
/// child may already be gone.
#[cfg(unix)]
fn forward_signal(pid: Option<u32>, signal: rustix::process::Signal) {
  let Some(pid) = pid.and_then(|raw| i32::try_from(raw).ok()).and_then(rustix::process::Pid::from_raw) else {
    return;
  };
  match rustix::process::kill_process(pid, signal) {
    Ok(()) => debug!(pid = pid.as_raw_nonzero().get(), signal = ?signal, "signal forwarded to child"),
    Err(e) => debug!(error = %e, signal = ?signal, "failed to forward signal"),
  }
}

// The console delivers Ctrl-C to every process attached to it, the child
// included; keep waiting for the child to decide.
#[cfg(windows)]
struct SignalRelay {
  ctrl_c: tokio::signal::windows::CtrlC,
  ctrl_break: tokio::signal::windows::CtrlBreak,
}

#[cfg(windows)]
impl SignalRelay {
  fn install() -> Result<Self, LaunchError> {
    use tokio::signal::windows;

    Ok(Self {
      ctrl_c: windows::ctrl_c().map_err(LaunchError::SignalHandler)?,
      ctrl_break: windows::ctrl_break().map_err(LaunchError::SignalHandler)?,
    })
  }

  async fn wait(&mut self, child: &mut Child) -> io::Result<ExitStatus> {
    loop {
      tokio::select! {
        status = child.wait() => return status,
        Some(()) = self.ctrl_c.recv() => debug!("Ctrl+C received, waiting for child"),
        Some(()) = self.ctrl_break.recv() => debug!("Ctrl+Break received, waiting for child"),
      }
    }
  }
}
