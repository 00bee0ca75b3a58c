pub mod arch;
pub mod os;

pub use arch::Arch;
pub use os::Os;

use std::fmt;

/// Normalized (OS, architecture) pair identifying a host (e.g., "linux-x64")
///
/// Built once at startup and never mutated; every other component receives it
/// through [`Config`](crate::config::Config) instead of probing the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey {
  pub os: Os,
  pub arch: Arch,
}

impl PlatformKey {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the platform of the running process
  pub fn current() -> Self {
    Self::new(Os::current(), Arch::current())
  }

  /// Build a key from raw identifiers such as `("win32", "x64")`
  pub fn parse(os: &str, arch: &str) -> Self {
    Self::new(Os::parse(os), Arch::parse(arch))
  }

  /// Returns the key string used in artifact names (e.g., "darwin-arm64")
  pub fn key(&self) -> String {
    format!("{}-{}", self.os, self.arch)
  }
}

impl fmt::Display for PlatformKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.key())
  }
}
