use std::fmt;

/// Operating system component of a [`PlatformKey`](super::PlatformKey)
///
/// Unknown systems are kept as `Other` so an unsupported host can still be
/// named in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  Darwin,
  Windows,
  Other(String),
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Self {
    Self::parse(std::env::consts::OS)
  }

  /// Parse an OS identifier, accepting both Node (`win32`) and Rust (`macos`) spellings
  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "linux" => Self::Linux,
      "darwin" | "macos" => Self::Darwin,
      "win32" | "windows" => Self::Windows,
      other => Self::Other(other.to_string()),
    }
  }

  /// Returns the identifier used in artifact names
  pub fn as_str(&self) -> &str {
    match self {
      Self::Linux => "linux",
      Self::Darwin => "darwin",
      Self::Windows => "win32",
      Self::Other(name) => name,
    }
  }

  pub fn is_windows(&self) -> bool {
    matches!(self, Self::Windows)
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
