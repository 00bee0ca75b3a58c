use std::fmt;

/// CPU architecture component of a [`PlatformKey`](super::PlatformKey)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
  X64,
  Arm64,
  Other(String),
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Self {
    Self::parse(std::env::consts::ARCH)
  }

  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "x64" | "x86_64" | "amd64" => Self::X64,
      "arm64" | "aarch64" => Self::Arm64,
      other => Self::Other(other.to_string()),
    }
  }

  /// Returns the identifier used in artifact names
  pub fn as_str(&self) -> &str {
    match self {
      Self::X64 => "x64",
      Self::Arm64 => "arm64",
      Self::Other(name) => name,
    }
  }

  /// Returns the architecture as spelled in Rust target triples
  pub fn triple_prefix(&self) -> &str {
    match self {
      Self::X64 => "x86_64",
      Self::Arm64 => "aarch64",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
