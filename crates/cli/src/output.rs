//! Terminal reporting for install and resolve results.
//!
//! Status lines go to stdout, problems to stderr, so a package manager that
//! only surfaces stderr still shows warnings.

use std::fmt::Display;
use std::path::Path;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

const OK: &str = "✓";
const FAIL: &str = "✗";
const WARN: &str = "⚠";
const NOTE: &str = "•";
const ABSENT: &str = "·";

pub fn success(message: &str) {
  println!("{} {}", OK.if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn failure(message: &str) {
  eprintln!(
    "{} {}",
    FAIL.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn warning(message: &str) {
  eprintln!(
    "{} {}",
    WARN.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn note(message: &str) {
  println!("{} {}", NOTE.if_supports_color(Stream::Stdout, |s| s.cyan()), message);
}

/// An aligned `label: value` line.
pub fn field(label: &str, value: &str) {
  let label = format!("{:<14}", format!("{}:", label));
  println!("  {}{}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// Numbered manual install steps.
pub fn remediation(steps: &[String]) {
  println!();
  println!("Install it manually with one of:");
  for (i, step) in steps.iter().enumerate() {
    println!("  {}. {}", i + 1, step);
  }
}

/// One resolver candidate, marked by whether a binary is there.
pub fn candidate(path: &Path, source: impl Display, exists: bool) {
  let marker = if exists { OK } else { ABSENT };
  println!(
    "  {} {} {}",
    marker.if_supports_color(Stream::Stdout, |s| s.green()),
    path.display(),
    format!("({})", source).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

pub fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("failed to serialize JSON output")?;
  println!("{}", json);
  Ok(())
}

/// Leading 12 hex digits of a SHA-256 digest.
pub fn short_digest(digest: &str) -> &str {
  digest.get(..12).unwrap_or(digest)
}

/// Download size with a binary unit (`4.2 MiB`).
pub fn human_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
  if bytes < 1024 {
    return format!("{} B", bytes);
  }
  let mut size = bytes as f64 / 1024.0;
  let mut unit = 0;
  while size >= 1024.0 && unit < UNITS.len() - 1 {
    size /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", size, UNITS[unit])
}
