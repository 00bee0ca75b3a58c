//! Filesystem capability.
//!
//! The resolver and the installer touch the disk only through [`FileSystem`],
//! so tests can substitute an in-memory implementation.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// The filesystem operations the shim needs.
pub trait FileSystem {
  /// Whether anything (file or directory) exists at `path`.
  fn exists(&self, path: &Path) -> bool;

  /// Whether `path` is an existing regular file (symlinks followed).
  fn is_file(&self, path: &Path) -> bool;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Create or truncate `path` for writing.
  fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;

  fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

  fn remove_file(&self, path: &Path) -> io::Result<()>;

  /// Remove a directory and everything below it.
  fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Move `from` to `to`, replacing `to` if it exists.
  fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

  /// Mark `path` as executable (mode 0755). A no-op where permissions have no
  /// executable bit.
  fn set_executable(&self, path: &Path) -> io::Result<()>;

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    self.open(path)?.read_to_end(&mut buf)?;
    Ok(buf)
  }

  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = self.create(path)?;
    file.write_all(contents)?;
    file.flush()
  }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
    Ok(Box::new(BufWriter::new(File::create(path)?)))
  }

  fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
    Ok(Box::new(BufReader::new(File::open(path)?)))
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    fs::remove_file(path)
  }

  fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
  }

  fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
    // Windows refuses to rename over an existing file
    #[cfg(windows)]
    if to.exists() {
      fs::remove_file(to)?;
    }
    fs::rename(from, to)
  }

  #[cfg(unix)]
  fn set_executable(&self, path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
  }

  #[cfg(not(unix))]
  fn set_executable(&self, _path: &Path) -> io::Result<()> {
    Ok(())
  }
}
