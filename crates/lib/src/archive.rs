//! `.tar.gz` extraction through the [`FileSystem`] capability.

use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use thiserror::Error;
use tracing::{debug, info};

use crate::fs::FileSystem;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("failed to read archive: {0}")]
  Read(#[source] io::Error),

  #[error("archive entry escapes the destination: {0}")]
  UnsafePath(PathBuf),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("archive contains no files")]
  Empty,
}

struct Unpacked {
  path: PathBuf,
  kind: EntryType,
  data: Vec<u8>,
}

/// Unpack the gzipped tarball at `archive` into `dest`.
///
/// Regular files and directories are extracted; links and special entries are
/// skipped. When every entry sits under one top-level directory, that
/// directory is stripped. Returns the paths of the extracted files.
pub fn unpack_tar_gz(fs: &dyn FileSystem, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
  let reader = fs.open(archive).map_err(ArchiveError::Read)?;
  let mut entries = read_entries(reader)?;

  if !entries.iter().any(|e| e.kind.is_file()) {
    return Err(ArchiveError::Empty);
  }

  if let Some(prefix) = common_root(&entries) {
    debug!(prefix = ?prefix, "stripping top-level directory");
    for entry in &mut entries {
      entry.path = entry.path.strip_prefix(&prefix).map(Path::to_path_buf).unwrap_or_default();
    }
  }

  fs.create_dir_all(dest).map_err(|source| ArchiveError::Write {
    path: dest.to_path_buf(),
    source,
  })?;

  let mut written = Vec::new();
  for entry in entries {
    if entry.path.as_os_str().is_empty() {
      continue;
    }
    let target = dest.join(&entry.path);
    let write_err = |source| ArchiveError::Write {
      path: target.clone(),
      source,
    };

    if entry.kind.is_dir() {
      fs.create_dir_all(&target).map_err(write_err)?;
      continue;
    }

    if let Some(parent) = target.parent() {
      fs.create_dir_all(parent).map_err(write_err)?;
    }
    fs.write(&target, &entry.data).map_err(write_err)?;
    written.push(target);
  }

  info!(archive = ?archive, files = written.len(), "archive unpacked");
  Ok(written)
}

fn read_entries(reader: impl Read) -> Result<Vec<Unpacked>, ArchiveError> {
  let mut archive = Archive::new(GzDecoder::new(reader));
  let mut out = Vec::new();

  for entry in archive.entries().map_err(ArchiveError::Read)? {
    let mut entry = entry.map_err(ArchiveError::Read)?;
    let kind = entry.header().entry_type();
    let raw = entry.path().map_err(ArchiveError::Read)?.into_owned();

    if !kind.is_file() && !kind.is_dir() {
      debug!(path = ?raw, kind = ?kind, "skipping non-regular entry");
      continue;
    }

    let path = sanitize(&raw)?;
    let mut data = Vec::new();
    if kind.is_file() {
      entry.read_to_end(&mut data).map_err(ArchiveError::Read)?;
    }
    out.push(Unpacked { path, kind, data });
  }

  Ok(out)
}

/// Reject absolute paths and parent references; drop `.` components.
fn sanitize(raw: &Path) -> Result<PathBuf, ArchiveError> {
  let mut clean = PathBuf::new();
  for component in raw.components() {
    match component {
      Component::Normal(part) => clean.push(part),
      Component::CurDir => {}
      Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
        return Err(ArchiveError::UnsafePath(raw.to_path_buf()));
      }
    }
  }
  Ok(clean)
}

/// The single top-level directory shared by every entry, if there is one and
/// no file sits directly at the top level.
fn common_root(entries: &[Unpacked]) -> Option<PathBuf> {
  let mut root: Option<&std::ffi::OsStr> = None;
  for entry in entries {
    let mut components = entry.path.components();
    let first = components.next()?.as_os_str();
    if entry.kind.is_file() && components.next().is_none() {
      return None;
    }
    match root {
      None => root = Some(first),
      Some(existing) if existing == first => {}
      Some(_) => return None,
    }
  }
  root.map(PathBuf::from)
}
