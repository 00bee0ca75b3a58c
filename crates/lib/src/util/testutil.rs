//! In-memory doubles for the filesystem and HTTP capabilities.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flate2::Compression;
use flate2::write::GzEncoder;
use url::Url;

use crate::fs::FileSystem;
use crate::transport::{HttpResponse, Transport, TransportError};

#[derive(Debug, Default)]
struct MemState {
  files: BTreeMap<PathBuf, MemFile>,
  dirs: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct MemFile {
  pub data: Vec<u8>,
  pub executable: bool,
}

/// A [`FileSystem`] that lives entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
  state: Arc<Mutex<MemState>>,
}

impl MemoryFileSystem {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed a file, creating its parent directories.
  pub fn add_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      self.create_dir_all(parent).unwrap();
    }
    self.state.lock().unwrap().files.insert(
      path.to_path_buf(),
      MemFile {
        data: data.into(),
        executable: false,
      },
    );
  }

  pub fn file(&self, path: impl AsRef<Path>) -> Option<MemFile> {
    self.state.lock().unwrap().files.get(path.as_ref()).cloned()
  }

  pub fn file_paths(&self) -> Vec<PathBuf> {
    self.state.lock().unwrap().files.keys().cloned().collect()
  }

  pub fn dir_paths(&self) -> Vec<PathBuf> {
    self.state.lock().unwrap().dirs.iter().cloned().collect()
  }
}

struct MemWriter {
  state: Arc<Mutex<MemState>>,
  path: PathBuf,
}

impl Write for MemWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let mut state = self.state.lock().unwrap();
    let file = state.files.entry(self.path.clone()).or_default();
    file.data.extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

fn not_found(path: &Path) -> io::Error {
  io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

impl FileSystem for MemoryFileSystem {
  fn exists(&self, path: &Path) -> bool {
    let state = self.state.lock().unwrap();
    state.files.contains_key(path) || state.dirs.contains(path)
  }

  fn is_file(&self, path: &Path) -> bool {
    self.state.lock().unwrap().files.contains_key(path)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    let mut state = self.state.lock().unwrap();
    for ancestor in path.ancestors() {
      if ancestor.as_os_str().is_empty() {
        continue;
      }
      if state.files.contains_key(ancestor) {
        return Err(io::Error::new(
          io::ErrorKind::AlreadyExists,
          format!("{} is a file", ancestor.display()),
        ));
      }
      state.dirs.insert(ancestor.to_path_buf());
    }
    Ok(())
  }

  fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
    let mut state = self.state.lock().unwrap();
    match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) => {
        return Err(not_found(parent));
      }
      _ => {}
    }
    state.files.insert(path.to_path_buf(), MemFile::default());
    Ok(Box::new(MemWriter {
      state: Arc::clone(&self.state),
      path: path.to_path_buf(),
    }))
  }

  fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
    let state = self.state.lock().unwrap();
    let file = state.files.get(path).ok_or_else(|| not_found(path))?;
    Ok(Box::new(Cursor::new(file.data.clone())))
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    self.state.lock().unwrap().files.remove(path).map(|_| ()).ok_or_else(|| not_found(path))
  }

  fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    let mut state = self.state.lock().unwrap();
    if !state.dirs.contains(path) {
      return Err(not_found(path));
    }
    state.files.retain(|p, _| !p.starts_with(path));
    state.dirs.retain(|p| !p.starts_with(path));
    Ok(())
  }

  fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
    let mut state = self.state.lock().unwrap();
    let file = state.files.remove(from).ok_or_else(|| not_found(from))?;
    state.files.insert(to.to_path_buf(), file);
    Ok(())
  }

  fn set_executable(&self, path: &Path) -> io::Result<()> {
    let mut state = self.state.lock().unwrap();
    let file = state.files.get_mut(path).ok_or_else(|| not_found(path))?;
    file.executable = true;
    Ok(())
  }
}

/// A canned response for [`FakeTransport`].
#[derive(Debug, Clone)]
pub enum FakeResponse {
  Ok(Vec<u8>),
  Status(u16),
  Redirect(String),
  /// A 302 without a `Location` header.
  RedirectWithoutLocation,
  /// The connection fails before a status is received.
  Fail(String),
  /// Headers arrive but the body breaks off after the given bytes.
  Truncated(Vec<u8>),
}

/// A [`Transport`] that serves canned responses and records every request.
#[derive(Debug, Default)]
pub struct FakeTransport {
  routes: Mutex<HashMap<String, VecDeque<FakeResponse>>>,
  calls: Mutex<Vec<String>>,
}

impl FakeTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serve `response` for `url`. Multiple responses for one URL are served in
  /// order; the last one repeats.
  pub fn route(self, url: impl Into<String>, response: FakeResponse) -> Self {
    self.routes.lock().unwrap().entry(url.into()).or_default().push_back(response);
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

struct BrokenBody {
  data: Cursor<Vec<u8>>,
}

impl Read for BrokenBody {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    match self.data.read(buf)? {
      0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
      n => Ok(n),
    }
  }
}

impl Transport for FakeTransport {
  fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
    self.calls.lock().unwrap().push(url.to_string());

    let response = {
      let mut routes = self.routes.lock().unwrap();
      match routes.get_mut(url.as_str()) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
      }
    };

    let empty = || Box::new(io::empty()) as Box<dyn Read>;
    let response = match response.unwrap_or(FakeResponse::Status(404)) {
      FakeResponse::Ok(data) => HttpResponse {
        status: 200,
        location: None,
        body: Box::new(Cursor::new(data)),
      },
      FakeResponse::Status(status) => HttpResponse {
        status,
        location: None,
        body: empty(),
      },
      FakeResponse::Redirect(location) => HttpResponse {
        status: 302,
        location: Some(location),
        body: empty(),
      },
      FakeResponse::RedirectWithoutLocation => HttpResponse {
        status: 302,
        location: None,
        body: empty(),
      },
      FakeResponse::Fail(message) => {
        return Err(TransportError::Request {
          url: url.to_string(),
          message,
        });
      }
      FakeResponse::Truncated(data) => HttpResponse {
        status: 200,
        location: None,
        body: Box::new(BrokenBody { data: Cursor::new(data) }),
      },
    };

    Ok(response)
  }
}

/// Build a gzipped tarball from `(path, contents)` pairs.
pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
  let encoder = GzEncoder::new(Vec::new(), Compression::default());
  let mut builder = tar::Builder::new(encoder);
  for (path, data) in entries {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, *data).unwrap();
  }
  builder.into_inner().unwrap().finish().unwrap()
}
