//! Bounded-redirect download to a file.

use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info};
use url::Url;

use super::types::{DownloadFailure, InstallError};
use crate::fs::FileSystem;
use crate::transport::{HttpResponse, Transport};

/// GET `url`, following at most `max_redirects` redirects.
///
/// Relative `Location` headers are resolved against the URL that returned
/// them. Returns the final URL and its successful response.
pub fn fetch_following_redirects(
  transport: &dyn Transport,
  url: &Url,
  max_redirects: usize,
) -> Result<(Url, HttpResponse), InstallError> {
  let mut current = url.clone();
  let mut hops = 0;

  loop {
    let response = transport.get(&current).map_err(|e| InstallError::DownloadFailed {
      url: current.to_string(),
      reason: DownloadFailure::Transport(e.to_string()),
    })?;

    if response.is_redirect() {
      let status = response.status;
      let next = response
        .location
        .as_deref()
        .and_then(|location| current.join(location).ok())
        .ok_or_else(|| InstallError::DownloadFailed {
          url: current.to_string(),
          reason: DownloadFailure::BadRedirect {
            status,
            location: response.location.clone(),
          },
        })?;

      if hops >= max_redirects {
        return Err(InstallError::TooManyRedirects {
          url: url.to_string(),
          limit: max_redirects,
        });
      }
      hops += 1;
      debug!(from = %current, to = %next, hop = hops, "following redirect");
      current = next;
      continue;
    }

    if !response.is_success() {
      return Err(InstallError::DownloadFailed {
        url: current.to_string(),
        reason: DownloadFailure::Status(response.status),
      });
    }

    return Ok((current, response));
  }
}

/// Download `url` into `dest`, returning the number of bytes written.
///
/// `dest` only exists afterwards if the whole body was written; a stale file
/// from an earlier attempt is removed first.
pub fn download_to(
  transport: &dyn Transport,
  fs: &dyn FileSystem,
  url: &Url,
  dest: &Path,
  max_redirects: usize,
) -> Result<u64, InstallError> {
  if fs.exists(dest) {
    fs.remove_file(dest).map_err(InstallError::io(dest))?;
  }

  info!(url = %url, "downloading");
  let (final_url, mut response) = fetch_following_redirects(transport, url, max_redirects)?;

  let written = fs.create(dest).map_err(InstallError::io(dest)).and_then(|mut file| {
    let copied = io::copy(&mut response.body, &mut file).and_then(|n| file.flush().map(|_| n));
    copied.map_err(|e| InstallError::DownloadFailed {
      url: final_url.to_string(),
      reason: DownloadFailure::Transport(e.to_string()),
    })
  });

  match written {
    Ok(bytes) => {
      info!(path = ?dest, bytes, "download complete");
      Ok(bytes)
    }
    Err(err) => {
      if fs.exists(dest) {
        let _ = fs.remove_file(dest);
      }
      Err(err)
    }
  }
}
