//! HTTP capability.
//!
//! A [`Transport`] performs exactly one GET and never follows redirects on its
//! own; the bounded redirect loop lives in [`crate::acquire::download`] so it
//! behaves the same with the real client and with test doubles.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::consts::{APP_NAME, CONNECT_TIMEOUT_SECS};

#[derive(Debug, Error)]
pub enum TransportError {
  /// The HTTP client could not be constructed.
  #[error("failed to create HTTP client: {0}")]
  Client(String),

  /// The request failed before a response status was received.
  #[error("request to {url} failed: {message}")]
  Request { url: String, message: String },
}

/// A single HTTP response. The body is streamed, not buffered.
pub struct HttpResponse {
  pub status: u16,
  /// Raw `Location` header, if any.
  pub location: Option<String>,
  pub body: Box<dyn Read>,
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn is_redirect(&self) -> bool {
    matches!(self.status, 301 | 302 | 303 | 307 | 308)
  }
}

impl std::fmt::Debug for HttpResponse {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HttpResponse")
      .field("status", &self.status)
      .field("location", &self.location)
      .finish_non_exhaustive()
  }
}

/// Issues one HTTP GET.
pub trait Transport {
  fn get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  /// Create a client with the given total request timeout.
  pub fn new(timeout: Duration) -> Result<Self, TransportError> {
    let client = Client::builder()
      .user_agent(format!("{}-installer/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
      .redirect(Policy::none())
      .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
      .timeout(timeout)
      .build()
      .map_err(|e| TransportError::Client(e.to_string()))?;

    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
    let response = self.client.get(url.clone()).send().map_err(|e| TransportError::Request {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    let status = response.status().as_u16();
    let location = response
      .headers()
      .get(LOCATION)
      .and_then(|value| value.to_str().ok())
      .map(str::to_string);

    debug!(url = %url, status, location = ?location, "response received");

    Ok(HttpResponse {
      status,
      location,
      body: Box::new(response),
    })
  }
}
