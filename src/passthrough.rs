//! Passthrough Metrics Client
//!
//! Reads a pre-formatted exposition blob from a co-located exporter listening on a
//! Unix domain socket. The blob is never parsed; it is appended to the snapshot as-is.
//!
//! Every fetch opens a fresh connection and asks the peer to close it afterwards,
//! since the peer may be restarted between refresh cycles.

use crate::config::PassthroughConfig;
use crate::error::{ExporterError, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{CONNECTION, HOST};
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;
use tracing::{debug, warn};

/// Client for the local passthrough metrics socket
#[derive(Debug, Clone)]
pub struct PassthroughClient {
    socket_path: PathBuf,
    path: String,
    timeout: Duration,
}

impl PassthroughClient {
    pub fn new(config: &PassthroughConfig) -> Self {
        Self {
            socket_path: PathBuf::from(&config.socket_path),
            path: config.path.clone(),
            timeout: config.timeout(),
        }
    }

    /// Fetch the passthrough blob.
    ///
    /// Returns `None` on any connect, timeout, status, or read failure; the caller
    /// treats that as "no passthrough metrics this cycle".
    pub async fn fetch(&self) -> Option<String> {
        match fetch_from_socket(&self.socket_path, &self.path, self.timeout).await {
            Ok(text) => {
                debug!(bytes = text.len(), "Fetched passthrough metrics");
                Some(text)
            }
            Err(e) => {
                warn!(
                    "Failed to fetch passthrough metrics from {}: {}",
                    self.socket_path.display(),
                    e
                );
                None
            }
        }
    }
}

/// Issue a single `GET path` over the Unix socket at `socket_path` and return the body.
///
/// `timeout` bounds the whole exchange: connect, request and body read.
pub async fn fetch_from_socket(socket_path: &Path, path: &str, timeout: Duration) -> Result<String> {
    tokio::time::timeout(timeout, get_body(socket_path, path))
        .await
        .map_err(|_| ExporterError::Timeout(timeout))?
}

async fn get_body(socket_path: &Path, path: &str) -> Result<String> {
    let stream = UnixStream::connect(socket_path).await?;
    let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;

    // Drives the connection; it finishes once the response has been read.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("Passthrough connection closed with error: {}", e);
        }
    });

    let uri = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let request = Request::get(uri)
        .header(HOST, "localhost")
        .header(CONNECTION, "close")
        .body(Empty::<Bytes>::new())?;

    let response = sender.send_request(request).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ExporterError::Status {
            status: status.as_u16(),
            url: format!("unix:{}{}", socket_path.display(), path),
        });
    }

    // The feed is opaque; invalid UTF-8 must not drop the lines around it.
    let body = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8_lossy(&body).into_owned())
}
