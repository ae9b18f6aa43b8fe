//! Archive download over HTTP.
//!
//! Provides a trait-based abstraction for fetching distribution archives so
//! the verification flow can be exercised without network access.

use log::debug;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Connection timeout for distribution downloads.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on receiving a whole archive body, about 100 MiB.
const BODY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const CHUNK_SIZE: usize = 64 * 1024;

/// Trait for downloading a URL to a file.
#[cfg_attr(test, mockall::automock)]
pub trait Downloader {
    /// Download `url` and write the full body to `dest`.
    ///
    /// `dest` only appears once the whole body has been received.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested archive was not found (HTTP 404).
    #[error("archive not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        debug!("GET {url}");
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut partial = NamedTempFile::new_in(dir)?;
        let mut body = response.into_body();
        copy_body(url, &mut body.as_reader(), &mut partial)?;
        partial.persist(dest).map_err(|e| DownloadError::Io(e.error))?;
        Ok(())
    }
}

/// Copy a response body into `sink`.
///
/// Read failures are transfer errors; write failures are local I/O errors.
fn copy_body(url: &str, body: &mut dyn Read, sink: &mut dyn Write) -> Result<(), DownloadError> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = body.read(&mut buffer).map_err(|e| DownloadError::HttpError {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if read == 0 {
            break;
        }
        sink.write_all(buffer.get(..read).unwrap_or_default())?;
    }
    sink.flush()?;
    Ok(())
}

/// Shared `ureq` agent with connection and body timeouts.
pub(crate) fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_body(Some(BODY_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
