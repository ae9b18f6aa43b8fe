//! Cached, verified distribution archives.
//!
//! An archive already present in the working directory is reused, but it is
//! hashed on every run: nothing is extracted from a file that does not match
//! its pinned digest.

use crate::digest::{Sha256Digest, compute_sha256};
use crate::download::Downloader;
use crate::error::{GetTorError, Result};
use crate::output::write_stderr_line;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An archive on disk whose digest matched the pinned value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArtifact {
    /// Where the archive lives.
    pub path: PathBuf,
    /// The digest it was verified against.
    pub digest: Sha256Digest,
    /// Whether this run downloaded the archive.
    pub downloaded: bool,
}

/// Ensure `path` holds the archive published at `url` and that it hashes to
/// `expected`.
///
/// Downloads the archive when `path` does not exist; otherwise the cached
/// copy is hashed as-is. Either way the digest is checked before returning.
///
/// # Errors
///
/// Returns [`GetTorError::IntegrityMismatch`] when the digest differs,
/// [`GetTorError::Download`] when fetching fails, and [`GetTorError::Io`]
/// when the file cannot be read.
pub fn ensure_verified_artifact(
    downloader: &dyn Downloader,
    url: &str,
    expected: &Sha256Digest,
    path: &Path,
    stderr: &mut dyn Write,
) -> Result<VerifiedArtifact> {
    let downloaded = if path.exists() {
        debug!("reusing cached archive {}", path.display());
        false
    } else {
        write_stderr_line(stderr, format!("Downloading {url}"));
        downloader.download(url, path)?;
        true
    };

    let actual = compute_sha256(path)?;
    if actual != *expected {
        return Err(GetTorError::IntegrityMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    debug!("{} verified as {actual}", path.display());
    Ok(VerifiedArtifact {
        path: path.to_path_buf(),
        digest: actual,
        downloaded,
    })
}
