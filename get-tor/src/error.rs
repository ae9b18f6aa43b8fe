//! Error types for the Tor fetcher.
//!
//! Integrity failures are kept distinct from every other failure so the
//! binary can report them with the expected and actual digests and exit with
//! a dedicated status code.

use crate::bridges::BridgeError;
use crate::download::DownloadError;
use crate::extraction::ExtractionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching and staging Tor.
#[derive(Debug, Error)]
pub enum GetTorError {
    /// The host operating system has no pinned distribution.
    #[error("platform not supported: {os}")]
    UnsupportedPlatform {
        /// The operating system identifier reported by the host.
        os: String,
    },

    /// The archive on disk does not hash to the pinned digest.
    #[error("the sha256 of {path} doesn't match: expected {expected}, actual {actual}")]
    IntegrityMismatch {
        /// Path to the offending archive.
        path: PathBuf,
        /// The pinned digest.
        expected: String,
        /// The digest computed from the file.
        actual: String,
    },

    /// A SHA-256 digest string is malformed.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidDigest {
        /// Description of the validation failure.
        reason: String,
    },

    /// Downloading the archive failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Running the native archive tool failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A file or directory listed in the staging table was not extracted.
    #[error("expected artefact not found: {path}")]
    MissingArtefact {
        /// Path that was expected inside the extracted archive.
        path: PathBuf,
    },

    /// Copying into the destination resource directory failed.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// Refreshing the bridge templates failed outright.
    #[error(transparent)]
    Bridges(#[from] BridgeError),

    /// The bridge API refused the request; no template was written.
    #[error("built-in bridges were not updated: {reason}")]
    BridgesRejected {
        /// Why the refresh was refused.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GetTorError {
    /// Return true when this error is an integrity failure.
    #[must_use]
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::IntegrityMismatch { .. })
    }
}

/// Result type alias using [`GetTorError`].
pub type Result<T> = std::result::Result<T, GetTorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_mismatch_reports_both_digests() {
        let err = GetTorError::IntegrityMismatch {
            path: PathBuf::from("/tmp/tor.tar.xz"),
            expected: "a".repeat(64),
            actual: "b".repeat(64),
        };
        let msg = err.to_string();
        assert!(msg.contains(&"a".repeat(64)));
        assert!(msg.contains(&"b".repeat(64)));
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn unsupported_platform_names_the_os() {
        let err = GetTorError::UnsupportedPlatform {
            os: "freebsd".to_owned(),
        };
        assert_eq!(err.to_string(), "platform not supported: freebsd");
        assert!(!err.is_integrity_failure());
    }

    #[test]
    fn missing_artefact_includes_path() {
        let err = GetTorError::MissingArtefact {
            path: PathBuf::from("Tor/tor"),
        };
        assert!(err.to_string().contains("Tor/tor"));
    }

    #[test]
    fn bridge_errors_pass_through_unchanged() {
        let err = GetTorError::from(BridgeError::Http {
            endpoint: "https://example.invalid".to_owned(),
            reason: "timed out".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "bridge request to https://example.invalid failed: timed out"
        );
    }
}
