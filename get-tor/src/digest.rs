//! SHA-256 digest newtype and file hashing.
//!
//! Pinned digests may be written in either case; they are normalised to
//! lowercase on construction so comparison is case-insensitive.

use crate::error::{GetTorError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A validated, lowercase, hex-encoded SHA-256 digest.
///
/// # Examples
///
/// ```
/// use get_tor::digest::Sha256Digest;
///
/// let digest = Sha256Digest::try_from("AB".repeat(32).as_str())?;
/// assert_eq!(digest.as_str(), "ab".repeat(32));
/// # Ok::<(), get_tor::error::GetTorError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hash an in-memory byte slice.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(bytes)))
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = GetTorError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = GetTorError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the SHA-256 digest of a file.
///
/// The file is read in chunks so large archives are never held in memory.
///
/// # Errors
///
/// Returns [`GetTorError::Io`] if the file cannot be opened or read.
pub fn compute_sha256(path: &Path) -> Result<Sha256Digest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(Sha256Digest(format!("{:x}", hasher.finalize())))
}

fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(GetTorError::InvalidDigest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(GetTorError::InvalidDigest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        assert!(Sha256Digest::try_from("a".repeat(64)).is_ok());
    }

    #[test]
    fn normalises_uppercase_to_lowercase() {
        let digest = Sha256Digest::try_from(HELLO_SHA256.to_ascii_uppercase()).expect("valid");
        assert_eq!(digest.as_str(), HELLO_SHA256);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Sha256Digest::try_from("abcdef").is_err());
        assert!(Sha256Digest::try_from("a".repeat(65)).is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        let mut bad = "a".repeat(63);
        bad.push('g');
        let err = Sha256Digest::try_from(bad).expect_err("non-hex must fail");
        assert!(err.to_string().contains("'g'"));
    }

    #[test]
    fn hashes_empty_file() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let digest = compute_sha256(file.path()).expect("hash");
        assert_eq!(digest.as_str(), EMPTY_SHA256);
    }

    #[test]
    fn hashes_known_content_the_same_way_every_time() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"hello\n").expect("write");
        file.flush().expect("flush");

        let first = compute_sha256(file.path()).expect("hash");
        let second = compute_sha256(file.path()).expect("hash");
        assert_eq!(first.as_str(), HELLO_SHA256);
        assert_eq!(first, second);
        assert_eq!(first, Sha256Digest::of_bytes(b"hello\n"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = compute_sha256(&dir.path().join("absent"));
        assert!(matches!(result, Err(GetTorError::Io(_))));
    }
}
