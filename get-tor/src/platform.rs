//! Host platform detection.
//!
//! Each supported platform has exactly one pinned distribution. Anything else
//! is rejected before the fetcher touches the network or the filesystem.

use crate::distribution::Distribution;
use crate::error::{GetTorError, Result};
use std::fmt;

/// A platform with a pinned Tor Browser distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows, served by the NSIS self-extracting installer.
    Windows,
    /// macOS, served by a disk image.
    MacOs,
    /// Linux, served by an xz-compressed tarball.
    Linux,
}

impl Platform {
    /// Map an operating system identifier, as reported by
    /// [`std::env::consts::OS`], to a platform.
    ///
    /// # Examples
    ///
    /// ```
    /// use get_tor::platform::Platform;
    ///
    /// assert_eq!(Platform::from_os_name("macos"), Some(Platform::MacOs));
    /// assert_eq!(Platform::from_os_name("freebsd"), None);
    /// ```
    #[must_use]
    pub fn from_os_name(os: &str) -> Option<Self> {
        match os {
            "windows" => Some(Self::Windows),
            "macos" => Some(Self::MacOs),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }

    /// Detect the host platform.
    ///
    /// # Errors
    ///
    /// Returns [`GetTorError::UnsupportedPlatform`] when the host has no
    /// pinned distribution.
    pub fn detect() -> Result<Self> {
        Self::from_os_name_or_err(std::env::consts::OS)
    }

    fn from_os_name_or_err(os: &str) -> Result<Self> {
        Self::from_os_name(os).ok_or_else(|| GetTorError::UnsupportedPlatform { os: os.to_owned() })
    }

    /// Return the pinned distribution for this platform.
    #[must_use]
    pub fn distribution(self) -> Distribution {
        match self {
            Self::Windows => Distribution::windows(),
            Self::MacOs => Distribution::macos(),
            Self::Linux => Distribution::linux(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
        };
        f.write_str(name)
    }
}
