//! Pinned Tor Browser distributions and their staging tables.
//!
//! Each platform pins one archive by URL and SHA-256, names the native tool
//! used to open it, and lists the files copied into the resource directory.
//! Bumping the Tor Browser version means updating [`TOR_BROWSER_VERSION`],
//! the three digests, and any library names that changed upstream.

use crate::platform::Platform;
use camino::{Utf8Path, Utf8PathBuf};

/// The pinned Tor Browser release.
pub const TOR_BROWSER_VERSION: &str = "11.0.9";

const DIST_BASE_URL: &str = "https://dist.torproject.org/torbrowser";

const WINDOWS_FILENAME: &str = "torbrowser-install-11.0.9_en-US.exe";
const WINDOWS_SHA256: &str = "e938433028b6ffb5d312db6268b19e419626b071f08209684c8e5b9f3d3df2bc";

const MACOS_FILENAME: &str = "TorBrowser-11.0.9-osx64_en-US.dmg";
const MACOS_SHA256: &str = "e34629a178a92983924a5a89c7a988285d2d27f21832413a7f7e33af7871c8d6";
/// Where `hdiutil attach` mounts the Tor Browser disk image.
pub const MACOS_VOLUME: &str = "/Volumes/Tor Browser";

const LINUX_FILENAME: &str = "tor-browser-linux64-11.0.9_en-US.tar.xz";
const LINUX_SHA256: &str = "baa5ccafb5c68f1c46f9ae983b9b0a0419f66d41e0483ba5aacb3462fa0a8032";

/// Permission bits applied to a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// `rwxr-xr-x`; the file is spawned as a subprocess.
    Executable,
    /// `rw-r--r--`.
    Regular,
}

impl FileMode {
    /// Return the Unix permission bits for this mode.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Executable => 0o755,
            Self::Regular => 0o644,
        }
    }
}

/// Whether a staging entry names a single file or a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Copy one file.
    File,
    /// Copy a directory recursively.
    Tree,
}

/// One row of a staging table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageEntry {
    /// Path relative to the extracted archive root.
    pub source: &'static str,
    /// Path relative to the destination resource directory.
    pub dest: &'static str,
    /// File or directory tree.
    pub kind: EntryKind,
    /// Permission bits for copied files.
    pub mode: FileMode,
}

impl StageEntry {
    const fn file(source: &'static str, dest: &'static str) -> Self {
        Self {
            source,
            dest,
            kind: EntryKind::File,
            mode: FileMode::Regular,
        }
    }

    const fn executable(source: &'static str, dest: &'static str) -> Self {
        Self {
            source,
            dest,
            kind: EntryKind::File,
            mode: FileMode::Executable,
        }
    }

    const fn tree(source: &'static str, dest: &'static str) -> Self {
        Self {
            source,
            dest,
            kind: EntryKind::Tree,
            mode: FileMode::Regular,
        }
    }
}

/// One `7z e` invocation against the Windows installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SevenZipSelection {
    /// Path or wildcard inside the installer.
    pub pattern: &'static str,
    /// Output directory, relative to the working directory.
    pub output: &'static str,
}

/// How the archive is opened, and where its contents end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// NSIS installer unpacked with `7z e`, which flattens paths.
    ///
    /// The extracted root is the working directory.
    SevenZip {
        /// The selections to extract, in order.
        selections: &'static [SevenZipSelection],
    },
    /// Disk image mounted with `hdiutil attach` and ejected afterwards.
    DiskImage {
        /// The mount point of the attached image.
        volume: Utf8PathBuf,
        /// The extracted root, relative to `volume`.
        contents: &'static str,
    },
    /// Tarball unpacked with `tar -xf` into the working directory.
    Tarball {
        /// Top-level directory the tarball creates; removed before unpacking.
        top_dir: &'static str,
        /// The extracted root, relative to `top_dir`.
        contents: &'static str,
    },
}

const WINDOWS_SELECTIONS: &[SevenZipSelection] = &[
    SevenZipSelection {
        pattern: "Browser\\TorBrowser\\Tor",
        output: "Tor",
    },
    SevenZipSelection {
        pattern: "Browser\\TorBrowser\\Data\\Tor\\geoip*",
        output: "Data",
    },
];

const WINDOWS_ENTRIES: &[StageEntry] = &[
    StageEntry::tree("Tor", "Tor"),
    StageEntry::tree("Data", "Data/Tor"),
];

const MACOS_ENTRIES: &[StageEntry] = &[
    StageEntry::file("Resources/TorBrowser/Tor/geoip", "geoip"),
    StageEntry::file("Resources/TorBrowser/Tor/geoip6", "geoip6"),
    StageEntry::executable("MacOS/Tor/tor.real", "tor"),
    StageEntry::file("MacOS/Tor/libevent-2.1.7.dylib", "libevent-2.1.7.dylib"),
    StageEntry::executable("MacOS/Tor/PluggableTransports/obfs4proxy", "obfs4proxy"),
    StageEntry::executable(
        "MacOS/Tor/PluggableTransports/snowflake-client",
        "snowflake-client",
    ),
];

const LINUX_ENTRIES: &[StageEntry] = &[
    StageEntry::file("Data/Tor/geoip", "geoip"),
    StageEntry::file("Data/Tor/geoip6", "geoip6"),
    StageEntry::executable("Tor/tor", "tor"),
    StageEntry::file("Tor/libcrypto.so.1.1", "libcrypto.so.1.1"),
    StageEntry::file("Tor/libevent-2.1.so.7", "libevent-2.1.so.7"),
    StageEntry::file("Tor/libssl.so.1.1", "libssl.so.1.1"),
    StageEntry::file("Tor/libstdc++/libstdc++.so.6", "libstdc++.so.6"),
    StageEntry::executable("Tor/PluggableTransports/obfs4proxy", "obfs4proxy"),
    StageEntry::executable(
        "Tor/PluggableTransports/snowflake-client",
        "snowflake-client",
    ),
];

/// A pinned, platform-specific Tor Browser archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// The platform this archive serves.
    pub platform: Platform,
    /// Download URL.
    pub url: String,
    /// Filename the archive is cached under in the working directory.
    pub filename: &'static str,
    /// Expected SHA-256 digest, hex encoded.
    pub sha256: &'static str,
    /// How the archive is opened.
    pub format: ArchiveFormat,
    /// Files copied into the destination resource directory.
    pub entries: &'static [StageEntry],
}

impl Distribution {
    /// The Windows installer.
    #[must_use]
    pub fn windows() -> Self {
        Self {
            platform: Platform::Windows,
            url: dist_url(WINDOWS_FILENAME),
            filename: WINDOWS_FILENAME,
            sha256: WINDOWS_SHA256,
            format: ArchiveFormat::SevenZip {
                selections: WINDOWS_SELECTIONS,
            },
            entries: WINDOWS_ENTRIES,
        }
    }

    /// The macOS disk image.
    #[must_use]
    pub fn macos() -> Self {
        Self {
            platform: Platform::MacOs,
            url: dist_url(MACOS_FILENAME),
            filename: MACOS_FILENAME,
            sha256: MACOS_SHA256,
            format: ArchiveFormat::DiskImage {
                volume: Utf8PathBuf::from(MACOS_VOLUME),
                contents: "Tor Browser.app/Contents",
            },
            entries: MACOS_ENTRIES,
        }
    }

    /// The Linux tarball.
    #[must_use]
    pub fn linux() -> Self {
        Self {
            platform: Platform::Linux,
            url: dist_url(LINUX_FILENAME),
            filename: LINUX_FILENAME,
            sha256: LINUX_SHA256,
            format: ArchiveFormat::Tarball {
                top_dir: "tor-browser_en-US",
                contents: "Browser/TorBrowser",
            },
            entries: LINUX_ENTRIES,
        }
    }

    /// Return where the archive is cached inside `working_dir`.
    #[must_use]
    pub fn archive_path(&self, working_dir: &Utf8Path) -> Utf8PathBuf {
        working_dir.join(self.filename)
    }
}

fn dist_url(filename: &str) -> String {
    format!("{DIST_BASE_URL}/{TOR_BROWSER_VERSION}/{filename}")
}
