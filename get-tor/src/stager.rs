//! Staging extracted files into the resource directory.
//!
//! The destination is recreated on every run, so it only ever holds the
//! files listed in the platform's staging table.

use crate::distribution::{EntryKind, FileMode, StageEntry};
use crate::error::{GetTorError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::fs;
use std::path::Path;

/// Copies staging-table entries into a destination directory.
pub struct Stager {
    dist_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a new stager writing into `dist_dir`.
    #[must_use]
    pub fn new(dist_dir: Utf8PathBuf) -> Self {
        Self { dist_dir }
    }

    /// Return the destination directory.
    #[must_use]
    pub fn dist_dir(&self) -> &Utf8Path {
        &self.dist_dir
    }

    /// Remove the destination directory if present, then create it empty.
    ///
    /// # Errors
    ///
    /// Returns [`GetTorError::StagingFailed`] if the directory cannot be
    /// removed or created.
    pub fn recreate(&self) -> Result<()> {
        if self.dist_dir.exists() {
            fs::remove_dir_all(&self.dist_dir).map_err(|e| GetTorError::StagingFailed {
                reason: format!("failed to remove {}: {e}", self.dist_dir),
            })?;
        }
        fs::create_dir_all(&self.dist_dir).map_err(|e| GetTorError::StagingFailed {
            reason: format!("failed to create {}: {e}", self.dist_dir),
        })
    }

    /// Stage one entry, resolving its source against `root`.
    ///
    /// Returns the destination path.
    ///
    /// # Errors
    ///
    /// Returns [`GetTorError::MissingArtefact`] when the source is absent and
    /// [`GetTorError::StagingFailed`] when copying fails.
    pub fn stage(&self, root: &Utf8Path, entry: &StageEntry) -> Result<Utf8PathBuf> {
        let source = root.join(entry.source);
        let dest = self.dist_dir.join(entry.dest);

        let present = match entry.kind {
            EntryKind::File => source.is_file(),
            EntryKind::Tree => source.is_dir(),
        };
        if !present {
            return Err(GetTorError::MissingArtefact {
                path: source.into_std_path_buf(),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let copied = match entry.kind {
            EntryKind::File => copy_file(source.as_std_path(), dest.as_std_path(), entry.mode),
            EntryKind::Tree => copy_tree(source.as_std_path(), dest.as_std_path(), entry.mode),
        };
        copied.map_err(|e| GetTorError::StagingFailed {
            reason: format!("failed to copy {source} to {dest}: {e}"),
        })?;

        Ok(dest)
    }

    /// Stage every entry of a table.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Stager::stage`].
    pub fn stage_all(&self, root: &Utf8Path, entries: &[StageEntry]) -> Result<Vec<Utf8PathBuf>> {
        entries.iter().map(|entry| self.stage(root, entry)).collect()
    }
}

fn copy_file(source: &Path, dest: &Path, mode: FileMode) -> std::io::Result<()> {
    trace!("copy {} -> {}", source.display(), dest.display());
    fs::copy(source, dest)?;
    apply_mode(dest, mode)
}

fn copy_tree(source: &Path, dest: &Path, mode: FileMode) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to, mode)?;
        } else {
            copy_file(&from, &to, mode)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: FileMode) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode.bits()))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: FileMode) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const ENTRIES: &[StageEntry] = &[
        StageEntry {
            source: "Data/Tor/geoip",
            dest: "geoip",
            kind: EntryKind::File,
            mode: FileMode::Regular,
        },
        StageEntry {
            source: "Tor/tor",
            dest: "tor",
            kind: EntryKind::File,
            mode: FileMode::Executable,
        },
        StageEntry {
            source: "Tor/PluggableTransports",
            dest: "pt",
            kind: EntryKind::Tree,
            mode: FileMode::Regular,
        },
    ];

    struct Fixture {
        _temp: TempDir,
        root: Utf8PathBuf,
        stager: Stager,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().expect("temp dir");
        let base = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        let root = base.join("extracted");
        for (path, body) in [
            ("Data/Tor/geoip", "geoip"),
            ("Tor/tor", "#!/bin/sh"),
            ("Tor/PluggableTransports/obfs4proxy", "obfs4"),
            ("Tor/PluggableTransports/nested/readme", "nested"),
        ] {
            let file = root.join(path);
            fs::create_dir_all(file.parent().expect("parent")).expect("mkdir");
            fs::write(&file, body).expect("write");
        }
        let stager = Stager::new(base.join("dist"));
        Fixture {
            _temp: temp,
            root,
            stager,
        }
    }

    #[rstest]
    fn recreate_discards_previous_contents(fixture: Fixture) {
        let leftover = fixture.stager.dist_dir().join("old-tor");
        fs::create_dir_all(fixture.stager.dist_dir()).expect("mkdir");
        fs::write(&leftover, b"stale").expect("write");

        fixture.stager.recreate().expect("recreate");

        assert!(fixture.stager.dist_dir().is_dir());
        assert!(!leftover.exists());
    }

    #[rstest]
    fn stage_all_copies_files_and_trees(fixture: Fixture) {
        fixture.stager.recreate().expect("recreate");
        let staged = fixture
            .stager
            .stage_all(&fixture.root, ENTRIES)
            .expect("stage");

        let dist = fixture.stager.dist_dir();
        assert_eq!(
            staged,
            vec![dist.join("geoip"), dist.join("tor"), dist.join("pt")]
        );
        assert_eq!(fs::read_to_string(dist.join("tor")).expect("read"), "#!/bin/sh");
        assert!(dist.join("pt/obfs4proxy").is_file());
        assert!(dist.join("pt/nested/readme").is_file());
    }

    #[cfg(unix)]
    #[rstest]
    fn executables_get_755_and_others_644(fixture: Fixture) {
        use std::os::unix::fs::PermissionsExt;

        fixture.stager.recreate().expect("recreate");
        fixture
            .stager
            .stage_all(&fixture.root, ENTRIES)
            .expect("stage");

        let mode = |name: &str| {
            fs::metadata(fixture.stager.dist_dir().join(name))
                .expect("metadata")
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode("tor"), 0o755);
        assert_eq!(mode("geoip"), 0o644);
        assert_eq!(mode("pt/obfs4proxy"), 0o644);
    }

    #[rstest]
    fn missing_source_is_reported(fixture: Fixture) {
        fixture.stager.recreate().expect("recreate");
        let entry = StageEntry {
            source: "Tor/libssl.so.1.1",
            dest: "libssl.so.1.1",
            kind: EntryKind::File,
            mode: FileMode::Regular,
        };

        let err = fixture
            .stager
            .stage(&fixture.root, &entry)
            .expect_err("missing");
        match err {
            GetTorError::MissingArtefact { path } => {
                assert!(path.ends_with("Tor/libssl.so.1.1"));
            }
            other => panic!("expected MissingArtefact, got {other:?}"),
        }
    }

    #[rstest]
    fn file_entry_pointing_at_directory_is_missing(fixture: Fixture) {
        fixture.stager.recreate().expect("recreate");
        let entry = StageEntry {
            source: "Tor",
            dest: "tor",
            kind: EntryKind::File,
            mode: FileMode::Executable,
        };
        let result = fixture.stager.stage(&fixture.root, &entry);
        assert!(matches!(result, Err(GetTorError::MissingArtefact { .. })));
    }
}
