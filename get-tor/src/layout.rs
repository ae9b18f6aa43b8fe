//! Project directory layout.
//!
//! Every path the fetcher reads or writes hangs off the desktop project root:
//!
//! - `<root>/build/tor` caches archives and scratch extractions.
//! - `<root>/onionshare/resources/tor` receives the staged binaries.
//! - `<root>/../cli/onionshare_cli/resources` holds the torrc templates.

use camino::{Utf8Path, Utf8PathBuf};

/// Resolved directories for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// The desktop project root.
    pub root: Utf8PathBuf,
    /// Where archives are cached and unpacked.
    pub working_dir: Utf8PathBuf,
    /// The resource directory the binaries are staged into.
    pub dist_dir: Utf8PathBuf,
    /// The directory holding `torrc_template-*` files.
    pub template_dir: Utf8PathBuf,
}

impl ProjectLayout {
    /// Derive the layout from a project root.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use get_tor::layout::ProjectLayout;
    ///
    /// let layout = ProjectLayout::from_root(Utf8Path::new("/src/onionshare/desktop"));
    /// assert_eq!(layout.working_dir, "/src/onionshare/desktop/build/tor");
    /// assert_eq!(layout.dist_dir, "/src/onionshare/desktop/onionshare/resources/tor");
    /// ```
    #[must_use]
    pub fn from_root(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            working_dir: root.join("build").join("tor"),
            dist_dir: root.join("onionshare").join("resources").join("tor"),
            template_dir: root
                .join("..")
                .join("cli")
                .join("onionshare_cli")
                .join("resources"),
        }
    }

    /// Replace the torrc template directory.
    #[must_use]
    pub fn with_template_dir(mut self, template_dir: Utf8PathBuf) -> Self {
        self.template_dir = template_dir;
        self
    }
}

/// Return the default project root.
///
/// The workspace sits in the desktop project's `scripts` directory, so the
/// root is two levels above this crate's manifest.
#[must_use]
pub fn default_root() -> Utf8PathBuf {
    let manifest_dir = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Utf8Path::parent)
        .unwrap_or(manifest_dir)
        .to_owned()
}
