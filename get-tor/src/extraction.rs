//! Native archive tool invocation.
//!
//! Each archive format is opened with the tool the platform ships or the
//! packaging docs require: `7z` for the Windows installer, `hdiutil` and
//! `diskutil` for the macOS disk image, and `tar` for the Linux tarball.
//! Tool exit statuses are checked, so a failed unpack is reported at once
//! rather than surfacing later as a missing file.

use crate::distribution::ArchiveFormat;
use crate::executor::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::fs;
use std::io;

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The tool could not be started.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// The tool binary.
        tool: &'static str,
        /// The underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("{tool} exited with {}: {stderr}", describe_exit(.code))]
    ToolFailed {
        /// The tool binary.
        tool: &'static str,
        /// Exit code, if the tool was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The tool succeeded but the expected root directory is absent.
    #[error("extracted root not found: {path}")]
    MissingRoot {
        /// The directory that should have been produced.
        path: Utf8PathBuf,
    },

    /// I/O error preparing the working directory.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The contents of an opened archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArchive {
    /// Directory that staging entries are resolved against.
    pub root: Utf8PathBuf,
    /// Mounted volume that must be ejected once staging is done.
    pub mounted_volume: Option<Utf8PathBuf>,
}

/// Open `archive` with the tool matching `format`.
///
/// # Errors
///
/// Returns [`ExtractionError::ToolFailed`] when a tool exits unsuccessfully,
/// [`ExtractionError::Spawn`] when it cannot be started, and
/// [`ExtractionError::MissingRoot`] when the expected contents are absent.
pub fn extract(
    executor: &dyn CommandExecutor,
    format: &ArchiveFormat,
    archive: &Utf8Path,
    working_dir: &Utf8Path,
) -> Result<ExtractedArchive, ExtractionError> {
    let extracted = match format {
        ArchiveFormat::SevenZip { selections } => {
            for selection in *selections {
                let output_flag = format!("-o{}", working_dir.join(selection.output));
                run_tool(
                    executor,
                    "7z",
                    &["e", "-y", archive.as_str(), selection.pattern, &output_flag],
                )?;
            }
            ExtractedArchive {
                root: working_dir.to_owned(),
                mounted_volume: None,
            }
        }
        ArchiveFormat::DiskImage { volume, contents } => {
            run_tool(executor, "hdiutil", &["attach", archive.as_str()])?;
            ExtractedArchive {
                root: volume.join(contents),
                mounted_volume: Some(volume.clone()),
            }
        }
        ArchiveFormat::Tarball { top_dir, contents } => {
            let unpacked = working_dir.join(top_dir);
            if unpacked.exists() {
                debug!("removing previous extraction at {unpacked}");
                fs::remove_dir_all(&unpacked)?;
            }
            run_tool(
                executor,
                "tar",
                &["-xf", archive.as_str(), "-C", working_dir.as_str()],
            )?;
            ExtractedArchive {
                root: unpacked.join(contents),
                mounted_volume: None,
            }
        }
    };

    if !extracted.root.is_dir() {
        if let Err(err) = release(executor, &extracted) {
            warn!("failed to release {}: {err}", extracted.root);
        }
        return Err(ExtractionError::MissingRoot {
            path: extracted.root,
        });
    }
    Ok(extracted)
}

/// Undo any mount performed by [`extract`].
///
/// # Errors
///
/// Returns [`ExtractionError::ToolFailed`] when the eject fails.
pub fn release(
    executor: &dyn CommandExecutor,
    extracted: &ExtractedArchive,
) -> Result<(), ExtractionError> {
    if let Some(volume) = &extracted.mounted_volume {
        run_tool(executor, "diskutil", &["eject", volume.as_str()])?;
    }
    Ok(())
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_owned(), |c| format!("status {c}"))
}

fn run_tool(
    executor: &dyn CommandExecutor,
    tool: &'static str,
    args: &[&str],
) -> Result<(), ExtractionError> {
    debug!("{tool} {}", args.join(" "));
    let output = executor
        .run(tool, args)
        .map_err(|source| ExtractionError::Spawn { tool, source })?;
    if !output.status.success() {
        return Err(ExtractionError::ToolFailed {
            tool,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
