//! The fetch, verify, extract, and stage flow.
//!
//! One run walks a [`Distribution`] through every step in order:
//!
//! 1. ensure the working directory exists;
//! 2. download the archive if it is not cached, then verify its digest;
//! 3. open it with the platform's native tool;
//! 4. recreate the resource directory and copy the staging table into it;
//! 5. refresh the built-in bridge templates.
//!
//! Nothing under the resource directory is touched until the archive has
//! passed verification.

use crate::artifact::{VerifiedArtifact, ensure_verified_artifact};
use crate::bridges::{BridgeOutcome, BridgeSource, update_bridges};
use crate::digest::Sha256Digest;
use crate::distribution::Distribution;
use crate::download::Downloader;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::extraction::{self, ExtractedArchive};
use crate::layout::ProjectLayout;
use crate::output::write_stderr_line;
use crate::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use std::fs;
use std::io::Write;

/// Collaborators for one fetch run.
pub struct FetchContext<'a> {
    /// Resolved project directories.
    pub layout: &'a ProjectLayout,
    /// Fetches archives that are not cached.
    pub downloader: &'a dyn Downloader,
    /// Runs the native archive tools.
    pub executor: &'a dyn CommandExecutor,
    /// Bridge source; `None` skips the template refresh.
    pub bridges: Option<&'a dyn BridgeSource>,
}

/// What a successful fetch run produced.
#[derive(Debug)]
pub struct FetchReport {
    /// The verified archive.
    pub artifact: VerifiedArtifact,
    /// Destination paths of every staged entry.
    pub staged: Vec<Utf8PathBuf>,
    /// Result of the bridge refresh, when one was attempted.
    pub bridges: Option<BridgeOutcome>,
}

/// Fetch, verify, extract, and stage `distribution`, then refresh bridges.
///
/// A rejected bridge refresh is reported on `stderr` but does not fail the
/// run.
///
/// # Errors
///
/// Returns [`GetTorError::IntegrityMismatch`](crate::error::GetTorError::IntegrityMismatch)
/// before any extraction when the archive digest is wrong, and the
/// corresponding error for download, extraction, staging, or bridge
/// transport failures.
pub fn run_fetch(
    distribution: &Distribution,
    context: &FetchContext<'_>,
    stderr: &mut dyn Write,
) -> Result<FetchReport> {
    let layout = context.layout;
    fs::create_dir_all(&layout.working_dir)?;

    let expected = Sha256Digest::try_from(distribution.sha256)?;
    let archive_path = distribution.archive_path(&layout.working_dir);
    let artifact = ensure_verified_artifact(
        context.downloader,
        &distribution.url,
        &expected,
        archive_path.as_std_path(),
        stderr,
    )?;

    info!(
        "extracting {} for {}",
        distribution.filename, distribution.platform
    );
    let extracted = extraction::extract(
        context.executor,
        &distribution.format,
        &archive_path,
        &layout.working_dir,
    )?;

    let staged = stage_extracted(distribution, &extracted, &layout.dist_dir);
    let released = extraction::release(context.executor, &extracted);
    let staged = staged?;
    released?;

    write_stderr_line(
        stderr,
        format!("Tor binaries extracted to: {}", layout.dist_dir),
    );

    let bridges = match context.bridges {
        Some(source) => Some(refresh_bridges(source, &layout.template_dir, stderr)?),
        None => None,
    };

    Ok(FetchReport {
        artifact,
        staged,
        bridges,
    })
}

fn stage_extracted(
    distribution: &Distribution,
    extracted: &ExtractedArchive,
    dist_dir: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    let stager = Stager::new(dist_dir.to_owned());
    stager.recreate()?;
    stager.stage_all(&extracted.root, distribution.entries)
}

/// Refresh the bridge templates and report the outcome on `stderr`.
///
/// # Errors
///
/// Returns [`GetTorError::Bridges`](crate::error::GetTorError::Bridges) when
/// the request, the response body, or a template write fails.
pub fn refresh_bridges(
    source: &dyn BridgeSource,
    template_dir: &Utf8Path,
    stderr: &mut dyn Write,
) -> Result<BridgeOutcome> {
    let outcome = update_bridges(source, template_dir)?;
    match &outcome {
        BridgeOutcome::Updated { written } if written.is_empty() => {
            warn!("bridge response listed no built-in bridges");
        }
        BridgeOutcome::Updated { written } => {
            let kinds: Vec<String> = written.iter().map(ToString::to_string).collect();
            write_stderr_line(
                stderr,
                format!("Updated built-in bridges: {}", kinds.join(", ")),
            );
        }
        BridgeOutcome::Rejected { reason } => {
            write_stderr_line(
                stderr,
                format!("There was a problem fetching the latest built-in bridges: {reason}"),
            );
        }
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
