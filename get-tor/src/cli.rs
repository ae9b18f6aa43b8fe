//! CLI argument definitions for the Tor fetcher.
//!
//! Running with no subcommand is the same as `fetch`. Options belong to the
//! command they follow, so `get-tor --root DIR fetch` is rejected rather than
//! silently resolved against the default root.

use crate::layout::{ProjectLayout, default_root};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

/// Fetch and stage Tor binaries for OnionShare.
#[derive(Parser, Debug)]
#[command(name = "get-tor")]
#[command(version, about)]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = concat!(
    "Fetch and stage Tor binaries for OnionShare.\n\n",
    "Downloads the pinned Tor Browser release for this platform, verifies its ",
    "SHA-256 digest, extracts the Tor daemon, its libraries, and the pluggable ",
    "transports, and copies them into onionshare/resources/tor. Afterwards the ",
    "built-in bridge templates are refreshed from the Tor Project's moat API.",
))]
#[command(after_help = concat!(
    "EXIT STATUS:\n",
    "  0  success\n",
    "  1  unsupported platform, download, extraction, staging, or bridge failure\n",
    "  2  the archive failed SHA-256 verification\n\n",
    "EXAMPLES:\n",
    "  Fetch Tor into the default desktop project:\n",
    "    $ get-tor\n\n",
    "  Refresh only the bridge templates:\n",
    "    $ get-tor bridges\n\n",
    "  Fetch into another checkout without touching templates:\n",
    "    $ get-tor --root ~/src/onionshare/desktop --skip-bridges",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Fetch arguments (used when no subcommand is given).
    #[command(flatten)]
    pub fetch: FetchArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download, verify, extract, and stage Tor (default).
    Fetch(FetchArgs),

    /// Refresh the built-in bridge torrc templates only.
    Bridges(BridgesArgs),
}

/// Where the project lives on disk.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectArgs {
    /// Desktop project root [default: two levels above this crate].
    #[arg(long, value_name = "DIR")]
    pub root: Option<Utf8PathBuf>,

    /// Directory holding the `torrc_template-*` files
    /// [default: ROOT/../cli/onionshare_cli/resources].
    #[arg(long, value_name = "DIR")]
    pub bridge_templates: Option<Utf8PathBuf>,
}

impl ProjectArgs {
    /// Resolve the project layout, applying any overrides.
    #[must_use]
    pub fn layout(&self) -> ProjectLayout {
        let root = self.root.clone().unwrap_or_else(default_root);
        let layout = ProjectLayout::from_root(&root);
        match &self.bridge_templates {
            Some(dir) => layout.with_template_dir(dir.clone()),
            None => layout,
        }
    }
}

/// Progress and log verbosity.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl OutputArgs {
    /// Map the flags to a log level.
    ///
    /// `RUST_LOG` still takes precedence when set.
    ///
    /// # Examples
    ///
    /// ```
    /// use get_tor::cli::OutputArgs;
    /// use log::LevelFilter;
    ///
    /// let args = OutputArgs { verbosity: 2, quiet: false };
    /// assert_eq!(args.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Arguments for the fetch command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchArgs {
    /// Project location.
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Do not refresh the bridge templates after staging.
    #[arg(long)]
    pub skip_bridges: bool,

    /// Verbosity.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the bridges command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgesArgs {
    /// Project location.
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Verbosity.
    #[command(flatten)]
    pub output: OutputArgs,
}

impl Cli {
    /// Return the output flags of whichever command is active.
    #[must_use]
    pub fn output_args(&self) -> &OutputArgs {
        match &self.command {
            Some(Command::Fetch(args)) => &args.output,
            Some(Command::Bridges(args)) => &args.output,
            None => &self.fetch.output,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
