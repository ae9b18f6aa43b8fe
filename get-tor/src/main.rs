//! get-tor CLI entrypoint.
//!
//! Fetches the pinned Tor Browser archive for the host platform, stages the
//! Tor binaries into OnionShare's resource directory, and refreshes the
//! built-in bridge templates.

use clap::Parser;
use get_tor::bridges::{BridgeOutcome, BridgeSource, MoatClient};
use get_tor::cli::{BridgesArgs, Cli, Command, FetchArgs};
use get_tor::distribution::TOR_BROWSER_VERSION;
use get_tor::download::HttpDownloader;
use get_tor::error::{GetTorError, Result};
use get_tor::executor::SystemCommandExecutor;
use get_tor::output::{quiet_sink, write_stderr_line};
use get_tor::pipeline::{FetchContext, refresh_bridges, run_fetch};
use get_tor::platform::Platform;
use log::{LevelFilter, info};
use std::io::{self, Write};

/// Exit status for an archive that failed verification.
const EXIT_INTEGRITY: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.output_args().log_level());

    let run_result = if cli.output_args().quiet {
        run(&cli, &mut quiet_sink())
    } else {
        run(&cli, &mut io::stderr())
    };
    let exit_code = exit_code_for_run_result(run_result, &mut io::stderr());
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli, progress: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Some(Command::Bridges(args)) => run_bridges(args, progress),
        Some(Command::Fetch(args)) => run_fetch_command(args, progress),
        None => run_fetch_command(&cli.fetch, progress),
    }
}

fn run_fetch_command(args: &FetchArgs, progress: &mut dyn Write) -> Result<()> {
    let platform = Platform::detect()?;
    let layout = args.project.layout();
    info!(
        "fetching Tor Browser {TOR_BROWSER_VERSION} for {platform} into {}",
        layout.root
    );

    let moat = MoatClient::default();
    let bridges: Option<&dyn BridgeSource> = if args.skip_bridges {
        None
    } else {
        Some(&moat)
    };
    let context = FetchContext {
        layout: &layout,
        downloader: &HttpDownloader,
        executor: &SystemCommandExecutor,
        bridges,
    };

    run_fetch(&platform.distribution(), &context, progress)?;
    Ok(())
}

fn run_bridges(args: &BridgesArgs, progress: &mut dyn Write) -> Result<()> {
    let layout = args.project.layout();
    match refresh_bridges(&MoatClient::default(), &layout.template_dir, progress)? {
        BridgeOutcome::Updated { .. } => Ok(()),
        BridgeOutcome::Rejected { reason } => Err(GetTorError::BridgesRejected { reason }),
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(GetTorError::IntegrityMismatch {
            path,
            expected,
            actual,
        }) => {
            write_stderr_line(
                stderr,
                format!("ERROR! The sha256 of {} doesn't match:", path.display()),
            );
            write_stderr_line(stderr, format!("expected: {expected}"));
            write_stderr_line(stderr, format!("  actual: {actual}"));
            write_stderr_line(
                stderr,
                format!(
                    "Delete {} and run again to download a fresh copy.",
                    path.display()
                ),
            );
            EXIT_INTEGRITY
        }
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
