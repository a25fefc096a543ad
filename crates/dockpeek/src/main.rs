//! Binary entrypoint for dockpeek.
use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use config::{Config, load_or_default};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*};

/// Preview presenter that logs its decisions.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod presenter;
/// Platform wiring for the hover pipeline.
mod run;

#[derive(Parser, Debug)]
#[command(
    name = "dockpeek",
    about = "Window previews for hovered dock icons",
    version
)]
/// Command-line interface for the `dockpeek` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.dockpeek/config.ron)
        path: Option<PathBuf>,

        /// Dump the parsed configuration as RON to stdout
        #[arg(long)]
        dump: bool,
    },
    /// List the dock's icons with their frames and running state.
    Icons,
}

fn main() {
    let cli = Cli::parse();

    let spec = cli.log.spec();
    tracing_subscriber::registry()
        .with(logging::env_filter_from_spec(&spec))
        .with(fmt::layer().without_time().compact())
        .try_init()
        .ok();
    debug!(filter = %spec, "logging_ready");

    if let Some(Command::Check { path, dump }) = &cli.command {
        let explicit = path.as_deref().or(cli.config.as_deref());
        match load_or_default(explicit) {
            Ok(cfg) if *dump => println!("{}", cfg.to_ron()),
            Ok(_) => println!("ok"),
            Err(e) => {
                eprintln!("{}", e.pretty());
                process::exit(1);
            }
        }
        return;
    }

    let cfg: Config = match load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    };

    let status = permissions::check_permissions();
    if !status.can_observe() {
        let blocking = status.blocking();
        error!(missing = ?blocking, "permissions_missing");
        eprintln!(
            "dockpeek needs the {} permission. Grant it under System Settings > \
             Privacy & Security, then run dockpeek again.",
            blocking.join(", ")
        );
        process::exit(2);
    }
    let optional = status.missing();
    if !optional.is_empty() {
        debug!(missing = ?optional, "optional_permissions_missing");
    }

    let result = match cli.command {
        Some(Command::Icons) => run::icons(&cfg),
        _ => run::run(&cfg),
    };
    if let Err(e) = result {
        error!(error = %e, "dockpeek_failed");
        eprintln!("dockpeek: {e}");
        process::exit(1);
    }
}
