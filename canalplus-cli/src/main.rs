mod cli;
mod commands;
mod config;
mod error;
mod menu;

use std::process;

use clap::Parser;
use colored::*;
use tracing::{Level, debug, error, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::Args,
    commands::CommandExecutor,
    config::AppConfig,
    error::{AppError, Result},
};

/// Dependencies that are too chatty below `warn`.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn"];

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Dropping `run` on Ctrl-C unwinds the in-flight download, which removes
    // its temporary file.
    let result = tokio::select! {
        result = run(args) => result,
        () = interrupted() => Err(AppError::Interrupted),
    };

    if let Err(e) = result {
        if !matches!(e, AppError::Interrupted) {
            error!(kind = e.kind(), "{e}");
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        process::exit(e.exit_code());
    }
}

/// Resolves on the first Ctrl-C; never resolves if no handler can be installed.
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => debug!("Interrupted"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let config = AppConfig::load(args.config.as_deref())?;
    let executor = CommandExecutor::new(&config, args.output, args.verbose, args.quiet)?;
    executor.run(args.mode, args.program.as_ref()).await
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let mut filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };
    if !quiet {
        for directive in QUIET_DEPENDENCIES {
            let directive = directive
                .parse()
                .map_err(|e| AppError::Config(format!("invalid log directive: {e}")))?;
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
    Ok(())
}
