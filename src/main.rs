//! imamdir - prayer-leader directory CLI
//!
//! Arabic-aware fuzzy search over a SQLite directory, with a Redis-backed
//! response cache.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use imamdir::Result;
use imamdir::app::AppContext;
use imamdir::cli::Cli;
use imamdir::cli::output::{emit_robot, robot_error};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // details go to the log, stdout/stderr only get the generic message
            tracing::error!(error = %e, "command failed");
            if cli.json {
                let _ = emit_robot(&robot_error(&e));
            } else {
                eprintln!("Error: {}", e.public_message());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    imamdir::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,imamdir=info",
        1 => "info,imamdir=debug",
        2 => "debug,imamdir=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
