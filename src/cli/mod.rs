//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// imamdir - search and maintain a directory of prayer leaders
#[derive(Parser, Debug)]
#[command(name = "imamdir")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Machine-readable JSON output (and JSON logs on stderr)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/imamdir/config.toml)
    #[arg(long, global = true, env = "IMAMDIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path, overrides config and IMAMDIR_DB
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fuzzy-search leaders by name
    Search(commands::search::SearchArgs),

    /// List locations, areas or districts
    List(commands::list::ListArgs),

    /// Manage locations
    Location(commands::location::LocationArgs),

    /// Manage directory entries
    Entry(commands::entry::EntryArgs),

    /// Submit and review change requests
    Request(commands::request::RequestArgs),

    /// Inspect or clear the cache
    Cache(commands::cache::CacheArgs),
}
