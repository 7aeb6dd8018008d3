//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod cache;
pub mod entry;
pub mod list;
pub mod location;
pub mod request;
pub mod search;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Location(args) => location::run(ctx, args),
        Commands::Entry(args) => entry::run(ctx, args),
        Commands::Request(args) => request::run(ctx, args),
        Commands::Cache(args) => cache::run(ctx, args),
    }
}
