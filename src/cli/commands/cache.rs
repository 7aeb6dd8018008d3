//! imamdir cache - Inspect or clear cached state

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cache::SharedStatus;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show cache and search-index state
    Status,
    /// Purge the namespace and drop the search index
    Clear,
}

pub fn run(ctx: &AppContext, args: &CacheArgs) -> Result<()> {
    match args.command {
        CacheCommand::Status => status(ctx),
        CacheCommand::Clear => clear(ctx),
    }
}

fn status(ctx: &AppContext) -> Result<()> {
    let cache = ctx.cache.stats();
    let index = ctx.index.stats();
    let entries = ctx.db.count_entries()?;

    if ctx.robot_mode {
        return emit_robot(&robot_ok(serde_json::json!({
            "cache": cache,
            "index": index,
            "entries": entries,
        })));
    }

    let shared = match cache.shared_status {
        SharedStatus::Disabled => "disabled".dimmed().to_string(),
        SharedStatus::Online => format!("{} ({})", "online".green(), cache.shared_backend.unwrap_or("-")),
        SharedStatus::Offline => format!("{} ({})", "offline".red(), cache.shared_backend.unwrap_or("-")),
    };
    let snapshot = match (index.entries, index.generation_token) {
        (Some(count), Some(token)) => format!("{count} entries (token {token})"),
        _ => "not built".dimmed().to_string(),
    };

    let mut layout = HumanLayout::new();
    layout
        .title("Cache")
        .kv("namespace", &cache.namespace)
        .kv("ttl", &format!("{}s", cache.default_ttl_secs))
        .kv("shared tier", &shared)
        .kv("local entries", &cache.local_entries.to_string())
        .blank()
        .title("Search index")
        .kv("snapshot", &snapshot)
        .kv("rebuilds", &index.rebuilds.to_string())
        .kv("directory entries", &entries.to_string());
    emit_human(layout);
    Ok(())
}

fn clear(ctx: &AppContext) -> Result<()> {
    let report = ctx.coordinator.invalidate_all()?;
    if ctx.robot_mode {
        return emit_robot(&robot_ok(report));
    }
    let shared = report
        .shared_removed
        .map_or_else(|| "shared tier skipped".to_string(), |n| format!("{n} shared keys"));
    println!(
        "{} Cleared {shared}, {} local entries",
        "✓".green(),
        report.local_cleared
    );
    Ok(())
}
