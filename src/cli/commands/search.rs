//! imamdir search - Fuzzy name search
//!
//! Arabic-aware: spelling variants, diacritics and honorifics are ignored,
//! and near-misses are scored by character-bigram overlap.

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::Result;
use crate::search::SearchHit;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results (default: search.max_results)
    #[arg(long, short)]
    pub limit: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let hits = ctx.search(&args.query, args.limit)?;
    display_results(ctx, args, &hits)
}

fn display_results(ctx: &AppContext, args: &SearchArgs, hits: &[SearchHit]) -> Result<()> {
    if ctx.robot_mode {
        return emit_robot(&robot_ok(serde_json::json!({
            "query": args.query,
            "count": hits.len(),
            "results": hits,
        })));
    }

    if hits.is_empty() {
        println!("{} No matches for '{}'", "!".yellow(), args.query.cyan());
        return Ok(());
    }

    println!(
        "{} results for '{}':",
        hits.len().to_string().bold(),
        args.query.cyan()
    );
    println!();
    for (i, hit) in hits.iter().enumerate() {
        let rank = format!("{}.", i + 1);
        let score = match hit.score {
            90..=100 => hit.score.to_string().green(),
            70..=89 => hit.score.to_string().yellow(),
            _ => hit.score.to_string().normal(),
        };
        let location = hit
            .parent_name
            .as_deref()
            .map_or_else(|| "unassigned".dimmed().to_string(), str::to_string);
        println!(
            "{:>4} {} [{}] {} {}",
            rank.dimmed(),
            hit.display_name.bold(),
            score,
            "@".dimmed(),
            location
        );
    }
    Ok(())
}
