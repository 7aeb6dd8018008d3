//! imamdir list - Cached directory listings

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::Result;
use crate::storage::LocationListing;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(subcommand)]
    pub what: ListCommand,
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Every location with its linked entries
    Locations,
    /// Distinct areas
    Areas,
    /// Distinct districts, optionally within one area
    Districts {
        /// Restrict to this area
        #[arg(long)]
        area: Option<String>,
    },
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    match &args.what {
        ListCommand::Locations => list_locations(ctx),
        ListCommand::Areas => {
            let areas = ctx.listings.areas(&ctx.db)?;
            print_names(ctx, "areas", &areas)
        }
        ListCommand::Districts { area } => {
            let districts = ctx.listings.districts(&ctx.db, area.as_deref())?;
            print_names(ctx, "districts", &districts)
        }
    }
}

fn list_locations(ctx: &AppContext) -> Result<()> {
    let locations = ctx.listings.locations(&ctx.db)?;
    print_locations(ctx, &locations)
}

pub(crate) fn print_locations(ctx: &AppContext, locations: &[LocationListing]) -> Result<()> {
    if ctx.robot_mode {
        return emit_robot(&robot_ok(serde_json::json!({
            "count": locations.len(),
            "locations": locations,
        })));
    }

    if locations.is_empty() {
        println!("{} No locations found", "!".yellow());
        return Ok(());
    }

    for location in locations {
        println!(
            "{} {} {}",
            format!("#{}", location.id).dimmed(),
            location.name.bold(),
            format!("({} / {})", location.area, location.district).dimmed()
        );
        if location.entries.is_empty() {
            println!("    {}", "no leader assigned".dimmed());
        }
        for entry in &location.entries {
            println!("    {} {}", format!("#{}", entry.id).dimmed(), entry.name);
        }
    }
    Ok(())
}

fn print_names(ctx: &AppContext, label: &str, names: &[String]) -> Result<()> {
    if ctx.robot_mode {
        let mut data = serde_json::Map::new();
        data.insert("count".to_string(), names.len().into());
        data.insert(label.to_string(), serde_json::to_value(names)?);
        return emit_robot(&robot_ok(data));
    }
    if names.is_empty() {
        println!("{} No {label} found", "!".yellow());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
