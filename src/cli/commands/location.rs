//! imamdir location - Manage locations

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::commands::list::print_locations;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::{DirError, Result};
use crate::storage::{LocationDraft, LocationRecord};

#[derive(Args, Debug)]
pub struct LocationArgs {
    #[command(subcommand)]
    pub command: LocationCommand,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommand {
    /// Add a location
    Add(LocationFields),
    /// Replace a location's details
    Update {
        id: i64,
        #[command(flatten)]
        fields: LocationFields,
    },
    /// Remove a location; its entries stay, unassigned
    Remove { id: i64 },
    /// Show one location
    Show { id: i64 },
    /// Find locations by name, district or leader name
    Search {
        /// Matched against location, district and leader names
        query: Option<String>,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        district: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct LocationFields {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// District (neighbourhood)
    #[arg(long)]
    pub district: String,
    /// Area (region)
    #[arg(long)]
    pub area: String,
    /// Map link
    #[arg(long)]
    pub map_link: Option<String>,
}

impl LocationFields {
    fn to_draft(&self) -> LocationDraft {
        LocationDraft {
            name: self.name.clone(),
            district: self.district.clone(),
            area: self.area.clone(),
            map_link: self.map_link.clone(),
        }
    }
}

pub fn run(ctx: &AppContext, args: &LocationArgs) -> Result<()> {
    let admin = ctx.admin();
    match &args.command {
        LocationCommand::Add(fields) => {
            let location = admin.create_location(&fields.to_draft())?;
            report(ctx, "Added", &location)
        }
        LocationCommand::Update { id, fields } => {
            let location = admin.update_location(*id, &fields.to_draft())?;
            report(ctx, "Updated", &location)
        }
        LocationCommand::Remove { id } => {
            admin.delete_location(*id)?;
            if ctx.robot_mode {
                emit_robot(&robot_ok(serde_json::json!({ "removed": id })))
            } else {
                println!("{} Removed location #{id}", "✓".green());
                Ok(())
            }
        }
        LocationCommand::Show { id } => {
            let location = ctx
                .db
                .get_location(*id)?
                .ok_or_else(|| DirError::NotFound(format!("location {id}")))?;
            report(ctx, "Location", &location)
        }
        LocationCommand::Search {
            query,
            area,
            district,
        } => {
            let found = ctx.db.search_locations(
                area.as_deref(),
                district.as_deref(),
                query.as_deref(),
            )?;
            print_locations(ctx, &found)
        }
    }
}

fn report(ctx: &AppContext, verb: &str, location: &LocationRecord) -> Result<()> {
    if ctx.robot_mode {
        return emit_robot(&robot_ok(location));
    }
    println!(
        "{} {verb} #{} {} ({} / {})",
        "✓".green(),
        location.id,
        location.name.bold(),
        location.area,
        location.district
    );
    Ok(())
}
