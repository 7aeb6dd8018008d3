//! imamdir entry - Manage directory entries

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::{DirError, Result};

#[derive(Args, Debug)]
pub struct EntryArgs {
    #[command(subcommand)]
    pub command: EntryCommand,
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    /// Add an entry, optionally linked to a location
    Add {
        name: String,
        #[arg(long)]
        location: Option<i64>,
        /// Link to a recitation sample
        #[arg(long)]
        audio: Option<String>,
    },
    /// Set or clear (when URL is omitted) an entry's audio sample
    Audio { id: i64, url: Option<String> },
    /// Rename an entry
    Rename { id: i64, name: String },
    /// Link an entry to a location
    Link { id: i64, location: i64 },
    /// Detach an entry from its location
    Unlink { id: i64 },
    /// Remove an entry
    Remove { id: i64 },
    /// Stamp an entry as verified
    Verify {
        id: i64,
        #[arg(long, default_value = "admin")]
        by: String,
    },
    /// Show one entry
    Show { id: i64 },
}

pub fn run(ctx: &AppContext, args: &EntryArgs) -> Result<()> {
    let admin = ctx.admin();
    match &args.command {
        EntryCommand::Add {
            name,
            location,
            audio,
        } => {
            let entry = admin.create_entry_with_audio(name, *location, audio.as_deref())?;
            if ctx.robot_mode {
                return emit_robot(&robot_ok(&entry));
            }
            println!("{} Added entry #{} {}", "✓".green(), entry.id, entry.name.bold());
            Ok(())
        }
        EntryCommand::Rename { id, name } => {
            admin.rename_entry(*id, name)?;
            done(ctx, *id, "renamed")
        }
        EntryCommand::Link { id, location } => {
            admin.link_entry(*id, Some(*location))?;
            done(ctx, *id, "linked")
        }
        EntryCommand::Unlink { id } => {
            admin.link_entry(*id, None)?;
            done(ctx, *id, "unlinked")
        }
        EntryCommand::Remove { id } => {
            admin.delete_entry(*id)?;
            done(ctx, *id, "removed")
        }
        EntryCommand::Audio { id, url } => {
            admin.set_audio_sample(*id, url.as_deref())?;
            done(ctx, *id, if url.is_some() { "audio set" } else { "audio cleared" })
        }
        EntryCommand::Verify { id, by } => {
            admin.mark_verified(*id, by)?;
            done(ctx, *id, "verified")
        }
        EntryCommand::Show { id } => {
            let entry = ctx
                .db
                .get_entry(*id)?
                .ok_or_else(|| DirError::NotFound(format!("entry {id}")))?;
            if ctx.robot_mode {
                return emit_robot(&robot_ok(&entry));
            }
            println!("{} {}", format!("#{}", entry.id).dimmed(), entry.name.bold());
            if let Some(location) = entry.location_id {
                println!("  location  #{location}");
            }
            if let Some(audio) = &entry.audio_sample {
                println!("  audio     {audio}");
            }
            if let Some(verified_at) = &entry.verified_at {
                println!(
                    "  verified  {verified_at} by {}",
                    entry.verified_by.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
    }
}

fn done(ctx: &AppContext, id: i64, action: &str) -> Result<()> {
    if ctx.robot_mode {
        return emit_robot(&robot_ok(serde_json::json!({ "id": id, "action": action })));
    }
    println!("{} Entry #{id} {action}", "✓".green());
    Ok(())
}
