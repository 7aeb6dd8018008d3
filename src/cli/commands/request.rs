//! imamdir request - Community proposals for new locations and leader changes

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::Result;
use crate::storage::{ChangeProposal, ChangeRequest, ChangeStatus, LocationDraft};

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub command: RequestCommand,
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// Propose a new leader for a location, or a location not yet listed
    Submit {
        /// Existing location id
        #[arg(long, conflicts_with = "new_location", required_unless_present = "new_location")]
        location: Option<i64>,
        /// Name of a location not yet in the directory
        #[arg(long, requires_all = ["district", "area"])]
        new_location: Option<String>,
        #[arg(long, requires = "new_location")]
        district: Option<String>,
        #[arg(long, requires = "new_location")]
        area: Option<String>,
        #[arg(long, requires = "new_location")]
        map_link: Option<String>,
        /// Existing entry to move there
        #[arg(long, conflicts_with = "name")]
        entry: Option<i64>,
        /// Name of a leader not yet in the directory
        #[arg(long)]
        name: Option<String>,
        /// Recitation sample for the named leader
        #[arg(long, requires = "name")]
        audio: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, default_value = "anonymous")]
        by: String,
    },
    /// Apply a pending request
    Approve {
        id: i64,
        #[arg(long, default_value = "admin")]
        by: String,
    },
    /// Close a pending request without applying it
    Reject {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long, default_value = "admin")]
        by: String,
    },
    /// List requests, newest first
    List {
        /// pending, approved or rejected
        #[arg(long)]
        status: Option<String>,
    },
}

pub fn run(ctx: &AppContext, args: &RequestArgs) -> Result<()> {
    let admin = ctx.admin();
    match &args.command {
        RequestCommand::Submit {
            location,
            new_location,
            district,
            area,
            map_link,
            entry,
            name,
            audio,
            notes,
            by,
        } => {
            let new_location = new_location.as_ref().map(|location_name| LocationDraft {
                name: location_name.clone(),
                district: district.clone().unwrap_or_default(),
                area: area.clone().unwrap_or_default(),
                map_link: map_link.clone(),
            });
            let request = admin.submit_change_request(&ChangeProposal {
                location_id: *location,
                new_location,
                proposed_entry_id: *entry,
                proposed_name: name.clone(),
                proposed_audio: audio.clone(),
                notes: notes.clone(),
                submitted_by: by.clone(),
            })?;
            report(ctx, "Submitted", &request)
        }
        RequestCommand::Approve { id, by } => {
            let request = admin.approve_change_request(*id, by)?;
            report(ctx, "Approved", &request)
        }
        RequestCommand::Reject { id, reason, by } => {
            let request = admin.reject_change_request(*id, by, reason.as_deref())?;
            report(ctx, "Rejected", &request)
        }
        RequestCommand::List { status } => {
            let status = status
                .as_deref()
                .map(str::parse::<ChangeStatus>)
                .transpose()?;
            let requests = ctx.db.list_change_requests(status)?;
            if ctx.robot_mode {
                return emit_robot(&robot_ok(serde_json::json!({
                    "count": requests.len(),
                    "requests": requests,
                })));
            }
            if requests.is_empty() {
                println!("{} No change requests", "!".yellow());
            }
            for request in &requests {
                print_line(request);
            }
            Ok(())
        }
    }
}

fn report(ctx: &AppContext, verb: &str, request: &ChangeRequest) -> Result<()> {
    if ctx.robot_mode {
        return emit_robot(&robot_ok(request));
    }
    print!("{} {verb} ", "✓".green());
    print_line(request);
    Ok(())
}

fn print_line(request: &ChangeRequest) {
    let status = match request.status {
        ChangeStatus::Pending => request.status.as_str().yellow(),
        ChangeStatus::Approved => request.status.as_str().green(),
        ChangeStatus::Rejected => request.status.as_str().red(),
    };
    let proposed = match (&request.proposed_name, request.proposed_entry_id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => format!("entry #{id}"),
        (None, None) => "-".to_string(),
    };
    let location = match (request.location_id, &request.new_location) {
        (Some(id), _) => format!("location #{id}"),
        (None, Some(draft)) => format!("new location {}", draft.name),
        (None, None) => "-".to_string(),
    };
    println!(
        "{} [{}] {} {} -> {}",
        format!("#{}", request.id).dimmed(),
        status,
        request.kind,
        location,
        proposed.bold()
    );
}
