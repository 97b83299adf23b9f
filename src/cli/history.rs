//! Past meeting commands: list, show, delete, export.

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;

use crate::history::{SortOrder, export_rows, filter_meetings, resolve, short_id};
use crate::model::{PastMeeting, ValidationErrors};
use crate::storage::Storage;

use super::format::{
    format_answers, format_isolations, format_statistics, no_changes_note, plural,
};

#[derive(Debug, Subcommand)]
pub enum MeetingsCommand {
    /// List finalized meetings, newest first.
    List {
        /// Only meetings whose date or an attendee contains this text.
        #[arg(long)]
        search: Option<String>,

        /// Oldest first.
        #[arg(long)]
        oldest: bool,
    },

    /// Show one meeting in full.
    Show {
        /// Meeting ID: full UUID or unambiguous prefix.
        id: String,
    },

    /// Delete a meeting from history.
    Delete {
        /// Meeting ID: full UUID or unambiguous prefix.
        id: String,
    },

    /// Export a meeting's responses as JSON rows, one per isolation.
    Export {
        /// Meeting ID: full UUID or unambiguous prefix.
        id: String,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub(super) fn cmd_meetings(storage: &Storage, command: MeetingsCommand) -> Result<(), String> {
    let meetings = storage
        .list_past_meetings()
        .map_err(|e| format!("failed to load meetings: {e}"))?;

    match command {
        MeetingsCommand::List { search, oldest } => {
            let order = if oldest {
                SortOrder::OldestFirst
            } else {
                SortOrder::NewestFirst
            };
            cmd_list(meetings, search.as_deref(), order);
            Ok(())
        }
        MeetingsCommand::Show { id } => {
            cmd_show(resolve(&meetings, &id)?);
            Ok(())
        }
        MeetingsCommand::Delete { id } => {
            let meeting = resolve(&meetings, &id)?;
            storage
                .delete_past_meeting(meeting.id)
                .map_err(|e| format!("failed to delete meeting: {e}"))?;
            eprintln!("Deleted meeting {} ({})", short_id(meeting.id), meeting.date);
            Ok(())
        }
        MeetingsCommand::Export { id, out } => cmd_export(resolve(&meetings, &id)?, out),
    }
}

fn cmd_list(meetings: Vec<PastMeeting>, search: Option<&str>, order: SortOrder) {
    let meetings = filter_meetings(meetings, search, order);
    if meetings.is_empty() {
        println!("No meetings");
        return;
    }
    for m in &meetings {
        println!(
            "{}  {}  {:<16}  {}",
            short_id(m.id),
            m.date,
            plural(m.statistics.total, "isolation"),
            m.attendees.join(", ")
        );
    }
}

fn cmd_show(meeting: &PastMeeting) {
    println!("Meeting {}", meeting.id);
    println!("Date:       {}", meeting.date);
    println!("Attendees:  {}", meeting.attendees.join(", "));
    println!("Finalized:  {}", meeting.finalized_at);
    println!("Added:      {}", format_isolations(&meeting.added_isolations));
    println!("Removed:    {}", format_isolations(&meeting.removed_isolations));
    println!();
    println!("{}", format_statistics(&meeting.statistics));

    for (id, response) in &meeting.responses {
        println!();
        println!("{id}{}", no_changes_note(response));
        for line in format_answers(response, &ValidationErrors::default()) {
            println!("  {line}");
        }
    }
}

fn cmd_export(meeting: &PastMeeting, out: Option<PathBuf>) -> Result<(), String> {
    let rows = export_rows(meeting);
    let json = serde_json::to_string_pretty(&rows)
        .map_err(|e| format!("failed to serialize export: {e}"))?;

    match out {
        Some(path) => {
            fs::write(&path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!(
                "Exported {} from {} → {}",
                plural(rows.len(), "row"),
                meeting.date,
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
