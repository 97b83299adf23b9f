//! Meeting setup commands: people, meeting new|show.

use clap::Subcommand;
use jiff::civil::Date;

use crate::review::completion_percentage;
use crate::setup;
use crate::storage::{Storage, StorageError};

use super::format::plural;

#[derive(Debug, Subcommand)]
pub enum PeopleCommand {
    /// List everyone who can attend.
    List,

    /// Add someone to the people list.
    Add {
        /// Full name.
        name: String,
    },

    /// Remove someone from the people list. Past meetings are unaffected.
    Remove {
        /// Name as listed (case-insensitive).
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum MeetingCommand {
    /// Set up the meeting to review. Replaces any meeting already set up.
    New {
        /// Meeting date (YYYY-MM-DD).
        #[arg(long)]
        date: Date,

        /// Attendee name. Repeat for each attendee.
        #[arg(long = "attendee", required = true)]
        attendees: Vec<String>,
    },

    /// Show the current meeting and review progress.
    Show,
}

pub(super) fn cmd_people(storage: &Storage, command: PeopleCommand) -> Result<(), String> {
    match command {
        PeopleCommand::List => {
            let people = storage
                .load_people()
                .map_err(|e| format!("failed to load people: {e}"))?;
            if people.is_empty() {
                println!("No people");
            }
            for name in &people {
                println!("{name}");
            }
        }
        PeopleCommand::Add { name } => {
            let name = setup::add_person(storage, &name).map_err(|e| e.to_string())?;
            eprintln!("Added {name}");
        }
        PeopleCommand::Remove { name } => {
            let name = setup::remove_person(storage, &name).map_err(|e| e.to_string())?;
            eprintln!("Removed {name}");
        }
    }
    Ok(())
}

pub(super) fn cmd_meeting(storage: &Storage, command: MeetingCommand) -> Result<(), String> {
    match command {
        MeetingCommand::New { date, attendees } => cmd_new(storage, date, &attendees),
        MeetingCommand::Show => cmd_show(storage),
    }
}

fn cmd_new(storage: &Storage, date: Date, attendees: &[String]) -> Result<(), String> {
    let setup = setup::new_meeting(storage, date, attendees).map_err(|e| e.to_string())?;

    for name in &setup.duplicates {
        eprintln!("Warning: {name} is listed more than once; keeping one");
    }
    for name in &setup.new_people {
        eprintln!("Added {name} to the people list");
    }
    println!(
        "Meeting on {} with {}: {}",
        setup.meeting.date,
        plural(setup.meeting.attendees.len(), "attendee"),
        setup.meeting.attendees.join(", ")
    );
    Ok(())
}

fn cmd_show(storage: &Storage) -> Result<(), String> {
    let load_err = |e: StorageError| format!("failed to load session: {e}");
    let meeting = storage.load_current_meeting().map_err(load_err)?;
    let isolations = storage.load_isolations().map_err(load_err)?;
    let responses = storage.load_responses().map_err(load_err)?;

    match meeting {
        Some(m) => {
            println!("Date:       {}", m.date);
            println!("Attendees:  {}", m.attendees.join(", "));
        }
        None => println!("No meeting set up (run `lti meeting new`)"),
    }
    println!(
        "Staged:     {}, {}% complete",
        plural(isolations.len(), "isolation"),
        completion_percentage(&isolations, &responses)
    );
    Ok(())
}
