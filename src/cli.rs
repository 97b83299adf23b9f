//! CLI interface for LTI.
//!
//! Everything except `lti review` is non-interactive: arguments in, plain text
//! out. Results go to stdout; progress notes and warnings go to stderr.
//!
//! A meeting runs in this order:
//!
//! - `lti meeting new` and `lti stage` set up the meeting and its isolations.
//! - `lti review` walks the isolations one at a time.
//! - `lti summary --finalize` records the meeting and carries answers forward.

mod format;
mod history;
mod mail;
mod meeting;
mod review;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::import::{diff_sets, parse_isolations};
use crate::review::{Progress, completion_percentage};
use crate::storage::Storage;
use crate::summary::{self, FinalizeError};

use format::{format_isolation, format_isolations, format_statistics, plural};
use history::MeetingsCommand;
use mail::MailCommand;
use meeting::{MeetingCommand, PeopleCommand};

/// LTI: long-term isolation review meetings.
#[derive(Debug, Parser)]
#[command(name = "lti", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: one review meeting
  1. lti meeting new --date 2026-10-20 --attendee "Ana Costa" --attendee Tomas
  2. lti stage isolations.json
  3. lti review
  4. lti summary --finalize

History:
  lti meetings list --search costa
  lti meetings export a3b --out 2026-10-20.json"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stage the isolation set for review from a JSON array of rows.
    ///
    /// Replaces the staged set. Saved answers for isolations that remain
    /// staged are kept.
    Stage {
        /// JSON file exported from the isolation spreadsheet.
        file: PathBuf,
    },

    /// Manage the people list.
    People {
        #[command(subcommand)]
        command: PeopleCommand,
    },

    /// Set up or show the current meeting.
    Meeting {
        #[command(subcommand)]
        command: MeetingCommand,
    },

    /// Review the staged isolations interactively.
    ///
    /// Resumes at the first isolation without a complete answer.
    Review {
        /// Save after every edit, not only when moving on.
        #[arg(long)]
        auto_save: bool,
    },

    /// Show review progress for every staged isolation.
    Status,

    /// Show statistics for the current review.
    Summary {
        /// Record the meeting in history and carry its answers forward.
        #[arg(long)]
        finalize: bool,
    },

    /// Browse finalized meetings.
    Meetings {
        #[command(subcommand)]
        command: MeetingsCommand,
    },

    /// Send notification mail.
    Mail {
        #[command(subcommand)]
        command: MailCommand,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Stage { file } => cmd_stage(storage, &file),
        Command::People { command } => meeting::cmd_people(storage, command),
        Command::Meeting { command } => meeting::cmd_meeting(storage, command),
        Command::Review { auto_save } => review::cmd_review(config, storage, auto_save),
        Command::Status => cmd_status(storage),
        Command::Summary { finalize } => {
            if finalize {
                cmd_finalize(storage)
            } else {
                cmd_summary(storage)
            }
        }
        Command::Meetings { command } => history::cmd_meetings(storage, command),
        Command::Mail { command } => mail::cmd_mail(config, storage, command),
    }
}

fn cmd_stage(storage: &Storage, file: &Path) -> Result<(), String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let isolations =
        parse_isolations(&json).map_err(|e| format!("invalid isolation file: {e}"))?;

    let previous = storage
        .load_previous_isolations()
        .map_err(|e| format!("failed to load previous isolations: {e}"))?;
    storage
        .stage_isolations(&isolations)
        .map_err(|e| format!("failed to stage isolations: {e}"))?;

    println!("Staged {}", plural(isolations.len(), "isolation"));
    if !previous.is_empty() {
        let (added, removed) = diff_sets(&previous, &isolations);
        eprintln!("New since last meeting: {}", format_isolations(&added));
        eprintln!("Gone since last meeting: {}", format_isolations(&removed));
    }
    Ok(())
}

fn cmd_status(storage: &Storage) -> Result<(), String> {
    let isolations = storage
        .load_isolations()
        .map_err(|e| format!("failed to load isolations: {e}"))?;
    let responses = storage
        .load_responses()
        .map_err(|e| format!("failed to load responses: {e}"))?;

    if isolations.is_empty() {
        println!("No isolations staged");
        return Ok(());
    }

    for (i, isolation) in isolations.iter().enumerate() {
        let mark = match Progress::of(responses.get(&isolation.id)) {
            Progress::Complete => "done",
            Progress::InProgress => "partial",
            Progress::Unvisited => "-",
        };
        println!("{:>3}. [{mark:^7}] {}", i + 1, format_isolation(isolation));
    }
    println!(
        "{}% complete ({} staged)",
        completion_percentage(&isolations, &responses),
        plural(isolations.len(), "isolation")
    );
    Ok(())
}

fn cmd_summary(storage: &Storage) -> Result<(), String> {
    let stats = summary::session_statistics(storage)
        .map_err(|e| format!("failed to load session: {e}"))?;
    println!("{}", format_statistics(&stats));
    Ok(())
}

fn cmd_finalize(storage: &Storage) -> Result<(), String> {
    let record = summary::finalize(storage).map_err(|e| match e {
        FinalizeError::Storage(e) => format!("failed to finalize meeting: {e}"),
        other => other.to_string(),
    })?;

    println!("{}", record.id);
    eprintln!(
        "Meeting on {} finalized with {}",
        record.date,
        plural(record.responses.len(), "response")
    );
    eprintln!("Added since last meeting:   {}", format_isolations(&record.added_isolations));
    eprintln!("Removed since last meeting: {}", format_isolations(&record.removed_isolations));
    eprintln!("{}", format_statistics(&record.statistics));
    Ok(())
}
