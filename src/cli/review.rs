//! The interactive review loop: `lti review`.
//!
//! One [`Review`] lives for the whole loop. Commands are read a line at a
//! time; anything the reviewer gets wrong is reported and the loop carries on.
//! Only storage and terminal failures end it early.

use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::model::{ResponseField, ValidationErrors};
use crate::review::{self, Advance, Phase, Progress, Review, ReviewError};
use crate::storage::{Storage, StorageError};

use super::format::{
    format_answers, format_errors, format_isolation, format_isolations, no_changes_note, plural,
};

const HELP: &str = "\
Commands:
  set <field> <value>   answer a question (blank value not allowed, use clear)
  clear <field>         remove an answer
  next                  save and move to the next isolation
  prev                  move back without checking answers
  no-changes            low risk, nothing required, keep last comments, move on
  copy-previous         copy the previous meeting's answers
  auto-save on|off      save after every edit
  previous on|off       show the previous meeting's answers (on)
  show                  show the current isolation again
  yes / no              finish the review, or keep going
  help                  this list
  quit                  leave; saved answers are kept

Fields: risk, mitigation, parts-required, parts-arrival, moc-required,
moc-number, moc-comments, engineering-support, engineer-name, engineer-eta,
comments. Dates are YYYY-MM-DD.";

#[derive(Debug, thiserror::Error)]
pub(super) enum LoopError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to save responses: {0}")]
    Storage(#[from] StorageError),
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Outcome {
    Finished,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Set(ResponseField, String),
    Clear(ResponseField),
    Next,
    Prev,
    NoChanges,
    CopyPrevious,
    AutoSave(bool),
    ShowPrevious(bool),
    Show,
    Yes,
    No,
    Help,
    Quit,
}

fn on_off(arg: &str, command: &str) -> Result<bool, String> {
    match arg.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(format!("usage: {command} on|off")),
    }
}

fn parse_input(line: &str) -> Result<Input, String> {
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));

    let input = match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set <field> <value>")?;
            Input::Set(field.parse()?, value.trim().to_string())
        }
        "clear" if !rest.is_empty() => Input::Clear(rest.parse()?),
        "clear" => return Err("usage: clear <field>".to_string()),
        "next" => Input::Next,
        "prev" | "back" => Input::Prev,
        "no-changes" => Input::NoChanges,
        "copy-previous" => Input::CopyPrevious,
        "auto-save" => Input::AutoSave(on_off(rest, "auto-save")?),
        "previous" => Input::ShowPrevious(on_off(rest, "previous")?),
        "show" => Input::Show,
        "yes" | "y" => Input::Yes,
        "no" => Input::No,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}' (type `help`)")),
    };
    Ok(input)
}

pub(super) fn cmd_review(config: &Config, storage: &Storage, auto_save: bool) -> Result<(), String> {
    let keys = config.group_key()?;
    let session = review::load(storage).map_err(|e| match e {
        ReviewError::NoIsolationsStaged => {
            "no isolations are staged; run `lti stage <file.json>` first".to_string()
        }
        other => other.to_string(),
    })?;
    let mut review = Review::new(storage, &keys, session, config.auto_save || auto_save)
        .map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_loop(&mut review, stdin.lock(), &mut stdout).map_err(|e| e.to_string())?;
    Ok(())
}

pub(super) fn run_loop<R: BufRead, W: Write>(
    review: &mut Review<'_>,
    mut input: R,
    out: &mut W,
) -> Result<Outcome, LoopError> {
    let mut show_previous = true;
    render(review, show_previous, out)?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return quit(review, out);
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_input(line) {
            Ok(c) => c,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        match command {
            Input::Set(field, value) => match review.set_field(field, &value) {
                Ok(()) => {
                    let shown = review
                        .current_response()
                        .and_then(|r| r.get(field))
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(out, "{}: {shown}", field.label())?;
                }
                Err(e) => report(out, e)?,
            },
            Input::Clear(field) => match review.set_field(field, "") {
                Ok(()) => writeln!(out, "{}: cleared", field.label())?,
                Err(e) => report(out, e)?,
            },
            Input::Next => match review.go_next() {
                Ok(Advance::Moved(_)) => render(review, show_previous, out)?,
                Ok(Advance::AwaitingConfirmation) => writeln!(
                    out,
                    "All isolations are complete. Finish the review? (yes/no)"
                )?,
                Err(e) => report(out, e)?,
            },
            Input::Prev => {
                if review.go_previous() {
                    render(review, show_previous, out)?;
                } else {
                    writeln!(out, "Already at the first isolation.")?;
                }
            }
            Input::NoChanges => match review.mark_no_changes() {
                Ok(Some(_)) => {
                    writeln!(out, "Marked as no changes.")?;
                    render(review, show_previous, out)?;
                }
                Ok(None) => writeln!(
                    out,
                    "Marked as no changes. This is the last isolation; type `next` to finish."
                )?,
                Err(e) => report(out, e)?,
            },
            Input::CopyPrevious => match review.copy_previous() {
                Ok(()) => {
                    writeln!(out, "Copied the previous meeting's answers.")?;
                    render(review, show_previous, out)?;
                }
                Err(e) => report(out, e)?,
            },
            Input::AutoSave(on) => match review.set_auto_save(on) {
                Ok(()) => writeln!(out, "Auto-save {}.", if on { "on" } else { "off" })?,
                Err(e) => report(out, e)?,
            },
            Input::ShowPrevious(on) => {
                show_previous = on;
                render(review, show_previous, out)?;
            }
            Input::Show => render(review, show_previous, out)?,
            Input::Yes => match review.confirm_finish() {
                Ok(()) => {
                    writeln!(
                        out,
                        "Review finished. Run `lti summary --finalize` to close the meeting."
                    )?;
                    return Ok(Outcome::Finished);
                }
                Err(e) => report(out, e)?,
            },
            Input::No => {
                if review.phase() == Phase::AwaitingConfirmation {
                    review.cancel_finish();
                    writeln!(out, "Continuing the review.")?;
                } else {
                    writeln!(out, "Nothing to cancel.")?;
                }
            }
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Quit => return quit(review, out),
        }
    }
}

fn quit<W: Write>(review: &Review<'_>, out: &mut W) -> Result<Outcome, LoopError> {
    let note = if review.auto_save() {
        "Answers are saved."
    } else {
        "Answers up to the last move are saved."
    };
    writeln!(out, "{note} Run `lti review` to pick up where you left off.")?;
    Ok(Outcome::Quit)
}

/// Prints a recoverable review error. Storage failures end the loop.
fn report<W: Write>(out: &mut W, err: ReviewError) -> Result<(), LoopError> {
    match err {
        ReviewError::Storage(e) => return Err(e.into()),
        ReviewError::ValidationFailed(errors) => {
            writeln!(
                out,
                "Please complete all required fields before proceeding ({} missing):",
                errors.len()
            )?;
            for line in format_errors(&errors) {
                writeln!(out, "  {line}")?;
            }
        }
        ReviewError::IncompleteSetAtTerminal { incomplete } => {
            writeln!(
                out,
                "Please complete all isolation reviews before finishing ({incomplete} still incomplete)."
            )?;
        }
        other => writeln!(out, "{other}")?,
    }
    Ok(())
}

fn render<W: Write>(review: &Review<'_>, show_previous: bool, out: &mut W) -> io::Result<()> {
    let index = review.current_index();
    let isolation = review.current_isolation();

    writeln!(out)?;
    writeln!(
        out,
        "Isolation {} of {}  [{}% complete]{}",
        index + 1,
        review.len(),
        review.completion_percentage(),
        if review.auto_save() { "  auto-save" } else { "" }
    )?;
    let badge = match review.progress(index) {
        Progress::Complete => "Complete",
        Progress::InProgress | Progress::Unvisited => "Incomplete",
    };
    writeln!(
        out,
        "{}  [{badge}]{}",
        format_isolation(isolation),
        review.current_response().map_or("", no_changes_note)
    )?;
    if let Some(equipment) = isolation.system_equipment.as_deref() {
        writeln!(out, "Equipment: {equipment}")?;
    }

    let related = review.related();
    if !related.is_empty() {
        let related: Vec<_> = related.into_iter().cloned().collect();
        writeln!(
            out,
            "Warning: {} on the same equipment group: {}",
            plural(related.len(), "other isolation"),
            format_isolations(&related)
        )?;
    }

    writeln!(out)?;
    let current = review.current_response().cloned().unwrap_or_default();
    for line in format_answers(&current, review.validation_errors()) {
        writeln!(out, "  {line}")?;
    }

    if show_previous {
        match review.previous_response() {
            Some(previous) => {
                let when = previous
                    .last_reviewed
                    .map(|d| format!(" (reviewed {d})"))
                    .unwrap_or_default();
                writeln!(out, "Previous meeting{when}:{}", no_changes_note(previous))?;
                for line in format_answers(previous, &ValidationErrors::default()) {
                    writeln!(out, "  {line}")?;
                }
            }
            None => writeln!(out, "No response from the previous meeting.")?,
        }
    }
    Ok(())
}
