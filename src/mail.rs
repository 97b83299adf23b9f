//! Outbound mail: ad-hoc notifications and meeting reminders.
//!
//! Messages are handed to a local `sendmail`-compatible program, which owns
//! SMTP delivery. A failed hand-off is reported to the caller, never retried.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use jiff::civil::Date;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("{field} must be a single line")]
    InvalidHeader { field: &'static str },

    #[error("recipient is empty")]
    NoRecipient,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Rejected {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The fixed reminder sent ahead of a meeting.
    pub fn reminder(to: impl Into<String>, meeting_date: Date) -> Self {
        Self::new(
            to,
            format!("Reminder: Upcoming LTI Meeting on {meeting_date}"),
            format!(
                "Reminder: The LTI Meeting is scheduled for {meeting_date}. \
                 Please ensure PermitVision isolations are updated."
            ),
        )
    }

    /// Renders the message with headers, ready for `sendmail -t`.
    pub fn render(&self, from: &str) -> Result<String, MailError> {
        if self.to.trim().is_empty() {
            return Err(MailError::NoRecipient);
        }
        for (field, value) in [
            ("from", from),
            ("to", self.to.as_str()),
            ("subject", self.subject.as_str()),
        ] {
            if value.contains(['\r', '\n']) {
                return Err(MailError::InvalidHeader { field });
            }
        }
        Ok(format!(
            "From: {from}\nTo: {}\nSubject: {}\n\n{}\n",
            self.to.trim(),
            self.subject,
            self.body
        ))
    }
}

/// Something that can deliver a message.
pub trait Relay {
    fn send(&self, message: &Message) -> Result<(), MailError>;
}

/// Relay through a local `sendmail` binary.
#[derive(Debug, Clone)]
pub struct Sendmail {
    program: PathBuf,
    from: String,
}

impl Sendmail {
    pub fn new(program: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            from: from.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Relay for Sendmail {
    fn send(&self, message: &Message) -> Result<(), MailError> {
        let rendered = message.render(&self.from)?;
        let program = self.program.display().to_string();
        let spawn_err = |source| MailError::Spawn {
            program: program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Reap the child even when the write fails: a relay that exits early
        // closes the pipe, and its status is what gets reported.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(rendered.as_bytes()),
            None => Ok(()),
        };
        let output = child.wait_with_output().map_err(spawn_err)?;

        if output.status.success() {
            written.map_err(spawn_err)?;
            tracing::info!(to = %message.to, subject = %message.subject, "mail handed to relay");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(to = %message.to, %stderr, "mail relay rejected message");
            Err(MailError::Rejected {
                program,
                status: output.status,
                stderr,
            })
        }
    }
}
