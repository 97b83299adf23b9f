//! Mail commands: send, remind.

use clap::Subcommand;
use jiff::civil::Date;

use crate::config::Config;
use crate::mail::{Message, Relay, Sendmail};
use crate::storage::Storage;

#[derive(Debug, Subcommand)]
pub enum MailCommand {
    /// Send a one-off message.
    Send {
        /// Recipient address.
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,
    },

    /// Send the standard meeting reminder.
    Remind {
        /// Recipient address.
        #[arg(long)]
        to: String,

        /// Meeting date (YYYY-MM-DD). Defaults to the current meeting's date.
        #[arg(long)]
        date: Option<Date>,
    },
}

pub(super) fn cmd_mail(config: &Config, storage: &Storage, command: MailCommand) -> Result<(), String> {
    let message = match command {
        MailCommand::Send { to, subject, body } => Message::new(to, subject, body),
        MailCommand::Remind { to, date } => {
            let date = match date {
                Some(d) => d,
                None => storage
                    .load_current_meeting()
                    .map_err(|e| format!("failed to load meeting: {e}"))?
                    .map(|m| m.date)
                    .ok_or("no meeting is set up; pass --date or run `lti meeting new`")?,
            };
            Message::reminder(to, date)
        }
    };

    let relay = Sendmail::new(&config.mail.sendmail, config.mail_from()?);
    relay
        .send(&message)
        .map_err(|e| format!("failed to send mail: {e}"))?;

    eprintln!(
        "Sent \"{}\" to {} via {}",
        message.subject,
        message.to,
        relay.program().display()
    );
    Ok(())
}
