//! Output formatting for CLI display.

use crate::model::{Isolation, Response, ResponseField, Statistics, ValidationErrors};

/// One line per applicable question, in form order. Unanswered ones show
/// `-`; fields with a validation error are flagged with its message.
pub(super) fn format_answers(response: &Response, errors: &ValidationErrors) -> Vec<String> {
    ResponseField::ALL
        .into_iter()
        .filter(|f| response.is_applicable(*f))
        .map(|f| {
            let value = response.get(f).unwrap_or_else(|| "-".to_string());
            let line = format!("{:<22}{value}", format!("{}:", f.label()));
            match errors.get(f) {
                Some(message) => format!("{line}  <- {message}"),
                None => line,
            }
        })
        .collect()
}

/// Marker appended to a response heading when it was a "no changes" answer.
pub(super) fn no_changes_note(response: &Response) -> &'static str {
    if response.no_changes { "  [no changes]" } else { "" }
}

pub(super) fn format_errors(errors: &ValidationErrors) -> Vec<String> {
    errors
        .iter()
        .map(|(field, message)| format!("{} ({field}): {message}", field.label()))
        .collect()
}

pub(super) fn format_statistics(stats: &Statistics) -> String {
    format!(
        "Total responses: {}\n\
         Risk:            Low {}  Medium {}  High {}\n\
         Parts required:  Yes {}  No {}\n\
         MOC required:    Yes {}  No {}\n\
         Engineering:     Yes {}  No {}",
        stats.total,
        stats.by_risk.low,
        stats.by_risk.medium,
        stats.by_risk.high,
        stats.by_parts.yes,
        stats.by_parts.no,
        stats.by_moc.yes,
        stats.by_moc.no,
        stats.by_engineering.yes,
        stats.by_engineering.no,
    )
}

/// `id (title)`, or just the id when there is no title.
pub(super) fn format_isolation(isolation: &Isolation) -> String {
    match isolation.title.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(title) => format!("{} ({title})", isolation.id),
        None => isolation.id.clone(),
    }
}

pub(super) fn format_isolations(isolations: &[Isolation]) -> String {
    if isolations.is_empty() {
        return "none".to_string();
    }
    isolations
        .iter()
        .map(format_isolation)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}
