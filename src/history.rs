//! Past meetings: search, ordering, lookup, and export.

use serde::Serialize;
use uuid::Uuid;

use crate::model::{PastMeeting, Response};

/// Display order for meeting history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Keeps meetings whose date or any attendee contains `search`
/// (case-insensitive), then orders them by finalization time.
pub fn filter_meetings(
    mut meetings: Vec<PastMeeting>,
    search: Option<&str>,
    order: SortOrder,
) -> Vec<PastMeeting> {
    if let Some(term) = search.map(str::to_lowercase).filter(|t| !t.is_empty()) {
        meetings.retain(|m| {
            m.date.to_string().contains(&term)
                || m.attendees.iter().any(|a| a.to_lowercase().contains(&term))
        });
    }
    meetings.sort_by(|a, b| (a.finalized_at, a.date).cmp(&(b.finalized_at, b.date)));
    if order == SortOrder::NewestFirst {
        meetings.reverse();
    }
    meetings
}

/// Resolve a meeting reference (full UUID or unambiguous prefix).
pub fn resolve<'a>(meetings: &'a [PastMeeting], reference: &str) -> Result<&'a PastMeeting, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return meetings
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| format!("no meeting with id {id}"));
    }

    let prefix = reference.to_ascii_lowercase();
    let matches: Vec<&PastMeeting> = meetings
        .iter()
        .filter(|m| m.id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(format!("no meeting matching '{reference}'")),
        1 => Ok(matches[0]),
        n => {
            let ids: Vec<String> = matches.iter().map(|m| short_id(m.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous, matches {n} meetings: {}",
                ids.join(", ")
            ))
        }
    }
}

pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// One exported row per isolation, with blank cells for unanswered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportRow {
    #[serde(rename = "IsolationID")]
    pub isolation_id: String,
    pub risk: String,
    pub mitigation: String,
    pub parts_required: String,
    pub parts_arrival: String,
    #[serde(rename = "MOCRequired")]
    pub moc_required: String,
    #[serde(rename = "MOCNumber")]
    pub moc_number: String,
    #[serde(rename = "MOCComments")]
    pub moc_comments: String,
    pub engineering_support: String,
    pub engineer_name: String,
    #[serde(rename = "EngineerETA")]
    pub engineer_eta: String,
}

impl ExportRow {
    fn from_response(id: &str, r: &Response) -> Self {
        fn cell<T: ToString>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        Self {
            isolation_id: id.to_string(),
            risk: cell(r.risk.map(|v| v.as_str())),
            mitigation: cell(r.mitigation.as_deref()),
            parts_required: cell(r.parts_required.map(|v| v.as_str())),
            parts_arrival: cell(r.parts_arrival),
            moc_required: cell(r.moc_required.map(|v| v.as_str())),
            moc_number: cell(r.moc_number.as_deref()),
            moc_comments: cell(r.moc_comments.as_deref()),
            engineering_support: cell(r.engineering_support.map(|v| v.as_str())),
            engineer_name: cell(r.engineer_name.as_deref()),
            engineer_eta: cell(r.engineer_eta),
        }
    }
}

pub fn export_rows(meeting: &PastMeeting) -> Vec<ExportRow> {
    meeting
        .responses
        .iter()
        .map(|(id, r)| ExportRow::from_response(id, r))
        .collect()
}
