//! Isolation records: the equipment safety isolations under review.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One staged isolation. Immutable for the duration of a session.
///
/// Spreadsheet exports disagree on column names, so the two fields the review
/// cares about are normalized here when the record is first read: `title`
/// falls back to `Title`, `systemEquipment` falls back to `System/Equipment`.
/// A blank primary column counts as missing. Every other column is carried
/// through untouched in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawIsolation")]
pub struct Isolation {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "systemEquipment", skip_serializing_if = "Option::is_none")]
    pub system_equipment: Option<String>,

    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Isolation {
    /// Creates a bare isolation with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            system_equipment: None,
            details: BTreeMap::new(),
        }
    }

    /// Sets the equipment string.
    #[cfg(test)]
    #[must_use]
    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.system_equipment = Some(equipment.into());
        self
    }

    /// Sets the title.
    #[cfg(test)]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// An isolation row as it appears in the source, with both spellings of
/// each normalized column.
#[derive(Deserialize)]
struct RawIsolation {
    #[serde(deserialize_with = "id_from_scalar")]
    id: String,

    #[serde(default)]
    title: Option<String>,

    #[serde(default, rename = "Title")]
    alt_title: Option<String>,

    #[serde(default, rename = "systemEquipment")]
    system_equipment: Option<String>,

    #[serde(default, rename = "System/Equipment")]
    alt_equipment: Option<String>,

    #[serde(flatten)]
    details: BTreeMap<String, serde_json::Value>,
}

impl From<RawIsolation> for Isolation {
    fn from(raw: RawIsolation) -> Self {
        Self {
            id: raw.id,
            title: first_filled(raw.title, raw.alt_title),
            system_equipment: first_filled(raw.system_equipment, raw.alt_equipment),
            details: raw.details,
        }
    }
}

fn first_filled(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    let filled = |s: &Option<String>| s.as_ref().is_some_and(|s| !s.trim().is_empty());
    if filled(&primary) {
        primary
    } else if filled(&fallback) {
        fallback
    } else {
        primary.or(fallback)
    }
}

/// Spreadsheet ids come through as either text or whole numbers.
fn id_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s.trim().to_string(),
        Scalar::Int(n) => n.to_string(),
    })
}
