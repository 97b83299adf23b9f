//! Reading staged isolation sets from spreadsheet exports.
//!
//! Input is a JSON array of row objects, as produced by a sheet-to-JSON
//! export. Column names are normalized by [`Isolation`]'s deserializer.

use std::collections::{HashMap, HashSet};

use crate::model::Isolation;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("expected a JSON array of isolation rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row} has an empty id")]
    EmptyId { row: usize },

    #[error("duplicate isolation id '{id}' (rows {first} and {second})")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },
}

/// Parses and checks an isolation set. Row numbers in errors are 1-based.
pub fn parse_isolations(json: &str) -> Result<Vec<Isolation>, ImportError> {
    let isolations: Vec<Isolation> = serde_json::from_str(json)?;

    let mut rows: HashMap<&str, usize> = HashMap::new();
    for (i, iso) in isolations.iter().enumerate() {
        let row = i + 1;
        if iso.id.is_empty() {
            return Err(ImportError::EmptyId { row });
        }
        if let Some(&first) = rows.get(iso.id.as_str()) {
            return Err(ImportError::DuplicateId {
                id: iso.id.clone(),
                first,
                second: row,
            });
        }
        rows.insert(&iso.id, row);
    }

    Ok(isolations)
}

/// Isolations in `current` that were not in `previous`, and vice versa.
pub fn diff_sets(
    previous: &[Isolation],
    current: &[Isolation],
) -> (Vec<Isolation>, Vec<Isolation>) {
    let before: HashSet<&str> = previous.iter().map(|i| i.id.as_str()).collect();
    let after: HashSet<&str> = current.iter().map(|i| i.id.as_str()).collect();

    let added = current
        .iter()
        .filter(|i| !before.contains(i.id.as_str()))
        .cloned()
        .collect();
    let removed = previous
        .iter()
        .filter(|i| !after.contains(i.id.as_str()))
        .cloned()
        .collect();
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_exports() {
        let json = r#"[
            {"id": "ISO-1", "Title": "Feed pump", "System/Equipment": "CAHE-101-P1"},
            {"id": 2002, "title": "Drain", "systemEquipment": "CAHE101 drain", "Permit": "PV-77"}
        ]"#;
        let set = parse_isolations(json).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set[0].system_equipment.as_deref(), Some("CAHE-101-P1"));
        assert_eq!(set[1].id, "2002");
        assert_eq!(set[1].title.as_deref(), Some("Drain"));
        assert_eq!(set[1].details["Permit"], "PV-77");
    }

    #[test]
    fn rows_with_both_column_spellings_are_accepted() {
        let json = r#"[
            {"id": "A", "systemEquipment": "CAHE-100-x", "System/Equipment": "CAHE-100-x"},
            {"id": "B", "systemEquipment": "", "System/Equipment": "CAHE-101-y"},
            {"id": "C", "Title": "Pump", "title": "Pump"}
        ]"#;
        let set = parse_isolations(json).unwrap();

        assert_eq!(set[0].system_equipment.as_deref(), Some("CAHE-100-x"));
        assert_eq!(set[1].system_equipment.as_deref(), Some("CAHE-101-y"));
        assert_eq!(set[2].title.as_deref(), Some("Pump"));
    }

    #[test]
    fn rejects_non_array() {
        let err = parse_isolations(r#"{"id": "ISO-1"}"#).unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn rejects_missing_id() {
        let err = parse_isolations(r#"[{"Title": "no id"}]"#).unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn rejects_blank_id() {
        let err = parse_isolations(r#"[{"id": "A"}, {"id": "  "}]"#).unwrap_err();
        assert!(matches!(err, ImportError::EmptyId { row: 2 }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse_isolations(r#"[{"id": "A"}, {"id": "B"}, {"id": "A"}]"#).unwrap_err();
        match err {
            ImportError::DuplicateId { id, first, second } => {
                assert_eq!((id.as_str(), first, second), ("A", 1, 3));
            }
            other => panic!("expected duplicate id, got {other:?}"),
        }
    }

    #[test]
    fn empty_array_is_allowed() {
        assert!(parse_isolations("[]").unwrap().is_empty());
    }

    #[test]
    fn diff_reports_added_and_removed() {
        let previous = vec![Isolation::new("A"), Isolation::new("B")];
        let current = vec![Isolation::new("B"), Isolation::new("C")];

        let (added, removed) = diff_sets(&previous, &current);

        assert_eq!(added, vec![Isolation::new("C")]);
        assert_eq!(removed, vec![Isolation::new("A")]);
    }
}
