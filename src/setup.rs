//! Meeting setup: the people directory and the meeting about to be reviewed.

use jiff::civil::Date;

use crate::model::Meeting;
use crate::storage::{Storage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("name is empty")]
    EmptyName,

    #[error("'{0}' is already in the people list")]
    DuplicatePerson(String),

    #[error("'{0}' is not in the people list")]
    UnknownPerson(String),

    #[error("a meeting needs at least one attendee")]
    NoAttendees,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What [`new_meeting`] did besides storing the meeting.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSetup {
    pub meeting: Meeting,
    /// Attendees given more than once; only the first was kept.
    pub duplicates: Vec<String>,
    /// Attendees added to the people list.
    pub new_people: Vec<String>,
}

fn normalize(name: &str) -> Result<String, SetupError> {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(SetupError::EmptyName);
    }
    Ok(name)
}

fn same_person(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Adds someone to the people list. Returns the stored form of the name.
pub fn add_person(storage: &Storage, name: &str) -> Result<String, SetupError> {
    let name = normalize(name)?;
    let mut people = storage.load_people()?;
    if people.iter().any(|p| same_person(p, &name)) {
        return Err(SetupError::DuplicatePerson(name));
    }
    people.push(name.clone());
    storage.save_people(&people)?;
    Ok(name)
}

/// Removes someone from the people list. Past meetings keep their names.
pub fn remove_person(storage: &Storage, name: &str) -> Result<String, SetupError> {
    let name = normalize(name)?;
    let mut people = storage.load_people()?;
    let Some(pos) = people.iter().position(|p| same_person(p, &name)) else {
        return Err(SetupError::UnknownPerson(name));
    };
    let removed = people.remove(pos);
    storage.save_people(&people)?;
    Ok(removed)
}

/// Stores a new current meeting, replacing any previous one.
///
/// Repeated attendees are dropped. Attendees missing from the people list are
/// added to it.
pub fn new_meeting(
    storage: &Storage,
    date: Date,
    attendees: &[String],
) -> Result<MeetingSetup, SetupError> {
    let mut kept: Vec<String> = Vec::new();
    let mut duplicates = Vec::new();
    for raw in attendees {
        let name = normalize(raw)?;
        if kept.iter().any(|k| same_person(k, &name)) {
            duplicates.push(name);
        } else {
            kept.push(name);
        }
    }
    if kept.is_empty() {
        return Err(SetupError::NoAttendees);
    }

    let mut people = storage.load_people()?;
    let new_people: Vec<String> = kept
        .iter()
        .filter(|k| !people.iter().any(|p| same_person(p, k)))
        .cloned()
        .collect();
    if !new_people.is_empty() {
        people.extend(new_people.iter().cloned());
        storage.save_people(&people)?;
    }

    let meeting = Meeting {
        date,
        attendees: kept,
    };
    storage.save_current_meeting(&meeting)?;
    tracing::info!(date = %meeting.date, attendees = meeting.attendees.len(), "meeting set up");

    Ok(MeetingSetup {
        meeting,
        duplicates,
        new_people,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn add_person_trims_and_rejects_duplicates() {
        let storage = Storage::in_memory().unwrap();

        assert_eq!(add_person(&storage, "  Ana   Costa ").unwrap(), "Ana Costa");
        assert!(matches!(
            add_person(&storage, "ana costa"),
            Err(SetupError::DuplicatePerson(_))
        ));
        assert!(matches!(add_person(&storage, "   "), Err(SetupError::EmptyName)));
        assert_eq!(storage.load_people().unwrap(), ["Ana Costa"]);
    }

    #[test]
    fn remove_person_matches_case_insensitively() {
        let storage = Storage::in_memory().unwrap();
        add_person(&storage, "Ana").unwrap();
        add_person(&storage, "Tomas").unwrap();

        assert_eq!(remove_person(&storage, "ANA").unwrap(), "Ana");
        assert!(matches!(
            remove_person(&storage, "Ana"),
            Err(SetupError::UnknownPerson(_))
        ));
        assert_eq!(storage.load_people().unwrap(), ["Tomas"]);
    }

    #[test]
    fn new_meeting_drops_duplicates_and_grows_directory() {
        let storage = Storage::in_memory().unwrap();
        add_person(&storage, "Ana").unwrap();

        let setup = new_meeting(
            &storage,
            date(2026, 10, 20),
            &names(&["Ana", "Tomas", "ana", "Tomas "]),
        )
        .unwrap();

        assert_eq!(setup.meeting.attendees, ["Ana", "Tomas"]);
        assert_eq!(setup.duplicates, ["ana", "Tomas"]);
        assert_eq!(setup.new_people, ["Tomas"]);
        assert_eq!(storage.load_people().unwrap(), ["Ana", "Tomas"]);
        assert_eq!(storage.load_current_meeting().unwrap(), Some(setup.meeting));
    }

    #[test]
    fn new_meeting_needs_attendees() {
        let storage = Storage::in_memory().unwrap();

        assert!(matches!(
            new_meeting(&storage, date(2026, 10, 20), &[]),
            Err(SetupError::NoAttendees)
        ));
        assert!(matches!(
            new_meeting(&storage, date(2026, 10, 20), &names(&[" "])),
            Err(SetupError::EmptyName)
        ));
        assert_eq!(storage.load_current_meeting().unwrap(), None);
    }
}
