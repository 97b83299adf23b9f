//! Loads everything a review session needs from the store.

use crate::model::{Isolation, Responses};
use crate::storage::Storage;

use super::ReviewError;

/// The inputs to a review: what to review, what has been answered so far,
/// and what was answered at the previous meeting.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub isolations: Vec<Isolation>,
    pub responses: Responses,
    pub previous: Responses,
}

/// Loads the staged isolation set and any saved responses.
///
/// An empty staged set is an error: there is nothing to review until
/// isolations have been staged. Missing response slots load as empty maps,
/// so an interrupted session resumes and a first meeting starts clean.
pub fn load(storage: &Storage) -> Result<Session, ReviewError> {
    let isolations = storage.load_isolations()?;
    if isolations.is_empty() {
        return Err(ReviewError::NoIsolationsStaged);
    }

    Ok(Session {
        isolations,
        responses: storage.load_responses()?,
        previous: storage.load_previous_responses()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Response, Risk};

    #[test]
    fn empty_set_is_an_error() {
        let storage = Storage::in_memory().unwrap();
        let err = load(&storage).unwrap_err();

        assert!(matches!(err, ReviewError::NoIsolationsStaged));
    }

    #[test]
    fn loads_set_with_saved_and_previous_responses() {
        let storage = Storage::in_memory().unwrap();
        storage
            .stage_isolations(&[Isolation::new("A"), Isolation::new("B")])
            .unwrap();

        let mut saved = Responses::new();
        saved.insert(
            "A".into(),
            Response {
                risk: Some(Risk::Low),
                ..Response::default()
            },
        );
        storage.save_responses(&saved).unwrap();

        let mut previous = Responses::new();
        previous.insert("B".into(), Response::default());
        storage.save_carryover(&[], &previous).unwrap();

        let session = load(&storage).unwrap();
        assert_eq!(session.isolations.len(), 2);
        assert_eq!(session.responses, saved);
        assert_eq!(session.previous, previous);
    }

    #[test]
    fn missing_responses_load_empty() {
        let storage = Storage::in_memory().unwrap();
        storage.stage_isolations(&[Isolation::new("A")]).unwrap();

        let session = load(&storage).unwrap();
        assert!(session.responses.is_empty());
        assert!(session.previous.is_empty());
    }
}
