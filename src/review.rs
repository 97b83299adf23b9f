//! The isolation review: one isolation at a time, validated on the way forward.
//!
//! A [`Review`] owns the session loaded by [`load`] and a cursor into its
//! isolation list. Edits merge into the current isolation's response; moving
//! forward validates it first and persists the whole response map. Moving
//! backward never validates. On the last isolation, moving forward asks for
//! confirmation once every isolation is complete.

mod loader;

use jiff::civil::Date;

use crate::model::{
    Isolation, Response, ResponseField, Responses, ValidationErrors, is_complete,
};
use crate::related::{GroupKey, find_related};
use crate::storage::{Storage, StorageError};

pub use loader::{Session, load};

/// Why a review operation could not proceed.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("no isolations are staged for this meeting")]
    NoIsolationsStaged,

    #[error("please complete all required fields before proceeding ({0})")]
    ValidationFailed(ValidationErrors),

    #[error("please complete all isolation reviews before finishing ({incomplete} incomplete)")]
    IncompleteSetAtTerminal { incomplete: usize },

    #[error("isolation {0} has no response from the previous meeting")]
    NoPreviousResponse(String),

    #[error("nothing to confirm: the review is not waiting to finish")]
    NotAwaitingConfirmation,

    #[error("invalid {field}: {message}")]
    InvalidValue {
        field: ResponseField,
        message: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where the session as a whole stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reviewing,
    /// Every isolation is complete and the reviewer was asked to finish.
    AwaitingConfirmation,
    /// Responses were persisted for the summary stage.
    Finished,
}

/// Where one isolation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Unvisited,
    InProgress,
    Complete,
}

impl Progress {
    /// Progress of one isolation given its saved response, if any.
    pub fn of(response: Option<&Response>) -> Self {
        match response {
            None => Self::Unvisited,
            Some(r) if r.is_complete() => Self::Complete,
            Some(_) => Self::InProgress,
        }
    }
}

/// Result of a successful forward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the isolation at this index.
    Moved(usize),
    /// At the last isolation with everything complete.
    AwaitingConfirmation,
}

/// Share of `isolations` with a complete response, rounded to a whole percent.
///
/// An empty set is 0%.
pub fn completion_percentage(isolations: &[Isolation], responses: &Responses) -> u8 {
    let total = isolations.len();
    if total == 0 {
        return 0;
    }
    let done = isolations
        .iter()
        .filter(|i| is_complete(responses.get(&i.id)))
        .count();
    // Round half up without going through floats.
    let pct = (200 * done + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}

/// Index of the first isolation without a complete response, or 0.
pub fn resume_index(isolations: &[Isolation], responses: &Responses) -> usize {
    isolations
        .iter()
        .position(|i| !is_complete(responses.get(&i.id)))
        .unwrap_or(0)
}

fn today() -> Date {
    jiff::Zoned::now().date()
}

/// A review session in progress.
pub struct Review<'a> {
    storage: &'a Storage,
    keys: &'a dyn GroupKey,
    session: Session,
    current: usize,
    errors: ValidationErrors,
    phase: Phase,
    auto_save: bool,
}

impl<'a> Review<'a> {
    /// Starts reviewing `session`, positioned at the first incomplete isolation.
    pub fn new(
        storage: &'a Storage,
        keys: &'a dyn GroupKey,
        session: Session,
        auto_save: bool,
    ) -> Result<Self, ReviewError> {
        if session.isolations.is_empty() {
            return Err(ReviewError::NoIsolationsStaged);
        }
        let current = resume_index(&session.isolations, &session.responses);
        Ok(Self {
            storage,
            keys,
            session,
            current,
            errors: ValidationErrors::default(),
            phase: Phase::Reviewing,
            auto_save,
        })
    }

    // ── Queries ──

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.session.isolations.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.current + 1 == self.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub fn current_isolation(&self) -> &Isolation {
        &self.session.isolations[self.current]
    }

    pub fn current_response(&self) -> Option<&Response> {
        self.session.responses.get(&self.current_isolation().id)
    }

    /// The previous meeting's response for the current isolation.
    pub fn previous_response(&self) -> Option<&Response> {
        self.session.previous.get(&self.current_isolation().id)
    }

    /// Errors from the last failed forward move, minus fields edited since.
    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn progress(&self, index: usize) -> Progress {
        let id = &self.session.isolations[index].id;
        Progress::of(self.session.responses.get(id))
    }

    pub fn completion_percentage(&self) -> u8 {
        completion_percentage(&self.session.isolations, &self.session.responses)
    }

    pub fn incomplete_count(&self) -> usize {
        self.session
            .isolations
            .iter()
            .filter(|i| !is_complete(self.session.responses.get(&i.id)))
            .count()
    }

    /// Other isolations on the same equipment group as the current one.
    pub fn related(&self) -> Vec<&Isolation> {
        find_related(&self.session.isolations, self.current_isolation(), self.keys)
    }

    // ── Transitions ──

    /// Sets one field of the current isolation's response from user text.
    ///
    /// Clears that field's validation error. Persists immediately when
    /// auto-save is on.
    pub fn set_field(&mut self, field: ResponseField, raw: &str) -> Result<(), ReviewError> {
        let id = self.current_isolation().id.clone();
        let mut response = self.session.responses.get(&id).cloned().unwrap_or_default();
        response
            .set(field, raw)
            .map_err(|message| ReviewError::InvalidValue { field, message })?;

        self.session.responses.insert(id, response);
        self.errors.remove(field);
        self.phase = Phase::Reviewing;
        if self.auto_save {
            self.persist()?;
        }
        Ok(())
    }

    /// Moves back one isolation. Returns `false` at the first isolation.
    pub fn go_previous(&mut self) -> bool {
        self.phase = Phase::Reviewing;
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.errors.clear();
        true
    }

    /// Persists, then moves forward if the current response is complete.
    ///
    /// On the last isolation this asks for confirmation instead, provided
    /// every isolation in the set is complete.
    pub fn go_next(&mut self) -> Result<Advance, ReviewError> {
        self.phase = Phase::Reviewing;
        self.persist()?;

        let errors = self.current_response().cloned().unwrap_or_default().validate();

        if self.is_terminal() {
            let incomplete = self.incomplete_count();
            self.errors = errors;
            if incomplete > 0 {
                return Err(ReviewError::IncompleteSetAtTerminal { incomplete });
            }
            self.phase = Phase::AwaitingConfirmation;
            return Ok(Advance::AwaitingConfirmation);
        }

        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(ReviewError::ValidationFailed(errors));
        }

        self.current += 1;
        self.errors.clear();
        Ok(Advance::Moved(self.current))
    }

    /// Drops a pending finish and keeps reviewing.
    pub fn cancel_finish(&mut self) {
        if self.phase == Phase::AwaitingConfirmation {
            self.phase = Phase::Reviewing;
        }
    }

    /// Persists the responses and ends the review.
    pub fn confirm_finish(&mut self) -> Result<(), ReviewError> {
        if self.phase != Phase::AwaitingConfirmation {
            return Err(ReviewError::NotAwaitingConfirmation);
        }
        self.persist()?;
        self.phase = Phase::Finished;
        tracing::info!(isolations = self.len(), "review finished");
        Ok(())
    }

    /// Records "no changes since last meeting" for the current isolation and
    /// moves on.
    ///
    /// The answers are always valid, so this advances without validating.
    /// Returns the new index, or `None` on the last isolation.
    pub fn mark_no_changes(&mut self) -> Result<Option<usize>, ReviewError> {
        let id = self.current_isolation().id.clone();
        let previous = self
            .session
            .previous
            .get(&id)
            .ok_or_else(|| ReviewError::NoPreviousResponse(id.clone()))?;
        let response = Response::no_changes(previous, today());

        self.session.responses.insert(id, response);
        self.errors.clear();
        self.phase = Phase::Reviewing;
        self.persist()?;

        if self.is_terminal() {
            return Ok(None);
        }
        self.current += 1;
        Ok(Some(self.current))
    }

    /// Replaces the current response with the previous meeting's answers.
    pub fn copy_previous(&mut self) -> Result<(), ReviewError> {
        let id = self.current_isolation().id.clone();
        let previous = self
            .session
            .previous
            .get(&id)
            .ok_or_else(|| ReviewError::NoPreviousResponse(id.clone()))?;
        let response = Response::carried_forward(previous, today());

        self.session.responses.insert(id, response);
        self.errors.clear();
        self.phase = Phase::Reviewing;
        self.persist()?;
        Ok(())
    }

    /// Turns auto-save on or off. Turning it on saves right away.
    pub fn set_auto_save(&mut self, on: bool) -> Result<(), ReviewError> {
        if on && !self.auto_save {
            self.persist()?;
        }
        self.auto_save = on;
        Ok(())
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.save_responses(&self.session.responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Risk, YesNo};
    use crate::related::PatternKey;

    fn complete() -> Response {
        Response {
            risk: Some(Risk::Low),
            parts_required: Some(YesNo::No),
            moc_required: Some(YesNo::No),
            engineering_support: Some(YesNo::No),
            ..Response::default()
        }
    }

    fn set_of(n: usize) -> Vec<Isolation> {
        (0..n).map(|i| Isolation::new(format!("ISO-{i}"))).collect()
    }

    fn session(isolations: Vec<Isolation>) -> Session {
        Session {
            isolations,
            ..Session::default()
        }
    }

    fn answer_minimal(review: &mut Review<'_>) {
        review.set_field(ResponseField::Risk, "low").unwrap();
        review.set_field(ResponseField::PartsRequired, "no").unwrap();
        review.set_field(ResponseField::MocRequired, "no").unwrap();
        review
            .set_field(ResponseField::EngineeringSupport, "no")
            .unwrap();
    }

    #[test]
    fn completion_percentage_boundaries() {
        let set = set_of(4);
        let mut responses = Responses::new();
        assert_eq!(completion_percentage(&[], &responses), 0);
        assert_eq!(completion_percentage(&set, &responses), 0);

        responses.insert("ISO-0".into(), complete());
        assert_eq!(completion_percentage(&set, &responses), 25);

        responses.insert("ISO-1".into(), Response::default());
        assert_eq!(completion_percentage(&set, &responses), 25);

        for i in &set {
            responses.insert(i.id.clone(), complete());
        }
        assert_eq!(completion_percentage(&set, &responses), 100);
    }

    #[test]
    fn completion_percentage_rounds() {
        let set = set_of(3);
        let mut responses = Responses::new();
        responses.insert("ISO-0".into(), complete());
        assert_eq!(completion_percentage(&set, &responses), 33);
        responses.insert("ISO-1".into(), complete());
        assert_eq!(completion_percentage(&set, &responses), 67);
    }

    #[test]
    fn completion_ignores_responses_for_unknown_ids() {
        let set = set_of(2);
        let mut responses = Responses::new();
        responses.insert("gone".into(), complete());
        assert_eq!(completion_percentage(&set, &responses), 0);
    }

    #[test]
    fn resumes_at_first_incomplete() {
        let set = set_of(4);
        let mut responses = Responses::new();
        responses.insert("ISO-0".into(), complete());
        responses.insert("ISO-1".into(), complete());
        responses.insert("ISO-2".into(), Response::default());
        assert_eq!(resume_index(&set, &responses), 2);

        responses.insert("ISO-2".into(), complete());
        assert_eq!(resume_index(&set, &responses), 3);

        responses.insert("ISO-3".into(), complete());
        assert_eq!(resume_index(&set, &responses), 0);
    }

    #[test]
    fn empty_session_is_rejected() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let result = Review::new(&storage, &keys, Session::default(), false);
        assert!(matches!(result, Err(ReviewError::NoIsolationsStaged)));
    }

    #[test]
    fn incomplete_next_stays_put_and_reports_everything() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(3)), false).unwrap();

        review.set_field(ResponseField::MocRequired, "no").unwrap();
        let err = review.go_next().unwrap_err();

        assert_eq!(review.current_index(), 0);
        let errors = match err {
            ReviewError::ValidationFailed(errors) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        };
        assert!(errors.get(ResponseField::Risk).is_some());
        assert!(errors.get(ResponseField::PartsRequired).is_some());
        assert!(errors.get(ResponseField::EngineeringSupport).is_some());
        assert_eq!(review.validation_errors(), &errors);
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(2)), false).unwrap();

        assert!(review.go_next().is_err());
        assert!(review.validation_errors().get(ResponseField::Risk).is_some());

        review.set_field(ResponseField::Risk, "high").unwrap();
        assert!(review.validation_errors().get(ResponseField::Risk).is_none());
        assert!(review.validation_errors().get(ResponseField::PartsRequired).is_some());
    }

    #[test]
    fn complete_next_advances_by_one_and_persists() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(3)), false).unwrap();

        answer_minimal(&mut review);
        assert!(storage.load_responses().unwrap().is_empty());

        assert_eq!(review.go_next().unwrap(), Advance::Moved(1));
        assert_eq!(review.current_index(), 1);
        assert!(review.validation_errors().is_empty());
        assert!(storage.load_responses().unwrap()["ISO-0"].is_complete());
    }

    #[test]
    fn auto_save_persists_every_edit() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(2)), true).unwrap();

        review.set_field(ResponseField::Comments, "valve seized").unwrap();

        let saved = storage.load_responses().unwrap();
        assert_eq!(saved["ISO-0"].comments.as_deref(), Some("valve seized"));
    }

    #[test]
    fn enabling_auto_save_saves_immediately() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(2)), false).unwrap();

        review.set_field(ResponseField::Risk, "medium").unwrap();
        assert!(storage.load_responses().unwrap().is_empty());

        review.set_auto_save(true).unwrap();
        assert_eq!(
            storage.load_responses().unwrap()["ISO-0"].risk,
            Some(Risk::Medium)
        );
    }

    #[test]
    fn invalid_value_leaves_response_untouched() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(2)), true).unwrap();

        let err = review.set_field(ResponseField::Risk, "severe").unwrap_err();

        assert!(matches!(
            err,
            ReviewError::InvalidValue {
                field: ResponseField::Risk,
                ..
            }
        ));
        assert_eq!(review.current_response(), None);
        assert_eq!(review.progress(0), Progress::Unvisited);
    }

    #[test]
    fn previous_clamps_and_skips_validation() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(3)), false).unwrap();

        assert!(!review.go_previous());
        assert_eq!(review.current_index(), 0);

        answer_minimal(&mut review);
        review.go_next().unwrap();
        review.set_field(ResponseField::Risk, "high").unwrap();
        let _ = review.go_next();

        assert!(review.go_previous());
        assert_eq!(review.current_index(), 0);
        assert!(review.validation_errors().is_empty());
        assert_eq!(review.progress(1), Progress::InProgress);
    }

    #[test]
    fn terminal_next_with_incomplete_set_warns() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(2)), false).unwrap();

        answer_minimal(&mut review);
        review.go_next().unwrap();
        assert!(review.is_terminal());

        review.set_field(ResponseField::Risk, "high").unwrap();
        let err = review.go_next().unwrap_err();

        assert!(matches!(
            err,
            ReviewError::IncompleteSetAtTerminal { incomplete: 1 }
        ));
        assert_eq!(review.current_index(), 1);
        assert_eq!(review.phase(), Phase::Reviewing);
        assert!(review.validation_errors().get(ResponseField::Mitigation).is_some());

        answer_minimal(&mut review);
        assert_eq!(review.go_next().unwrap(), Advance::AwaitingConfirmation);
        assert_eq!(review.current_index(), 1);
    }

    #[test]
    fn resumed_incomplete_response_blocks_finish() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut responses = Responses::new();
        responses.insert("ISO-0".into(), complete());
        responses.insert(
            "ISO-1".into(),
            Response {
                moc_required: Some(YesNo::Yes),
                ..complete()
            },
        );
        let mut review = Review::new(
            &storage,
            &keys,
            Session {
                isolations: set_of(2),
                responses,
                previous: Responses::new(),
            },
            false,
        )
        .unwrap();

        assert_eq!(review.current_index(), 1);
        assert_eq!(review.progress(1), Progress::InProgress);
        assert!(matches!(
            review.go_next(),
            Err(ReviewError::IncompleteSetAtTerminal { incomplete: 1 })
        ));
    }

    #[test]
    fn confirm_finish_requires_confirmation_state() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(1)), false).unwrap();

        assert!(matches!(
            review.confirm_finish(),
            Err(ReviewError::NotAwaitingConfirmation)
        ));

        answer_minimal(&mut review);
        assert_eq!(review.go_next().unwrap(), Advance::AwaitingConfirmation);

        review.cancel_finish();
        assert_eq!(review.phase(), Phase::Reviewing);
        review.go_next().unwrap();

        review.confirm_finish().unwrap();
        assert_eq!(review.phase(), Phase::Finished);
        assert!(storage.load_responses().unwrap()["ISO-0"].is_complete());
    }

    #[test]
    fn edit_while_awaiting_confirmation_returns_to_reviewing() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(1)), false).unwrap();

        answer_minimal(&mut review);
        review.go_next().unwrap();
        review.set_field(ResponseField::Comments, "one more note").unwrap();

        assert_eq!(review.phase(), Phase::Reviewing);
        assert!(review.confirm_finish().is_err());
    }

    #[test]
    fn two_isolation_scenario_finds_related_after_advancing() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let set = vec![
            Isolation::new("A").with_equipment("CAHE-100-x"),
            Isolation::new("B").with_equipment("CAHE-100-y"),
        ];
        let mut review = Review::new(&storage, &keys, session(set), false).unwrap();

        answer_minimal(&mut review);
        assert_eq!(review.go_next().unwrap(), Advance::Moved(1));

        let related: Vec<&str> = review.related().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(related, ["A"]);
    }

    #[test]
    fn mark_no_changes_uses_defaults_and_advances() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut previous = Responses::new();
        previous.insert(
            "A".into(),
            Response {
                risk: Some(Risk::High),
                mitigation: Some("x".into()),
                comments: Some("keep cool".into()),
                ..Response::default()
            },
        );
        let mut review = Review::new(
            &storage,
            &keys,
            Session {
                isolations: vec![Isolation::new("A"), Isolation::new("B")],
                responses: Responses::new(),
                previous,
            },
            false,
        )
        .unwrap();

        assert_eq!(review.mark_no_changes().unwrap(), Some(1));

        let saved = &storage.load_responses().unwrap()["A"];
        assert_eq!(saved.risk, Some(Risk::Low));
        assert_eq!(saved.mitigation, None);
        assert_eq!(saved.parts_required, Some(YesNo::No));
        assert_eq!(saved.moc_required, Some(YesNo::No));
        assert_eq!(saved.engineering_support, Some(YesNo::No));
        assert_eq!(saved.comments.as_deref(), Some("keep cool"));
        assert_eq!(saved.last_reviewed, Some(today()));
        assert!(saved.no_changes);
    }

    #[test]
    fn mark_no_changes_on_last_isolation_stays() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut previous = Responses::new();
        previous.insert("A".into(), complete());
        let mut review = Review::new(
            &storage,
            &keys,
            Session {
                isolations: vec![Isolation::new("A")],
                responses: Responses::new(),
                previous,
            },
            false,
        )
        .unwrap();

        assert_eq!(review.mark_no_changes().unwrap(), None);
        assert_eq!(review.current_index(), 0);
        assert_eq!(review.phase(), Phase::Reviewing);
    }

    #[test]
    fn carry_over_requires_previous_response() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let mut review = Review::new(&storage, &keys, session(set_of(2)), false).unwrap();

        assert!(matches!(
            review.mark_no_changes(),
            Err(ReviewError::NoPreviousResponse(id)) if id == "ISO-0"
        ));
        assert!(matches!(
            review.copy_previous(),
            Err(ReviewError::NoPreviousResponse(_))
        ));
        assert_eq!(review.current_index(), 0);
    }

    #[test]
    fn copy_previous_overwrites_and_does_not_advance() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        let earlier = Response {
            risk: Some(Risk::Medium),
            mitigation: Some("Blind flange fitted".into()),
            ..complete()
        };
        let mut previous = Responses::new();
        previous.insert("A".into(), earlier.clone());
        let mut review = Review::new(
            &storage,
            &keys,
            Session {
                isolations: vec![Isolation::new("A"), Isolation::new("B")],
                responses: Responses::new(),
                previous,
            },
            false,
        )
        .unwrap();
        review.set_field(ResponseField::Comments, "draft").unwrap();

        review.copy_previous().unwrap();

        assert_eq!(review.current_index(), 0);
        let current = review.current_response().unwrap();
        assert_eq!(current.mitigation, earlier.mitigation);
        assert_eq!(current.comments, None);
        assert_eq!(current.last_reviewed, Some(today()));
        assert_eq!(&storage.load_responses().unwrap()["A"], current);
    }

    #[test]
    fn resumes_saved_session() {
        let storage = Storage::in_memory().unwrap();
        let keys = PatternKey::default();
        storage.stage_isolations(&set_of(3)).unwrap();
        let mut saved = Responses::new();
        saved.insert("ISO-0".into(), complete());
        storage.save_responses(&saved).unwrap();

        let review = Review::new(&storage, &keys, load(&storage).unwrap(), false).unwrap();

        assert_eq!(review.current_index(), 1);
        assert_eq!(review.completion_percentage(), 33);
        assert_eq!(review.progress(0), Progress::Complete);
        assert_eq!(review.progress(2), Progress::Unvisited);
    }
}
