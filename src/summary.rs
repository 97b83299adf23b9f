//! Meeting summary: statistics for the session, and finalizing it into history.
//!
//! Finalizing is the hand-off between meetings. The finished responses
//! become a [`PastMeeting`] record and the carry-over for the next meeting;
//! the session slots are then cleared.

use jiff::Timestamp;
use uuid::Uuid;

use crate::import::diff_sets;
use crate::model::{Isolation, PastMeeting, Responses, Statistics, is_complete};
use crate::review::{self, ReviewError};
use crate::storage::{Storage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    #[error("no meeting is set up; run `lti meeting new` first")]
    NoCurrentMeeting,

    #[error("{0} isolation(s) are still incomplete; finish the review first")]
    Incomplete(usize),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Responses for isolations in the set, dropping any left over from
/// isolations that are no longer staged.
pub fn responses_for(isolations: &[Isolation], responses: &Responses) -> Responses {
    isolations
        .iter()
        .filter_map(|i| responses.get(&i.id).map(|r| (i.id.clone(), r.clone())))
        .collect()
}

/// Statistics for the session currently in progress.
pub fn session_statistics(storage: &Storage) -> Result<Statistics, StorageError> {
    let isolations = storage.load_isolations()?;
    let responses = storage.load_responses()?;
    Ok(Statistics::from_responses(&responses_for(
        &isolations,
        &responses,
    )))
}

/// Turns the completed session into a past-meeting record.
///
/// Requires a current meeting and a fully complete staged set. Each response
/// is stamped with the meeting date as its last review.
pub fn finalize(storage: &Storage) -> Result<PastMeeting, FinalizeError> {
    let meeting = storage
        .load_current_meeting()?
        .ok_or(FinalizeError::NoCurrentMeeting)?;
    let session = review::load(storage)?;

    let incomplete = session
        .isolations
        .iter()
        .filter(|i| !is_complete(session.responses.get(&i.id)))
        .count();
    if incomplete > 0 {
        return Err(FinalizeError::Incomplete(incomplete));
    }

    let mut responses = responses_for(&session.isolations, &session.responses);
    for r in responses.values_mut() {
        r.last_reviewed = Some(meeting.date);
    }

    let previous_set = storage.load_previous_isolations()?;
    let (added, removed) = diff_sets(&previous_set, &session.isolations);

    let record = PastMeeting {
        id: Uuid::new_v4(),
        date: meeting.date,
        attendees: meeting.attendees,
        statistics: Statistics::from_responses(&responses),
        responses,
        finalized_at: Timestamp::now(),
        added_isolations: added,
        removed_isolations: removed,
    };

    storage.append_past_meeting(&record)?;
    storage.save_carryover(&session.isolations, &record.responses)?;
    storage.clear_responses()?;
    storage.clear_current_meeting()?;

    tracing::info!(
        meeting = %record.id,
        date = %record.date,
        isolations = record.responses.len(),
        "meeting finalized"
    );
    Ok(record)
}
