//! Session storage: the staged isolation set, in-progress responses, and the
//! carry-over from the previous meeting.

use crate::model::{Isolation, Responses};

use super::{Result, Slot, Storage};

impl Storage {
    /// Loads the staged isolation set, in import order.
    pub fn load_isolations(&self) -> Result<Vec<Isolation>> {
        self.read_slot(Slot::Isolations)
    }

    /// Replaces the staged isolation set.
    pub fn stage_isolations(&self, isolations: &[Isolation]) -> Result<()> {
        self.write_slot(Slot::Isolations, isolations)
    }

    /// Loads responses recorded so far in the current session.
    ///
    /// Returns an empty map when no session is in progress.
    pub fn load_responses(&self) -> Result<Responses> {
        self.read_slot(Slot::Responses)
    }

    /// Persists the full response map for the current session.
    pub fn save_responses(&self, responses: &Responses) -> Result<()> {
        self.write_slot(Slot::Responses, responses)
    }

    /// Drops the current session's responses.
    pub fn clear_responses(&self) -> Result<()> {
        self.clear_slot(Slot::Responses)
    }

    /// Loads the responses finalized at the previous meeting.
    pub fn load_previous_responses(&self) -> Result<Responses> {
        self.read_slot(Slot::PreviousResponses)
    }

    /// Loads the isolation set reviewed at the previous meeting.
    pub fn load_previous_isolations(&self) -> Result<Vec<Isolation>> {
        self.read_slot(Slot::PreviousIsolations)
    }

    /// Makes the given meeting outcome the carry-over for the next meeting.
    pub fn save_carryover(&self, isolations: &[Isolation], responses: &Responses) -> Result<()> {
        self.write_slot(Slot::PreviousIsolations, isolations)?;
        self.write_slot(Slot::PreviousResponses, responses)
    }
}
