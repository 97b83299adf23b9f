//! Meeting storage: the current meeting, the people directory, and history.

use uuid::Uuid;

use crate::model::{Meeting, PastMeeting};

use super::{Result, Slot, Storage};

impl Storage {
    pub fn load_current_meeting(&self) -> Result<Option<Meeting>> {
        self.read_slot(Slot::CurrentMeeting)
    }

    pub fn save_current_meeting(&self, meeting: &Meeting) -> Result<()> {
        self.write_slot(Slot::CurrentMeeting, meeting)
    }

    pub fn clear_current_meeting(&self) -> Result<()> {
        self.clear_slot(Slot::CurrentMeeting)
    }

    /// Loads the people directory, in the order names were added.
    pub fn load_people(&self) -> Result<Vec<String>> {
        self.read_slot(Slot::People)
    }

    pub fn save_people(&self, people: &[String]) -> Result<()> {
        self.write_slot(Slot::People, people)
    }

    /// Loads every finalized meeting, oldest first.
    pub fn list_past_meetings(&self) -> Result<Vec<PastMeeting>> {
        self.read_slot(Slot::PastMeetings)
    }

    /// Appends a finalized meeting to history.
    pub fn append_past_meeting(&self, meeting: &PastMeeting) -> Result<()> {
        let mut meetings = self.list_past_meetings()?;
        meetings.push(meeting.clone());
        self.write_slot(Slot::PastMeetings, &meetings)
    }

    /// Deletes a finalized meeting. Returns whether anything was removed.
    pub fn delete_past_meeting(&self, id: Uuid) -> Result<bool> {
        let mut meetings = self.list_past_meetings()?;
        let before = meetings.len();
        meetings.retain(|m| m.id != id);
        if meetings.len() == before {
            return Ok(false);
        }
        self.write_slot(Slot::PastMeetings, &meetings)?;
        Ok(true)
    }
}
