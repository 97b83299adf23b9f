//! Meetings: the one being prepared and the ones already finalized.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Isolation, Responses, Risk, YesNo};

/// The meeting currently being set up or reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub date: Date,
    pub attendees: Vec<String>,
}

/// A finalized meeting, appended to history and never edited afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastMeeting {
    pub id: Uuid,
    pub date: Date,
    pub attendees: Vec<String>,
    pub responses: Responses,
    pub statistics: Statistics,
    pub finalized_at: Timestamp,
    #[serde(default)]
    pub added_isolations: Vec<Isolation>,
    #[serde(default)]
    pub removed_isolations: Vec<Isolation>,
}

/// Response counts for a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub by_risk: TallyRisk,
    pub by_parts: TallyYesNo,
    #[serde(rename = "byMOC")]
    pub by_moc: TallyYesNo,
    pub by_engineering: TallyYesNo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TallyRisk {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TallyYesNo {
    pub yes: usize,
    pub no: usize,
}

impl TallyRisk {
    fn count(&mut self, risk: Option<Risk>) {
        match risk {
            Some(Risk::Low) => self.low += 1,
            Some(Risk::Medium) => self.medium += 1,
            Some(Risk::High) => self.high += 1,
            None => {}
        }
    }
}

impl TallyYesNo {
    fn count(&mut self, answer: Option<YesNo>) {
        match answer {
            Some(YesNo::Yes) => self.yes += 1,
            Some(YesNo::No) => self.no += 1,
            None => {}
        }
    }
}

impl Statistics {
    /// Tallies every response. Unanswered questions are not counted.
    pub fn from_responses(responses: &Responses) -> Self {
        let mut stats = Self {
            total: responses.len(),
            ..Self::default()
        };
        for r in responses.values() {
            stats.by_risk.count(r.risk);
            stats.by_parts.count(r.parts_required);
            stats.by_moc.count(r.moc_required);
            stats.by_engineering.count(r.engineering_support);
        }
        stats
    }
}
