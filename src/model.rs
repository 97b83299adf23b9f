//! Core data model for LTI meetings.
//!
//! These types are what the store persists and what the review loop mutates:
//! isolations staged for review, the reviewer's responses, and the meetings
//! those responses belong to.

mod isolation;
mod meeting;
mod response;

use std::collections::BTreeMap;

pub use isolation::Isolation;
pub use meeting::{Meeting, PastMeeting, Statistics};
pub use response::{Response, ResponseField, Risk, ValidationErrors, YesNo};
pub(crate) use response::is_complete;

/// Responses keyed by isolation id.
pub type Responses = BTreeMap<String, Response>;
