//! Responses: the reviewer's assessment of one isolation in one meeting.
//!
//! Completion is defined entirely by [`Response::validate`]: a response is
//! complete when validation reports nothing. Nothing here looks at where the
//! isolation sits in the review order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Assessed risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    /// Medium and High risks must carry a mitigation plan.
    pub fn needs_mitigation(self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for Risk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("expected low, medium or high, got '{other}'")),
        }
    }
}

/// A yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl FromStr for YesNo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            other => Err(format!("expected yes or no, got '{other}'")),
        }
    }
}

/// One question on the review form.
///
/// Declaration order is form order; validation errors sort the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseField {
    Risk,
    Mitigation,
    PartsRequired,
    PartsArrival,
    MocRequired,
    MocNumber,
    MocComments,
    EngineeringSupport,
    EngineerName,
    EngineerEta,
    Comments,
}

impl ResponseField {
    pub const ALL: [Self; 11] = [
        Self::Risk,
        Self::Mitigation,
        Self::PartsRequired,
        Self::PartsArrival,
        Self::MocRequired,
        Self::MocNumber,
        Self::MocComments,
        Self::EngineeringSupport,
        Self::EngineerName,
        Self::EngineerEta,
        Self::Comments,
    ];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Risk => "risk",
            Self::Mitigation => "mitigation",
            Self::PartsRequired => "parts-required",
            Self::PartsArrival => "parts-arrival",
            Self::MocRequired => "moc-required",
            Self::MocNumber => "moc-number",
            Self::MocComments => "moc-comments",
            Self::EngineeringSupport => "engineering-support",
            Self::EngineerName => "engineer-name",
            Self::EngineerEta => "engineer-eta",
            Self::Comments => "comments",
        }
    }

    /// Human label, as shown on the form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Risk => "Risk",
            Self::Mitigation => "Risk mitigation plan",
            Self::PartsRequired => "Parts required",
            Self::PartsArrival => "Parts arrival date",
            Self::MocRequired => "MOC required",
            Self::MocNumber => "MOC number",
            Self::MocComments => "MOC comments",
            Self::EngineeringSupport => "Engineering support",
            Self::EngineerName => "Engineer name",
            Self::EngineerEta => "Engineer ETA",
            Self::Comments => "Comments",
        }
    }
}

impl fmt::Display for ResponseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResponseField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// Per-field validation messages, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<ResponseField, &'static str>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ResponseField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }


    pub fn remove(&mut self, field: ResponseField) {
        self.0.remove(&field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResponseField, &'static str)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }

    fn insert(&mut self, field: ResponseField, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// The reviewer's answers for one isolation.
///
/// Every field is optional while the review is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<Risk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts_required: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts_arrival: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moc_required: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moc_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moc_comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineering_support: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineer_name: Option<String>,
    #[serde(rename = "engineerETA", skip_serializing_if = "Option::is_none")]
    pub engineer_eta: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<Date>,
    /// Recorded with "no changes" and not edited since.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_changes: bool,
}

impl Response {
    /// The "no changes since last meeting" answer: low risk, nothing needed,
    /// with the previous meeting's comments carried over.
    pub fn no_changes(previous: &Response, today: Date) -> Self {
        Self {
            risk: Some(Risk::Low),
            parts_required: Some(YesNo::No),
            moc_required: Some(YesNo::No),
            engineering_support: Some(YesNo::No),
            comments: previous.comments.clone(),
            last_reviewed: Some(today),
            no_changes: true,
            ..Self::default()
        }
    }

    /// A verbatim copy of a previous response, restamped with today's date.
    /// The copy is not itself a "no changes" answer.
    pub fn carried_forward(previous: &Response, today: Date) -> Self {
        Self {
            last_reviewed: Some(today),
            no_changes: false,
            ..previous.clone()
        }
    }

    /// Sets one field from user text. Blank text clears the field. Any edit
    /// drops the "no changes" mark.
    pub fn set(&mut self, field: ResponseField, raw: &str) -> Result<(), String> {
        let raw = raw.trim();
        let blank = raw.is_empty();
        match field {
            ResponseField::Risk => self.risk = parse_opt(raw)?,
            ResponseField::PartsRequired => self.parts_required = parse_opt(raw)?,
            ResponseField::MocRequired => self.moc_required = parse_opt(raw)?,
            ResponseField::EngineeringSupport => self.engineering_support = parse_opt(raw)?,
            ResponseField::PartsArrival => self.parts_arrival = parse_date(raw)?,
            ResponseField::EngineerEta => self.engineer_eta = parse_date(raw)?,
            ResponseField::Mitigation => self.mitigation = text(raw, blank),
            ResponseField::MocNumber => self.moc_number = text(raw, blank),
            ResponseField::MocComments => self.moc_comments = text(raw, blank),
            ResponseField::EngineerName => self.engineer_name = text(raw, blank),
            ResponseField::Comments => self.comments = text(raw, blank),
        }
        self.no_changes = false;
        Ok(())
    }

    /// Display value of one field, if set.
    pub fn get(&self, field: ResponseField) -> Option<String> {
        match field {
            ResponseField::Risk => self.risk.map(|r| r.as_str().to_string()),
            ResponseField::PartsRequired => self.parts_required.map(|v| v.as_str().to_string()),
            ResponseField::MocRequired => self.moc_required.map(|v| v.as_str().to_string()),
            ResponseField::EngineeringSupport => {
                self.engineering_support.map(|v| v.as_str().to_string())
            }
            ResponseField::PartsArrival => self.parts_arrival.map(|d| d.to_string()),
            ResponseField::EngineerEta => self.engineer_eta.map(|d| d.to_string()),
            ResponseField::Mitigation => self.mitigation.clone(),
            ResponseField::MocNumber => self.moc_number.clone(),
            ResponseField::MocComments => self.moc_comments.clone(),
            ResponseField::EngineerName => self.engineer_name.clone(),
            ResponseField::Comments => self.comments.clone(),
        }
    }

    /// Whether a field is shown on the form given the current answers.
    pub fn is_applicable(&self, field: ResponseField) -> bool {
        match field {
            ResponseField::Mitigation => self.risk.is_some_and(Risk::needs_mitigation),
            ResponseField::PartsArrival => self.parts_required.is_some_and(YesNo::is_yes),
            ResponseField::MocNumber | ResponseField::MocComments => {
                self.moc_required.is_some_and(YesNo::is_yes)
            }
            ResponseField::EngineerName | ResponseField::EngineerEta => {
                self.engineering_support.is_some_and(YesNo::is_yes)
            }
            _ => true,
        }
    }

    /// Checks every rule and reports all violations at once.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        match self.risk {
            None => errors.insert(ResponseField::Risk, "Please select a risk level"),
            Some(risk) if risk.needs_mitigation() && !has_text(self.mitigation.as_ref()) => {
                errors.insert(
                    ResponseField::Mitigation,
                    "Please provide a risk mitigation plan",
                );
            }
            Some(_) => {}
        }

        match self.parts_required {
            None => errors.insert(
                ResponseField::PartsRequired,
                "Please indicate if parts are required",
            ),
            Some(YesNo::Yes) if self.parts_arrival.is_none() => errors.insert(
                ResponseField::PartsArrival,
                "Please provide an estimated arrival date",
            ),
            Some(_) => {}
        }

        match self.moc_required {
            None => errors.insert(
                ResponseField::MocRequired,
                "Please indicate if MOC is required",
            ),
            Some(YesNo::Yes) => {
                if !has_text(self.moc_number.as_ref()) {
                    errors.insert(ResponseField::MocNumber, "Please provide a MOC number");
                }
                if !has_text(self.moc_comments.as_ref()) {
                    errors.insert(ResponseField::MocComments, "Please provide MOC comments");
                }
            }
            Some(YesNo::No) => {}
        }

        match self.engineering_support {
            None => errors.insert(
                ResponseField::EngineeringSupport,
                "Please indicate if engineering support is required",
            ),
            Some(YesNo::Yes) => {
                if !has_text(self.engineer_name.as_ref()) {
                    errors.insert(ResponseField::EngineerName, "Please provide an engineer name");
                }
                if self.engineer_eta.is_none() {
                    errors.insert(ResponseField::EngineerEta, "Please provide an engineer ETA");
                }
            }
            Some(YesNo::No) => {}
        }

        errors
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_empty()
    }
}

/// `None`-safe completeness check used over response maps.
pub(crate) fn is_complete(response: Option<&Response>) -> bool {
    response.is_some_and(Response::is_complete)
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

fn text(raw: &str, blank: bool) -> Option<String> {
    (!blank).then(|| raw.to_string())
}

fn parse_opt<T: FromStr<Err = String>>(raw: &str) -> Result<Option<T>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some)
}

fn parse_date(raw: &str) -> Result<Option<Date>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<Date>()
        .map(Some)
        .map_err(|e| format!("expected a date like 2026-01-31: {e}"))
}
