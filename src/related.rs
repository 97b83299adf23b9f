//! Related-isolation detection.
//!
//! Isolations whose equipment strings share a group key (by default the three
//! digits after `CAHE-`) probably sit on the same system. The review surfaces
//! them as a warning; they never block validation.

use regex::{Regex, RegexBuilder};

use crate::model::Isolation;

/// The default grouping pattern: `CAHE-123…`, `cahe123…`.
pub const DEFAULT_PATTERN: &str = r"CAHE-?(\d{3})";

/// Derives a group key from an equipment string.
pub trait GroupKey {
    /// Returns the group key, or `None` when the string carries no key.
    fn key(&self, equipment: &str) -> Option<String>;
}

/// Group key taken from a regular expression match.
///
/// The first capture group is the key; a pattern without groups uses the
/// whole match. Matching is case-insensitive and keys are lowercased, so
/// `Unit-4` and `unit-4` share a key.
#[derive(Debug, Clone)]
pub struct PatternKey {
    regex: Regex,
}

impl PatternKey {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }
}

impl Default for PatternKey {
    fn default() -> Self {
        Self {
            regex: RegexBuilder::new(DEFAULT_PATTERN)
                .case_insensitive(true)
                .build()
                .unwrap_or_else(|e| unreachable!("default pattern is valid: {e}")),
        }
    }
}

impl GroupKey for PatternKey {
    fn key(&self, equipment: &str) -> Option<String> {
        let caps = self.regex.captures(equipment)?;
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().to_lowercase())
    }
}

fn key_of(isolation: &Isolation, keys: &dyn GroupKey) -> Option<String> {
    isolation
        .system_equipment
        .as_deref()
        .and_then(|e| keys.key(e))
}

/// Finds the other isolations in `isolations` sharing `current`'s group key.
///
/// Results keep set order. No key on `current` means no relations.
pub fn find_related<'a>(
    isolations: &'a [Isolation],
    current: &Isolation,
    keys: &dyn GroupKey,
) -> Vec<&'a Isolation> {
    let Some(wanted) = key_of(current, keys) else {
        return Vec::new();
    };
    isolations
        .iter()
        .filter(|i| i.id != current.id)
        .filter(|i| key_of(i, keys).is_some_and(|k| k == wanted))
        .collect()
}
