//! Compilation of field rules into a status lookup table.
//!
//! A [`StateIndex`] answers "which field does an issue with this status and
//! resolution belong to?". It is built in one pass over the declared fields:
//!
//! - a field with a `resolution` rule maps every `(state, resolution)` pair
//!   to itself; a later field declaring the same pair replaces the earlier one
//! - a field without one is appended to the state's fallback list, so when
//!   several fields claim the same bare state the first declared wins

use crate::domain::board::FieldSet;
use crate::error::SkipReason;
use serde::Serialize;
use std::collections::BTreeMap;

/// Candidate fields for one state key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSelector {
    /// resolution name → field
    pub resolutions: BTreeMap<String, String>,
    /// Fields declared for the state without a resolution constraint, in compile order
    pub fallback: Vec<String>,
}

impl FieldSelector {
    /// Picks the field for an issue's resolution.
    ///
    /// An enumerated resolution wins; otherwise the first fallback field is
    /// used. `None` means the issue cannot be placed on the board.
    pub fn select(&self, resolution: Option<&str>) -> Option<&str> {
        resolution
            .and_then(|r| self.resolutions.get(r))
            .or_else(|| self.fallback.first())
            .map(String::as_str)
    }

    /// Every field this selector can yield
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.resolutions
            .values()
            .chain(self.fallback.iter())
            .map(String::as_str)
    }
}

/// Lookup table from tracker status to board field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateIndex(BTreeMap<String, FieldSelector>);

impl StateIndex {
    pub fn get(&self, state: &str) -> Option<&FieldSelector> {
        self.0.get(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves the field for a status/resolution pair
    pub fn resolve(&self, status: &str, resolution: Option<&str>) -> Result<&str, SkipReason> {
        let selector = self
            .0
            .get(status)
            .ok_or_else(|| SkipReason::UnmappedStatus(status.to_string()))?;

        selector
            .select(resolution)
            .ok_or_else(|| SkipReason::UnmappedResolution {
                status: status.to_string(),
                resolution: resolution.map(str::to_string),
            })
    }
}

/// Compiles field rules into a [`StateIndex`].
///
/// `delayed` names the reserved field that is never a classification target;
/// it is skipped wherever it appears. Field order is significant: it decides
/// which field wins a repeated `(state, resolution)` pair (the last) and
/// which wins a shared bare state (the first).
pub fn compile(fields: &FieldSet, delayed: &str) -> StateIndex {
    let table = fields
        .iter()
        .filter(|(field, _)| *field != delayed)
        .fold(BTreeMap::new(), |mut table, (field, rule)| {
            for state in rule.state_keys() {
                let selector: &mut FieldSelector = table.entry(state.to_string()).or_default();

                match rule.resolutions() {
                    Some(resolutions) => {
                        for resolution in resolutions {
                            selector
                                .resolutions
                                .insert(resolution.clone(), field.to_string());
                        }
                    }
                    None => selector.fallback.push(field.to_string()),
                }
            }
            table
        });

    StateIndex(table)
}
