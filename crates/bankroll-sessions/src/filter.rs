//! In-memory narrowing of a session list.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionKind, SessionRecord};

/// Session type constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    #[default]
    All,
    /// Matches every session that is not a tournament, including sessions
    /// whose type was never set.
    CashGame,
    Tournament,
}

impl KindFilter {
    pub fn matches(&self, kind: SessionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::CashGame => kind != SessionKind::Tournament,
            KindFilter::Tournament => kind == SessionKind::Tournament,
        }
    }
}

/// Inclusive bounds on a session's start time. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

/// Active filter constraints. Categories combine with AND; values within a
/// category combine with OR. Empty sets impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub kind: KindFilter,
    pub locations: BTreeSet<String>,
    pub game_variants: BTreeSet<String>,
    pub stakes: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    /// True when no constraint is active.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active filter categories.
    pub fn active_count(&self) -> usize {
        [
            self.kind != KindFilter::All,
            !self.locations.is_empty(),
            !self.game_variants.is_empty(),
            !self.stakes.is_empty(),
            !self.tags.is_empty(),
            self.date_range.is_some_and(|r| r != DateRange::default()),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Whether a single session passes every active constraint.
    pub fn matches(&self, record: &SessionRecord) -> bool {
        if !self.kind.matches(record.kind) {
            return false;
        }

        if !self.locations.is_empty() && !self.locations.contains(&record.location) {
            return false;
        }

        if !self.game_variants.is_empty() && !self.game_variants.contains(&record.game_variant) {
            return false;
        }

        if !self.stakes.is_empty() && !self.stakes.contains(&record.stakes) {
            return false;
        }

        if !self.tags.is_empty() && !record.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }

        if let Some(range) = self.date_range {
            if !range.contains(record.start_time) {
                return false;
            }
        }

        true
    }
}

/// Fields that filter pickers offer values for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Location,
    GameVariant,
    Stakes,
    Tags,
}

/// Keep the sessions matching `criteria`, preserving order.
pub fn apply(records: &[SessionRecord], criteria: &FilterCriteria) -> Vec<SessionRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Distinct values present for `field`. For tags this is the union of every
/// session's tags.
pub fn available_values(records: &[SessionRecord], field: FilterField) -> BTreeSet<String> {
    match field {
        FilterField::Location => records.iter().map(|r| r.location.clone()).collect(),
        FilterField::GameVariant => records.iter().map(|r| r.game_variant.clone()).collect(),
        FilterField::Stakes => records.iter().map(|r| r.stakes.clone()).collect(),
        FilterField::Tags => records.iter().flat_map(|r| r.tags.iter().cloned()).collect(),
    }
}
