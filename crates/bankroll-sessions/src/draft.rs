//! Session input before it is stored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DraftIssue, ValidationError};
use crate::types::{self, SessionKind, SessionRecord};

/// Locations offered before any custom value has been entered.
pub const LOCATION_PRESETS: &[&str] = &["Home Game", "Casino", "Online"];

/// Game variants offered before any custom value has been entered.
pub const GAME_PRESETS: &[&str] = &["NL Texas Hold Em", "Pot Limit Omaha", "Razz", "Mixed"];

/// Stakes offered before any custom value has been entered.
pub const STAKES_PRESETS: &[&str] = &["1/2", "1/3", "2/5", "5/10"];

/// Length of a freshly started draft.
pub const DEFAULT_SESSION_HOURS: i64 = 5;

/// User-entered session data, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub kind: SessionKind,
    pub location: String,
    pub game_variant: String,
    pub stakes: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub buy_in: f64,
    pub cash_out: f64,
    pub rebuys: f64,
    pub table_expenses: f64,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl SessionDraft {
    /// An empty draft starting at `start` and running for the default length.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            kind: SessionKind::Unset,
            location: String::new(),
            game_variant: String::new(),
            stakes: String::new(),
            start_time: start,
            end_time: start + Duration::hours(DEFAULT_SESSION_HOURS),
            buy_in: 0.0,
            cash_out: 0.0,
            rebuys: 0.0,
            table_expenses: 0.0,
            notes: None,
            tags: Vec::new(),
        }
    }

    /// Add a tag. Surrounding whitespace is trimmed; blank and duplicate tags
    /// are ignored. Returns whether the tag was inserted.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn profit(&self) -> f64 {
        types::profit(self.cash_out, self.buy_in, self.rebuys)
    }

    /// Check the required fields and amounts.
    ///
    /// Every problem is reported, not just the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.kind == SessionKind::Unset {
            issues.push(DraftIssue::MissingKind);
        }
        if self.location.trim().is_empty() {
            issues.push(DraftIssue::MissingLocation);
        }
        if self.game_variant.trim().is_empty() {
            issues.push(DraftIssue::MissingGame);
        }
        if self.stakes.trim().is_empty() {
            issues.push(DraftIssue::MissingStakes);
        }
        if self.buy_in <= 0.0 || self.buy_in.is_nan() {
            issues.push(DraftIssue::BuyInNotPositive);
        }
        for (field, amount) in [
            ("cash out", self.cash_out),
            ("rebuys", self.rebuys),
            ("table expenses", self.table_expenses),
        ] {
            if amount < 0.0 || amount.is_nan() {
                issues.push(DraftIssue::NegativeAmount(field));
            }
        }
        if self.end_time < self.start_time {
            issues.push(DraftIssue::EndBeforeStart);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Build the stored record, computing every derived field.
    pub(crate) fn into_record(self, id: String) -> SessionRecord {
        let mut record = SessionRecord {
            id,
            date: String::new(),
            time: String::new(),
            kind: self.kind,
            location: self.location,
            duration_label: String::new(),
            profit: 0.0,
            buy_in: self.buy_in,
            cash_out: self.cash_out,
            stakes: self.stakes,
            game_variant: self.game_variant,
            notes: self.notes,
            tags: self.tags,
            start_time: self.start_time,
            end_time: self.end_time,
            rebuys: self.rebuys,
            table_expenses: self.table_expenses,
        };
        record.refresh_derived();
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()
    }

    fn complete_draft() -> SessionDraft {
        let mut draft = SessionDraft::starting_at(start());
        draft.kind = SessionKind::CashGame;
        draft.location = "Casino".to_string();
        draft.game_variant = "NL Texas Hold Em".to_string();
        draft.stakes = "1/2".to_string();
        draft.buy_in = 100.0;
        draft
    }

    #[test]
    fn test_starting_at_defaults() {
        let draft = SessionDraft::starting_at(start());

        assert_eq!(draft.end_time - draft.start_time, Duration::hours(5));
        assert_eq!(draft.kind, SessionKind::Unset);
        assert_eq!(draft.buy_in, 0.0);
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_add_tag_trims_and_dedups() {
        let mut draft = SessionDraft::starting_at(start());

        assert!(draft.add_tag("  bluff "));
        assert!(!draft.add_tag("bluff"));
        assert!(!draft.add_tag("   "));
        assert!(draft.add_tag("Bluff"));

        assert_eq!(draft.tags, vec!["bluff", "Bluff"]);
    }

    #[test]
    fn test_remove_tag() {
        let mut draft = SessionDraft::starting_at(start());
        draft.add_tag("tilt");

        assert!(draft.remove_tag("tilt"));
        assert!(!draft.remove_tag("tilt"));
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_validate_complete_draft() {
        assert!(complete_draft().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let draft = SessionDraft::starting_at(start());

        let err = draft.validate().unwrap_err();

        assert_eq!(
            err.issues,
            vec![
                DraftIssue::MissingKind,
                DraftIssue::MissingLocation,
                DraftIssue::MissingGame,
                DraftIssue::MissingStakes,
                DraftIssue::BuyInNotPositive,
            ]
        );
    }

    #[test]
    fn test_validate_rejects_negative_amounts_and_reversed_times() {
        let mut draft = complete_draft();
        draft.rebuys = -10.0;
        draft.end_time = draft.start_time - Duration::minutes(30);

        let err = draft.validate().unwrap_err();

        assert_eq!(
            err.issues,
            vec![
                DraftIssue::NegativeAmount("rebuys"),
                DraftIssue::EndBeforeStart,
            ]
        );
        assert!(err.to_string().contains("rebuys"));
    }

    #[test]
    fn test_into_record_derives_fields() {
        let mut draft = complete_draft();
        draft.end_time = Utc.with_ymd_and_hms(2024, 1, 1, 22, 30, 0).unwrap();
        draft.cash_out = 180.0;
        draft.rebuys = 20.0;
        draft.table_expenses = 15.0;

        let record = draft.into_record("abc".to_string());

        assert_eq!(record.id, "abc");
        assert_eq!(record.date, "2024-01-01");
        assert_eq!(record.time, "18:00");
        assert_eq!(record.duration_label, "4h 30m");
        assert_eq!(record.profit, 60.0);
        assert_eq!(record.table_expenses, 15.0);
    }
}
