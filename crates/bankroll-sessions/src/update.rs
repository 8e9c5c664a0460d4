//! Typed partial updates for stored sessions.

use chrono::{DateTime, Utc};

use crate::types::{self, SessionKind, SessionRecord};

/// A set of field changes for one session. Unset fields are left untouched.
///
/// Derived fields (profit, duration, date and time labels) are never set
/// directly; each is recomputed when a field it depends on is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub kind: Option<SessionKind>,
    pub location: Option<String>,
    pub game_variant: Option<String>,
    pub stakes: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub buy_in: Option<f64>,
    pub cash_out: Option<f64>,
    pub rebuys: Option<f64>,
    pub table_expenses: Option<f64>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
    /// Replaces the whole tag list.
    pub tags: Option<Vec<String>>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: SessionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn game_variant(mut self, game_variant: impl Into<String>) -> Self {
        self.game_variant = Some(game_variant.into());
        self
    }

    pub fn stakes(mut self, stakes: impl Into<String>) -> Self {
        self.stakes = Some(stakes.into());
        self
    }

    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn buy_in(mut self, amount: f64) -> Self {
        self.buy_in = Some(amount);
        self
    }

    pub fn cash_out(mut self, amount: f64) -> Self {
        self.cash_out = Some(amount);
        self
    }

    pub fn rebuys(mut self, amount: f64) -> Self {
        self.rebuys = Some(amount);
        self
    }

    pub fn table_expenses(mut self, amount: f64) -> Self {
        self.table_expenses = Some(amount);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the set fields onto `record`.
    ///
    /// Only the derived fields that depend on a set field are recomputed;
    /// stored labels the update does not touch are kept as they are.
    pub fn apply_to(&self, record: &mut SessionRecord) {
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        if let Some(ref location) = self.location {
            record.location = location.clone();
        }
        if let Some(ref game_variant) = self.game_variant {
            record.game_variant = game_variant.clone();
        }
        if let Some(ref stakes) = self.stakes {
            record.stakes = stakes.clone();
        }
        if let Some(start_time) = self.start_time {
            record.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            record.end_time = end_time;
        }
        if let Some(buy_in) = self.buy_in {
            record.buy_in = buy_in;
        }
        if let Some(cash_out) = self.cash_out {
            record.cash_out = cash_out;
        }
        if let Some(rebuys) = self.rebuys {
            record.rebuys = rebuys;
        }
        if let Some(table_expenses) = self.table_expenses {
            record.table_expenses = table_expenses;
        }
        if let Some(ref notes) = self.notes {
            record.notes = notes.clone();
        }
        if let Some(ref tags) = self.tags {
            record.tags = tags.clone();
            types::dedup_tags(&mut record.tags);
        }

        if self.buy_in.is_some() || self.cash_out.is_some() || self.rebuys.is_some() {
            record.profit = types::profit(record.cash_out, record.buy_in, record.rebuys);
        }
        if self.start_time.is_some() || self.end_time.is_some() {
            record.duration_label = types::duration_label(record.start_time, record.end_time);
        }
        if let Some(start_time) = self.start_time {
            record.date = types::date_label(start_time);
            record.time = types::time_label(start_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::SessionDraft;
    use chrono::TimeZone;

    fn record() -> SessionRecord {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        let mut draft = SessionDraft::starting_at(start);
        draft.kind = SessionKind::CashGame;
        draft.location = "Casino".to_string();
        draft.game_variant = "NL Texas Hold Em".to_string();
        draft.stakes = "1/2".to_string();
        draft.buy_in = 200.0;
        draft.cash_out = 350.0;
        draft.into_record("1".to_string())
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut r = record();
        let before = r.clone();
        let update = SessionUpdate::new();

        assert!(update.is_empty());
        update.apply_to(&mut r);
        assert_eq!(r, before);
    }

    #[test]
    fn test_amount_change_recomputes_profit() {
        let mut r = record();
        SessionUpdate::new().cash_out(100.0).rebuys(50.0).apply_to(&mut r);

        assert_eq!(r.profit, -150.0);
        assert_eq!(r.cash_out, 100.0);
    }

    #[test]
    fn test_time_change_recomputes_labels() {
        let mut r = record();
        let start = Utc.with_ymd_and_hms(2024, 2, 3, 9, 15, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 3, 10, 0, 0).unwrap();

        SessionUpdate::new()
            .start_time(start)
            .end_time(end)
            .apply_to(&mut r);

        assert_eq!(r.date, "2024-02-03");
        assert_eq!(r.time, "09:15");
        assert_eq!(r.duration_label, "0h 45m");
    }

    #[test]
    fn test_end_change_keeps_start_labels() {
        let mut r = record();
        r.time = "19:00".to_string();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();

        SessionUpdate::new().end_time(end).apply_to(&mut r);

        assert_eq!(r.duration_label, "2h 0m");
        assert_eq!(r.time, "19:00");
        assert_eq!(r.date, "2024-01-01");
    }

    #[test]
    fn test_untouched_derived_fields_are_kept() {
        let mut r = record();
        r.profit = 999.0;
        r.time = "19:00".to_string();
        r.tags = vec!["a".to_string(), "a".to_string()];
        let before = r.clone();

        SessionUpdate::new().location("Online").apply_to(&mut r);

        let mut expected = before;
        expected.location = "Online".to_string();
        assert_eq!(r, expected);
    }

    #[test]
    fn test_notes_set_and_clear() {
        let mut r = record();

        SessionUpdate::new().notes("x").apply_to(&mut r);
        assert_eq!(r.notes.as_deref(), Some("x"));

        SessionUpdate::new().clear_notes().apply_to(&mut r);
        assert_eq!(r.notes, None);
    }

    #[test]
    fn test_tags_replaced_and_deduplicated() {
        let mut r = record();
        SessionUpdate::new()
            .tags(["tilt", "deep", "tilt"])
            .apply_to(&mut r);

        assert_eq!(r.tags, vec!["tilt", "deep"]);
    }
}
