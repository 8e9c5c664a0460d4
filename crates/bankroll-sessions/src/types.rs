use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Key under which the whole session collection is stored.
pub const SESSIONS_KEY: &str = "poker_sessions";

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_MINUTE: i64 = 60 * 1000;

/// Cash game, tournament, or not chosen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionKind {
    CashGame,
    Tournament,
    #[default]
    Unset,
}

impl SessionKind {
    /// The stored label. `Unset` is stored as an empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::CashGame => "Cash Game",
            SessionKind::Tournament => "Tournament",
            SessionKind::Unset => "",
        }
    }

    /// Parse a stored label. Anything unrecognized is `Unset`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Cash Game" => SessionKind::CashGame,
            "Tournament" => SessionKind::Tournament,
            _ => SessionKind::Unset,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Unset => write!(f, "-"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl Serialize for SessionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .map(SessionKind::from_label)
            .unwrap_or_default())
    }
}

/// A persisted session.
///
/// Field names on the wire follow the stored layout (`buyin`, `blinds`,
/// `gameType`, ...) so existing collections keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// `YYYY-MM-DD` of `start_time`.
    pub date: String,
    /// `HH:MM` of `start_time`.
    pub time: String,
    #[serde(rename = "sessionType", default)]
    pub kind: SessionKind,
    pub location: String,
    #[serde(rename = "duration")]
    pub duration_label: String,
    pub profit: f64,
    #[serde(rename = "buyin")]
    pub buy_in: f64,
    #[serde(rename = "cashout")]
    pub cash_out: f64,
    #[serde(rename = "blinds")]
    pub stakes: String,
    #[serde(rename = "gameType")]
    pub game_variant: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub rebuys: f64,
    #[serde(default)]
    pub table_expenses: f64,
}

impl SessionRecord {
    /// Time at the table.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    /// Recompute every derived field from the stored inputs.
    pub fn refresh_derived(&mut self) {
        self.profit = profit(self.cash_out, self.buy_in, self.rebuys);
        self.duration_label = duration_label(self.start_time, self.end_time);
        self.date = date_label(self.start_time);
        self.time = time_label(self.start_time);
        dedup_tags(&mut self.tags);
    }
}

/// Net result of a session. Table expenses are tracked but not deducted.
pub fn profit(cash_out: f64, buy_in: f64, rebuys: f64) -> f64 {
    cash_out - buy_in - rebuys
}

/// Format `end - start` as `"{h}h {m}m"`.
///
/// Hours are floored and minutes take the sign of the remainder, so a
/// session ending 30 minutes before it started reads `"-1h -30m"`.
pub fn duration_label(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let ms = (end - start).num_milliseconds();
    let hours = ms.div_euclid(MS_PER_HOUR);
    let minutes = (ms % MS_PER_HOUR).div_euclid(MS_PER_MINUTE);
    format!("{}h {}m", hours, minutes)
}

pub(crate) fn date_label(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub(crate) fn time_label(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

/// Drop repeated tags, keeping the first occurrence.
pub(crate) fn dedup_tags(tags: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(duration_label(at(18, 0), at(22, 30)), "4h 30m");
        assert_eq!(duration_label(at(18, 0), at(18, 0)), "0h 0m");
        assert_eq!(duration_label(at(18, 0), at(18, 59)), "0h 59m");
    }

    #[test]
    fn test_duration_label_negative() {
        assert_eq!(duration_label(at(18, 30), at(18, 0)), "-1h -30m");
        assert_eq!(duration_label(at(20, 0), at(18, 0)), "-2h 0m");
    }

    #[test]
    fn test_profit_ignores_expenses() {
        assert_eq!(profit(150.0, 100.0, 0.0), 50.0);
        assert_eq!(profit(0.0, 50.0, 25.0), -75.0);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(SessionKind::from_label("Cash Game"), SessionKind::CashGame);
        assert_eq!(SessionKind::from_label("Tournament"), SessionKind::Tournament);
        assert_eq!(SessionKind::from_label(""), SessionKind::Unset);
        assert_eq!(SessionKind::from_label("tournament"), SessionKind::Unset);
    }

    #[test]
    fn test_dedup_tags_keeps_first() {
        let mut tags = vec![
            "bluff".to_string(),
            "tilt".to_string(),
            "bluff".to_string(),
            "Bluff".to_string(),
        ];
        dedup_tags(&mut tags);
        assert_eq!(tags, vec!["bluff", "tilt", "Bluff"]);
    }

    #[test]
    fn test_record_decodes_legacy_payload() {
        let json = r#"{
            "id": "1704132000000",
            "date": "2024-01-01",
            "time": "18:00",
            "location": "Casino",
            "duration": "4h 30m",
            "profit": 50,
            "buyin": 100,
            "cashout": 150,
            "blinds": "1/2",
            "gameType": "NL Texas Hold Em",
            "notes": "",
            "tags": null,
            "startTime": "2024-01-01T18:00:00.000Z",
            "endTime": "2024-01-01T22:30:00.000Z"
        }"#;

        let record: SessionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.kind, SessionKind::Unset);
        assert!(record.tags.is_empty());
        assert_eq!(record.rebuys, 0.0);
        assert_eq!(record.table_expenses, 0.0);
        assert_eq!(record.start_time, at(18, 0));
        assert_eq!(record.end_time, at(22, 30));
        assert_eq!(record.notes.as_deref(), Some(""));
    }

    #[test]
    fn test_record_serializes_wire_names() {
        let json = r#"{"id":"a","date":"2024-01-01","time":"18:00","sessionType":"Tournament","location":"Online","duration":"1h 0m","profit":-20,"buyin":20,"cashout":0,"blinds":"MTT","gameType":"NL Texas Hold Em","notes":null,"tags":["mtt"],"startTime":"2024-01-01T18:00:00Z","endTime":"2024-01-01T19:00:00Z","rebuys":0,"tableExpenses":2}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, SessionKind::Tournament);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sessionType"], "Tournament");
        assert_eq!(value["blinds"], "MTT");
        assert_eq!(value["gameType"], "NL Texas Hold Em");
        assert_eq!(value["buyin"], 20.0);
        assert_eq!(value["tableExpenses"], 2.0);
        assert!(value.get("duration_label").is_none());
    }
}
