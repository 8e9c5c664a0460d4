//! Aggregate statistics over a set of sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionRecord;

/// Aggregate profit statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_profit: f64,
    pub total_sessions: usize,
    /// Percentage of sessions with positive profit, rounded to 2 decimals.
    pub win_rate: f64,
    pub average_profit: f64,
}

/// One point of the cumulative bankroll curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankrollPoint {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub profit: f64,
    pub cumulative_profit: f64,
}

pub fn compute_stats(records: &[SessionRecord]) -> Stats {
    let total_sessions = records.len();
    if total_sessions == 0 {
        return Stats::default();
    }

    let total_profit: f64 = records.iter().map(|r| r.profit).sum();
    let wins = records.iter().filter(|r| r.is_win()).count();
    let win_rate = round2(wins as f64 / total_sessions as f64 * 100.0);

    Stats {
        total_profit,
        total_sessions,
        win_rate,
        average_profit: total_profit / total_sessions as f64,
    }
}

/// Running profit in chronological order (ties broken by ID).
pub fn bankroll_series(records: &[SessionRecord]) -> Vec<BankrollPoint> {
    let mut ordered: Vec<&SessionRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

    let mut running = 0.0;
    ordered
        .into_iter()
        .map(|r| {
            running += r.profit;
            BankrollPoint {
                id: r.id.clone(),
                start_time: r.start_time,
                profit: r.profit,
                cumulative_profit: running,
            }
        })
        .collect()
}

/// Total time at the table.
pub fn total_duration(records: &[SessionRecord]) -> Duration {
    records
        .iter()
        .fold(Duration::zero(), |acc, r| acc + r.duration())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(50.0), 50.0);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        assert_eq!(
            compute_stats(&[]),
            Stats {
                total_profit: 0.0,
                total_sessions: 0,
                win_rate: 0.0,
                average_profit: 0.0,
            }
        );
        assert!(bankroll_series(&[]).is_empty());
        assert_eq!(total_duration(&[]), Duration::zero());
    }
}
