use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::DayEntry;

/// One day of history as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub sessions: usize,
    pub total_minutes: u64,
    pub review: Option<String>,
    pub additional_minutes: Option<u64>,
}

/// Totals across the whole history, newest day first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub days: usize,
    pub total_sessions: usize,
    pub total_minutes: u64,
    pub average_session_minutes: f64,
    pub reviewed_days: usize,
    pub entries: Vec<DaySummary>,
}

impl From<&DayEntry> for DaySummary {
    fn from(entry: &DayEntry) -> Self {
        Self {
            date: entry.date,
            sessions: entry.sessions.len(),
            total_minutes: entry.total_minutes(),
            review: Some(entry.daily_review.clone()).filter(|r| !r.is_empty()),
            additional_minutes: entry.addition_time,
        }
    }
}

/// Summarise `history`, sorting days by date descending.
pub fn summarize(history: &[DayEntry]) -> HistorySummary {
    let mut entries: Vec<DaySummary> = history.iter().map(DaySummary::from).collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let total_sessions: usize = entries.iter().map(|d| d.sessions).sum();
    let total_minutes: u64 = entries.iter().map(|d| d.total_minutes).sum();
    let average_session_minutes = if total_sessions == 0 {
        0.0
    } else {
        total_minutes as f64 / total_sessions as f64
    };

    HistorySummary {
        days: entries.len(),
        total_sessions,
        total_minutes,
        average_session_minutes,
        reviewed_days: entries.iter().filter(|d| d.review.is_some()).count(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SessionEntry;

    fn entry(date: &str, minutes: &[u64], review: &str) -> DayEntry {
        let mut e = DayEntry::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        e.sessions = minutes
            .iter()
            .enumerate()
            .map(|(i, &m)| SessionEntry {
                session_number: i as u32 + 1,
                duration_minutes: m,
            })
            .collect();
        e.daily_review = review.to_string();
        e
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.days, 0);
        assert_eq!(summary.average_session_minutes, 0.0);
        assert!(summary.entries.is_empty());
    }

    #[test]
    fn test_summarize_sorts_newest_first() {
        let history = vec![
            entry("2025-05-20", &[25, 25], "good day"),
            entry("2025-05-22", &[30], ""),
            entry("2025-05-21", &[], ""),
        ];
        let summary = summarize(&history);
        let dates: Vec<String> = summary.entries.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-05-22", "2025-05-21", "2025-05-20"]);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.total_minutes, 80);
        assert!((summary.average_session_minutes - 80.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.reviewed_days, 1);
        assert_eq!(summary.entries[2].review.as_deref(), Some("good day"));
        assert_eq!(summary.entries[0].review, None);
    }
}
