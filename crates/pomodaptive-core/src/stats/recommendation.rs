//! Adaptive focus-length recommendation.
//!
//! Looks at every recorded session inside a trailing window and suggests
//! `mean + population stddev` of their lengths. Biasing upward by one
//! deviation nudges the user toward the longer sessions they have already
//! managed rather than toward the average.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::storage::DayEntry;

/// Default lookback for recommendations.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Longest lookback accepted from configuration (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Suggested next focus interval.
    pub suggested_secs: u64,
    pub mean_minutes: f64,
    pub stddev_minutes: f64,
    /// Number of sessions the statistics were computed from.
    pub sample_count: usize,
    pub window_days: u32,
}

/// Session lengths (minutes, > 0) from days in `[now - window_days, now)`,
/// each day taken at midnight. A window reaching past the calendar's range
/// has no lower bound.
pub fn window_durations(history: &[DayEntry], window_days: u32, now: NaiveDateTime) -> Vec<u64> {
    let window_start = Duration::try_days(i64::from(window_days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(NaiveDateTime::MIN);
    history
        .iter()
        .filter(|entry| {
            entry
                .date
                .and_hms_opt(0, 0, 0)
                .is_some_and(|midnight| window_start <= midnight && midnight < now)
        })
        .flat_map(|entry| entry.sessions.iter())
        .map(|s| s.duration_minutes)
        .filter(|&minutes| minutes > 0)
        .collect()
}

/// Mean and population standard deviation, `None` for an empty sample.
pub fn mean_and_stddev(samples: &[u64]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    Some((mean, variance.sqrt()))
}

/// Next focus length from the trailing window, or `None` when the window
/// holds no sessions and the configured length should be used.
pub fn recommend_next_focus(
    history: &[DayEntry],
    window_days: u32,
    now: NaiveDateTime,
) -> Option<Recommendation> {
    let durations = window_durations(history, window_days, now);
    let (mean, stddev) = mean_and_stddev(&durations)?;
    Some(Recommendation {
        suggested_secs: ((mean + stddev) * 60.0).floor() as u64,
        mean_minutes: mean,
        stddev_minutes: stddev,
        sample_count: durations.len(),
        window_days,
    })
}
