//! Statistics module for Pomodaptive
//!
//! This module turns the session history into the adaptive focus
//! recommendation and into per-day summaries for display.

mod recommendation;
mod summary;

pub use recommendation::{
    mean_and_stddev, recommend_next_focus, window_durations, Recommendation, DEFAULT_WINDOW_DAYS,
    MAX_WINDOW_DAYS,
};
pub use summary::{summarize, DaySummary, HistorySummary};
