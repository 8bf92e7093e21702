use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change of the timer produces an Event.
/// The driver routes them to the history store and the render sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Idle -> Focus with freshly seeded counters.
    Started {
        focus_secs: u64,
        break_secs: u64,
        session_goal: u32,
    },
    Paused {
        phase: Phase,
        remaining_secs: u64,
    },
    Resumed {
        phase: Phase,
        remaining_secs: u64,
    },
    /// Current phase counter restored to its seeded value.
    Reset {
        phase: Phase,
        remaining_secs: u64,
    },
    Stopped,
    FocusCompleted {
        session_number: u32,
    },
    BreakCompleted {
        session_number: u32,
    },
    /// A focus interval that should be persisted.
    SessionCompleted {
        duration_minutes: u64,
        success: bool,
        /// Recorded from a pause rather than a finished cycle.
        partial: bool,
    },
    /// Fatigue rule lowered the next focus interval.
    SuggestionShrunk {
        from_secs: u64,
        to_secs: u64,
    },
    GoalReached {
        sessions_completed: u32,
    },
}
