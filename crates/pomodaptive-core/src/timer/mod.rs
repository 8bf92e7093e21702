mod engine;
mod outcome;
mod settings;

pub use engine::{effective_focus_secs, percent_elapsed, Phase, TimerEngine, TimerSnapshot};
pub use outcome::{OutcomeWindow, SessionOutcome};
pub use settings::{
    FatiguePolicy, PausePolicy, SuccessRule, TimerConfig, DEFAULT_BREAK_SECS,
    DEFAULT_FOCUS_SECS, DEFAULT_SESSION_GOAL,
};
