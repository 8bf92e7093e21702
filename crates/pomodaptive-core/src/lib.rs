//! # Pomodaptive Core Library
//!
//! Core logic for a Pomodoro timer that adapts its suggested focus length to
//! the user's recent history. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a second-counting state machine (Idle, Focus, Break);
//!   the caller invokes `tick()` once per elapsed second
//! - **Storage**: JSON per-day session history and TOML configuration
//! - **Stats**: trailing-window recommendation (mean + stddev) and history
//!   summaries
//! - **Driver**: owns the engine, runs the one-second loop, persists
//!   completed sessions and feeds a render sink
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionStore`]: Per-day session history
//! - [`recommend_next_focus`]: Adaptive focus recommendation
//! - [`Driver`]: Tick loop and command routing
//! - [`Config`]: Application configuration management

pub mod driver;
pub mod error;
pub mod events;
pub mod stats;
pub mod storage;
pub mod timer;

pub use driver::{Clock, Command, Driver, FixedClock, RenderSink, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use stats::{recommend_next_focus, summarize, HistorySummary, Recommendation};
pub use storage::{Config, DayEntry, SessionEntry, SessionStore};
pub use timer::{
    percent_elapsed, PausePolicy, Phase, SessionOutcome, TimerConfig, TimerEngine, TimerSnapshot,
};
