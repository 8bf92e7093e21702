//! Interval state machine.
//!
//! The engine counts whole seconds and has no internal thread or clock. The
//! driver calls `tick()` once per elapsed second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Focus --(0s)--> Break --(0s)--> Focus ... --goal--> Idle
//!                   any --stop--> Idle
//! ```
//!
//! Pause and resume are not separate states: `pause()` clears `running` and
//! `start()` sets it again without touching the counters.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfig::default());
//! engine.start();
//! // once per second:
//! for event in engine.tick() { /* persist, notify */ }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::outcome::{OutcomeWindow, SessionOutcome};
use super::settings::{PausePolicy, SuccessRule, TimerConfig};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Focus,
    Break,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub running: bool,
    pub remaining_secs: u64,
    pub total_secs: u64,
    /// 0.0 ..= 1.0 progress within the active phase.
    pub percent_elapsed: f64,
    pub sessions_completed: u32,
    pub session_goal: u32,
    pub suggested_focus_secs: Option<u64>,
    pub recent_success_rate: Option<f64>,
}

/// Elapsed share of a phase, `0.0` when `total` is zero.
pub fn percent_elapsed(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1.0 - remaining as f64 / total as f64).clamp(0.0, 1.0)
}

/// Focus length used when a cycle is seeded. A suggestion of `Some(0)` is
/// still a suggestion.
pub fn effective_focus_secs(suggested: Option<u64>, configured: u64) -> u64 {
    suggested.unwrap_or(configured)
}

/// Core interval engine. One instance per run, owned by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    config: TimerConfig,
    #[serde(default)]
    pause_policy: PausePolicy,
    #[serde(default)]
    success_rule: SuccessRule,
    phase: Phase,
    running: bool,
    remaining_focus_secs: u64,
    remaining_break_secs: u64,
    /// Focus length seeded for the current cycle.
    focus_total_secs: u64,
    /// Break length seeded for the current cycle.
    break_total_secs: u64,
    sessions_completed: u32,
    #[serde(default)]
    suggested_focus_secs: Option<u64>,
    #[serde(default)]
    outcomes: OutcomeWindow,
}

impl TimerEngine {
    /// Create an idle engine.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            pause_policy: PausePolicy::default(),
            success_rule: SuccessRule::default(),
            phase: Phase::Idle,
            running: false,
            remaining_focus_secs: 0,
            remaining_break_secs: 0,
            focus_total_secs: 0,
            break_total_secs: 0,
            sessions_completed: 0,
            suggested_focus_secs: None,
            outcomes: OutcomeWindow::default(),
        }
    }

    pub fn with_pause_policy(mut self, policy: PausePolicy) -> Self {
        self.pause_policy = policy;
        self
    }

    pub fn with_success_rule(mut self, rule: SuccessRule) -> Self {
        self.success_rule = rule;
        self
    }

    pub fn with_outcome_window(mut self, capacity: usize) -> Self {
        self.outcomes = OutcomeWindow::new(capacity);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && !self.running
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn remaining_focus_secs(&self) -> u64 {
        self.remaining_focus_secs
    }

    pub fn remaining_break_secs(&self) -> u64 {
        self.remaining_break_secs
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn suggested_focus_secs(&self) -> Option<u64> {
        self.suggested_focus_secs
    }

    pub fn outcomes(&self) -> &OutcomeWindow {
        &self.outcomes
    }

    /// Focus length the next cycle will be seeded with.
    pub fn effective_focus_secs(&self) -> u64 {
        effective_focus_secs(self.suggested_focus_secs, self.config.focus_secs())
    }

    /// `(remaining, total)` for the active phase.
    pub fn active_counters(&self) -> (u64, u64) {
        match self.phase {
            Phase::Idle => {
                let focus = self.effective_focus_secs();
                (focus, focus)
            }
            Phase::Focus => (self.remaining_focus_secs, self.focus_total_secs),
            Phase::Break => (self.remaining_break_secs, self.break_total_secs),
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let (remaining_secs, total_secs) = self.active_counters();
        TimerSnapshot {
            phase: self.phase,
            running: self.running,
            remaining_secs,
            total_secs,
            percent_elapsed: percent_elapsed(remaining_secs, total_secs),
            sessions_completed: self.sessions_completed,
            session_goal: self.config.session_goal(),
            suggested_focus_secs: self.suggested_focus_secs,
            recent_success_rate: self.outcomes.success_rate(),
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Replace the timer config. Only allowed while idle.
    ///
    /// # Errors
    /// Returns `ValidationError::NotIdle` during a run.
    pub fn reconfigure(&mut self, config: TimerConfig) -> Result<(), ValidationError> {
        if !self.is_idle() {
            return Err(ValidationError::NotIdle {
                action: "reconfigure".into(),
            });
        }
        self.config = config;
        Ok(())
    }

    /// Adopt a recommendation between runs. Returns `false` and leaves the
    /// suggestion untouched when a run is in progress.
    pub fn adopt_suggestion(&mut self, suggestion: Option<u64>) -> bool {
        if !self.is_idle() {
            return false;
        }
        if self.suggested_focus_secs != suggestion {
            debug!(?suggestion, "adopted focus suggestion");
        }
        self.suggested_focus_secs = suggestion;
        true
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run from Idle, or resume a paused one.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        if self.phase == Phase::Idle {
            self.seed_cycle();
            self.sessions_completed = 0;
            self.phase = Phase::Focus;
            self.running = true;
            debug!(focus_secs = self.focus_total_secs, "run started");
            return Some(Event::Started {
                focus_secs: self.focus_total_secs,
                break_secs: self.break_total_secs,
                session_goal: self.config.session_goal(),
            });
        }
        self.running = true;
        let (remaining_secs, _) = self.active_counters();
        Some(Event::Resumed {
            phase: self.phase,
            remaining_secs,
        })
    }

    /// Stop the clock. Depending on the pause policy this may also emit a
    /// partial session and shrink the next focus interval.
    pub fn pause(&mut self) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        self.running = false;
        let (remaining_secs, _) = self.active_counters();
        let mut events = vec![Event::Paused {
            phase: self.phase,
            remaining_secs,
        }];

        if self.phase != Phase::Focus {
            return events;
        }
        let consumed = self.consumed_focus_secs();

        if self.pause_policy.record_partial {
            let outcome = self.evaluate(consumed);
            events.push(Event::SessionCompleted {
                duration_minutes: consumed / 60,
                success: outcome.success,
                partial: true,
            });
        }

        if let Some(to_secs) = self
            .pause_policy
            .fatigue
            .shrunk_focus(consumed, self.focus_total_secs)
        {
            let from_secs = self.effective_focus_secs();
            if to_secs < from_secs {
                self.suggested_focus_secs = Some(to_secs);
                debug!(from_secs, to_secs, "fatigue shrank next focus interval");
                events.push(Event::SuggestionShrunk { from_secs, to_secs });
            }
        }
        events
    }

    /// Restore the current phase's counter. Phase and session count stay.
    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        let remaining_secs = match self.phase {
            Phase::Idle => return None,
            Phase::Focus => {
                self.remaining_focus_secs = self.focus_total_secs;
                self.remaining_focus_secs
            }
            Phase::Break => {
                self.remaining_break_secs = self.break_total_secs;
                self.remaining_break_secs
            }
        };
        Some(Event::Reset {
            phase: self.phase,
            remaining_secs,
        })
    }

    /// Abandon the run and clear all session progress.
    pub fn stop(&mut self) -> Option<Event> {
        self.phase = Phase::Idle;
        self.running = false;
        self.remaining_focus_secs = 0;
        self.remaining_break_secs = 0;
        self.sessions_completed = 0;
        debug!("run stopped");
        Some(Event::Stopped)
    }

    /// Advance by one second. Does nothing unless running.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        match self.phase {
            Phase::Idle => Vec::new(),
            Phase::Focus if self.remaining_focus_secs > 0 => {
                self.remaining_focus_secs -= 1;
                Vec::new()
            }
            Phase::Focus => {
                self.phase = Phase::Break;
                debug!(session = self.sessions_completed + 1, "focus complete");
                vec![Event::FocusCompleted {
                    session_number: self.sessions_completed + 1,
                }]
            }
            Phase::Break if self.remaining_break_secs > 0 => {
                self.remaining_break_secs -= 1;
                Vec::new()
            }
            Phase::Break => self.complete_cycle(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn seed_cycle(&mut self) {
        self.focus_total_secs = self.effective_focus_secs();
        self.remaining_focus_secs = self.focus_total_secs;
        self.break_total_secs = self.config.break_secs();
        self.remaining_break_secs = self.break_total_secs;
    }

    fn consumed_focus_secs(&self) -> u64 {
        self.focus_total_secs.saturating_sub(self.remaining_focus_secs)
    }

    fn evaluate(&mut self, consumed: u64) -> SessionOutcome {
        let outcome = SessionOutcome {
            success: self.success_rule.is_success(consumed, self.focus_total_secs),
            consumed_secs: consumed,
            planned_secs: self.focus_total_secs,
        };
        self.outcomes.push(outcome);
        outcome
    }

    fn complete_cycle(&mut self) -> Vec<Event> {
        let session_number = self.sessions_completed + 1;
        let consumed = self.consumed_focus_secs();
        let outcome = self.evaluate(consumed);
        self.sessions_completed = session_number;

        let mut events = vec![
            Event::BreakCompleted { session_number },
            Event::SessionCompleted {
                duration_minutes: consumed / 60,
                success: outcome.success,
                partial: false,
            },
        ];

        if self.sessions_completed >= self.config.session_goal() {
            self.phase = Phase::Idle;
            self.running = false;
            debug!(sessions = self.sessions_completed, "session goal reached");
            events.push(Event::GoalReached {
                sessions_completed: self.sessions_completed,
            });
        } else {
            self.seed_cycle();
            self.phase = Phase::Focus;
        }
        events
    }
}
