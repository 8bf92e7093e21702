//! Driver loop.
//!
//! The driver is the single owner of a [`TimerEngine`]. It applies user
//! commands, ticks the engine once per second while it runs, persists
//! completed sessions and pushes a fresh snapshot to a [`RenderSink`] after
//! every mutation. Storage failures are reported to the sink and never stop
//! the timer.

use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::events::Event;
use crate::stats::{recommend_next_focus, Recommendation};
use crate::storage::{AdaptiveConfig, SessionStore};
use crate::timer::{TimerEngine, TimerSnapshot};

/// Presentation collaborator. Owns how things look, never when they change.
pub trait RenderSink {
    fn render(&mut self, snapshot: &TimerSnapshot);

    fn notify(&mut self, _event: &Event) {}

    /// Non-fatal problem the user should see.
    fn notice(&mut self, _message: &str) {}
}

/// Source of local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a run, or resume a paused one.
    Start,
    Pause,
    Reset,
    Stop,
}

pub struct Driver<S, C = SystemClock> {
    engine: TimerEngine,
    store: SessionStore,
    adaptive: AdaptiveConfig,
    sink: S,
    clock: C,
    recommendation: Option<Recommendation>,
}

impl<S: RenderSink> Driver<S, SystemClock> {
    pub fn new(engine: TimerEngine, store: SessionStore, adaptive: AdaptiveConfig, sink: S) -> Self {
        Self::with_clock(engine, store, adaptive, sink, SystemClock)
    }
}

impl<S: RenderSink, C: Clock> Driver<S, C> {
    /// Build a driver and compute the first suggestion from history.
    pub fn with_clock(
        engine: TimerEngine,
        store: SessionStore,
        adaptive: AdaptiveConfig,
        sink: S,
        clock: C,
    ) -> Self {
        let mut driver = Self {
            engine,
            store,
            adaptive,
            sink,
            clock,
            recommendation: None,
        };
        driver.refresh_suggestion();
        driver
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.engine.snapshot()
    }

    /// Statistics behind the current suggestion, if any.
    pub fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendation.as_ref()
    }

    /// Recompute the recommendation and adopt it. Has no effect during a run.
    pub fn refresh_suggestion(&mut self) {
        if !self.engine.is_idle() {
            return;
        }
        let recommendation = if self.adaptive.enabled {
            recommend_next_focus(
                &self.store.load_all(),
                self.adaptive.window_days,
                self.clock.now(),
            )
        } else {
            None
        };
        if let Some(rec) = &recommendation {
            info!(
                suggested_secs = rec.suggested_secs,
                samples = rec.sample_count,
                "focus recommendation updated"
            );
        }
        self.engine
            .adopt_suggestion(recommendation.as_ref().map(|r| r.suggested_secs));
        self.recommendation = recommendation;
    }

    /// Apply one user command.
    pub fn handle(&mut self, command: Command) {
        debug!(?command, "command");
        let events = match command {
            Command::Start => self.engine.start().into_iter().collect(),
            Command::Pause => self.engine.pause(),
            Command::Reset => self.engine.reset().into_iter().collect(),
            Command::Stop => self.engine.stop().into_iter().collect(),
        };
        self.dispatch(events);
        if command == Command::Stop {
            self.refresh_suggestion();
        }
        self.render();
    }

    /// Advance the engine by one second.
    ///
    /// A phase that reaches zero hands over to the next one within the same
    /// second, so a cycle of focus F and break B takes F + B seconds.
    pub fn step(&mut self) {
        let mut events = self.engine.tick();
        while self.engine.is_running() && self.engine.active_counters().0 == 0 {
            events.extend(self.engine.tick());
        }
        let goal_reached = events
            .iter()
            .any(|e| matches!(e, Event::GoalReached { .. }));
        self.dispatch(events);
        if goal_reached {
            self.refresh_suggestion();
        }
        self.render();
    }

    /// Drive the timer on a one-second cadence.
    ///
    /// Commands received between ticks are applied before the next tick.
    /// Returns when the command channel closes, or when `exit_when_idle` is
    /// set and a started run has gone back to idle.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>, exit_when_idle: bool) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        let mut started = !self.engine.is_idle();
        self.render();

        loop {
            tokio::select! {
                biased;
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    let was_running = self.engine.is_running();
                    self.handle(command);
                    if command == Command::Start && !was_running {
                        started = true;
                        ticker.reset();
                    }
                }
                _ = ticker.tick() => {
                    if self.engine.is_running() {
                        self.step();
                    }
                }
            }
            if exit_when_idle && started && self.engine.is_idle() {
                break;
            }
        }
    }

    fn dispatch(&mut self, events: Vec<Event>) {
        for event in &events {
            if let Event::SessionCompleted {
                duration_minutes, ..
            } = event
            {
                self.record(*duration_minutes);
            }
            self.sink.notify(event);
        }
    }

    fn record(&mut self, duration_minutes: u64) {
        let date = self.clock.now().date();
        match self.store.append_session(date, duration_minutes) {
            Ok(Some(_)) => {}
            Ok(None) => debug!(duration_minutes, "session below minimum length, not recorded"),
            Err(e) => {
                warn!(error = %e, "failed to record session");
                self.sink.notice(&format!("session was not saved: {e}"));
            }
        }
    }

    fn render(&mut self) {
        let snapshot = self.engine.snapshot();
        self.sink.render(&snapshot);
    }
}
