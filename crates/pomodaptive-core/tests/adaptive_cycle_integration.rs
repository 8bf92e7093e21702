//! Integration tests for the adaptive cycle.
//!
//! Runs the driver against a file-backed history and checks that what one
//! run records changes the focus length the next run starts with.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use pomodaptive_core::storage::AdaptiveConfig;
use pomodaptive_core::{
    recommend_next_focus, Command, Driver, Event, FixedClock, Phase, RenderSink, SessionStore,
    TimerConfig, TimerEngine, TimerSnapshot,
};
use tempfile::TempDir;

#[derive(Default)]
struct CountingSink {
    renders: usize,
    events: Vec<Event>,
}

impl RenderSink for CountingSink {
    fn render(&mut self, _snapshot: &TimerSnapshot) {
        self.renders += 1;
    }
    fn notify(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn run_to_idle(driver: &mut Driver<CountingSink, FixedClock>) {
    driver.handle(Command::Start);
    let mut guard = 0;
    while !driver.engine().is_idle() {
        driver.step();
        guard += 1;
        assert!(guard < 100_000, "run never reached idle");
    }
}

#[test]
fn test_spec_scenario_two_sessions() {
    let engine = TimerEngine::new(TimerConfig::new(5, 3, 2).unwrap());
    let mut driver = Driver::with_clock(
        engine,
        SessionStore::in_memory(),
        AdaptiveConfig::default(),
        CountingSink::default(),
        FixedClock(at(20, 10)),
    );
    driver.handle(Command::Start);

    for _ in 0..5 {
        driver.step();
    }
    assert_eq!(driver.engine().phase(), Phase::Break);
    assert_eq!(driver.snapshot().remaining_secs, 3);
    for _ in 0..3 {
        driver.step();
    }
    assert_eq!(driver.engine().phase(), Phase::Focus);
    assert_eq!(driver.engine().sessions_completed(), 1);

    for _ in 0..7 {
        driver.step();
    }
    assert_eq!(driver.engine().phase(), Phase::Break);
    driver.step();
    let snap = driver.snapshot();
    assert_eq!(snap.phase, Phase::Idle);
    assert!(!snap.running);
    assert_eq!(snap.sessions_completed, 2);
    assert_eq!(snap.session_goal, 2);
    // Five-second sessions floor to zero minutes and are not stored.
    assert!(driver.store().load_all().is_empty());
}

#[test]
fn test_history_adapts_next_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_sessions.json");

    // Day 1: two 20 minute sessions, no history yet.
    let engine = TimerEngine::new(TimerConfig::new(20 * 60, 0, 2).unwrap());
    let mut day1 = Driver::with_clock(
        engine,
        SessionStore::open_at(&path),
        AdaptiveConfig::default(),
        CountingSink::default(),
        FixedClock(at(10, 9)),
    );
    assert_eq!(day1.engine().suggested_focus_secs(), None);
    run_to_idle(&mut day1);

    // Day 3: configured 30 minutes, but history says 20.
    let engine = TimerEngine::new(TimerConfig::new(30 * 60, 0, 1).unwrap());
    let mut day3 = Driver::with_clock(
        engine,
        SessionStore::open_at(&path),
        AdaptiveConfig::default(),
        CountingSink::default(),
        FixedClock(at(12, 9)),
    );
    assert_eq!(day3.engine().suggested_focus_secs(), Some(20 * 60));
    run_to_idle(&mut day3);

    let history = SessionStore::open_at(&path).try_load_all().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sessions.len(), 2);
    assert_eq!(history[0].sessions[1].session_number, 2);
    assert_eq!(history[1].sessions[0].duration_minutes, 20);

    // Outside the window nothing is suggested any more.
    let later = at(12, 9) + Duration::days(30);
    assert!(recommend_next_focus(&history, 14, later).is_none());
}

#[test]
fn test_review_survives_later_sessions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_sessions.json");
    let store = SessionStore::open_at(&path);
    let day = at(20, 9).date();

    store.set_review(day, "good day", Some(15)).unwrap();
    store.append_session(day, 25).unwrap();

    let history = store.load_all();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].daily_review, "good day");
    assert_eq!(history[0].addition_time, Some(15));
    assert_eq!(history[0].sessions[0].session_number, 1);
}

#[test]
fn test_stop_mid_run_records_nothing() {
    let engine = TimerEngine::new(TimerConfig::new(600, 60, 3).unwrap());
    let mut driver = Driver::with_clock(
        engine,
        SessionStore::in_memory(),
        AdaptiveConfig::default(),
        CountingSink::default(),
        FixedClock(at(20, 9)),
    );
    driver.handle(Command::Start);
    for _ in 0..300 {
        driver.step();
    }
    driver.handle(Command::Stop);
    assert!(driver.store().load_all().is_empty());
    assert!(driver.sink().events.contains(&Event::Stopped));
    assert_eq!(driver.sink().renders, 302);
}
