use std::io::{BufRead, Write};

use chrono::Local;
use clap::Subcommand;
use pomodaptive_core::{
    recommend_next_focus, Command, Config, Driver, Event, Phase, RenderSink, TimerSnapshot,
};
use tokio::sync::mpsc;

use super::CmdResult;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a timer in the foreground.
    ///
    /// While running, type `p` to pause, `s` to resume, `r` to reset the
    /// current phase and `q` to stop, each followed by Enter.
    Run {
        /// Focus length, e.g. `25m`, `1h30m`, `90s` or `90`
        #[arg(long, value_parser = parse_duration)]
        focus: Option<u64>,
        /// Break length, same format as --focus
        #[arg(long = "break", value_parser = parse_duration)]
        break_len: Option<u64>,
        /// Sessions before the run stops
        #[arg(long)]
        goal: Option<u32>,
        /// Ignore history and use the configured focus length
        #[arg(long)]
        no_adapt: bool,
    },
    /// Print the adaptive focus recommendation as JSON
    Recommend {
        /// Lookback window in days
        #[arg(long)]
        window: Option<u32>,
    },
}

/// Parse `90`, `90s`, `25m`, `1h30m` or `1h5m10s` into seconds.
pub fn parse_duration(input: &str) -> Result<u64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration is empty".into());
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit = match ch {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            other => return Err(format!("unexpected '{other}' in duration '{input}'")),
        };
        if digits.is_empty() {
            return Err(format!("missing number before '{ch}' in '{input}'"));
        }
        let value: u64 = digits.parse().map_err(|e| format!("{e}"))?;
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("duration '{input}' is too large"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        let value: u64 = digits.parse().map_err(|e| format!("{e}"))?;
        total = total
            .checked_add(value)
            .ok_or_else(|| format!("duration '{input}' is too large"))?;
    }
    Ok(total)
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" | "resume" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "r" | "reset" => Some(Command::Reset),
        "q" | "stop" | "quit" => Some(Command::Stop),
        _ => None,
    }
}

fn format_clock(secs: u64) -> String {
    let (hh, rem) = (secs / 3600, secs % 3600);
    format!("{:02}:{:02}:{:02}", hh, rem / 60, rem % 60)
}

/// One-line countdown on stderr.
struct TerminalSink;

impl RenderSink for TerminalSink {
    fn render(&mut self, snapshot: &TimerSnapshot) {
        let label = match (snapshot.phase, snapshot.running) {
            (Phase::Idle, _) => "idle  ",
            (Phase::Focus, true) => "focus ",
            (Phase::Break, true) => "break ",
            (_, false) => "paused",
        };
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\r{label} {}  {:>3.0}%  session {}/{}   ",
            format_clock(snapshot.remaining_secs),
            snapshot.percent_elapsed * 100.0,
            snapshot.sessions_completed,
            snapshot.session_goal,
        );
        let _ = err.flush();
    }

    fn notify(&mut self, event: &Event) {
        let message = match event {
            Event::FocusCompleted { .. } => "Focus complete! Time for a break.".to_string(),
            Event::BreakCompleted { .. } => "Break is over!".to_string(),
            Event::GoalReached { sessions_completed } => {
                format!("All {sessions_completed} sessions complete!")
            }
            Event::SuggestionShrunk { to_secs, .. } => {
                format!("Next focus shortened to {}", format_clock(*to_secs))
            }
            _ => return,
        };
        eprintln!("\n{message}");
    }

    fn notice(&mut self, message: &str) {
        eprintln!("\nwarning: {message}");
    }
}

fn run_timer(
    focus: Option<u64>,
    break_len: Option<u64>,
    goal: Option<u32>,
    no_adapt: bool,
) -> CmdResult {
    let mut config = Config::load()?;
    if let Some(focus) = focus {
        config.timer.focus_secs = i64::try_from(focus)?;
    }
    if let Some(break_len) = break_len {
        config.timer.break_secs = i64::try_from(break_len)?;
    }
    if let Some(goal) = goal {
        config.timer.session_goal = i64::from(goal);
    }
    if no_adapt {
        config.adaptive.enabled = false;
    }

    let engine = config.build_engine()?;
    let store = config.open_store()?;
    let mut driver = Driver::new(engine, store, config.adaptive.clone(), TerminalSink);
    if let Some(rec) = driver.recommendation() {
        eprintln!(
            "suggested focus: {} (mean {:.1} min + stddev {:.1} min over {} session(s))",
            format_clock(rec.suggested_secs),
            rec.mean_minutes,
            rec.stddev_minutes,
            rec.sample_count
        );
    }

    let (tx, rx) = mpsc::channel(16);
    tx.blocking_send(Command::Start)?;
    let input = tx.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = parse_command(&line) else {
                tracing::debug!(input = %line.trim(), "ignoring unknown command");
                continue;
            };
            if input.blocking_send(command).is_err() {
                break;
            }
        }
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(driver.run(rx, true));
    drop(tx);

    let snapshot = driver.snapshot();
    eprintln!();
    if snapshot.sessions_completed >= snapshot.session_goal {
        println!("Goal reached. Record how it went with `pomodaptive history review --text ...`.");
    } else {
        println!("Stopped.");
    }
    Ok(())
}

pub fn run(action: TimerAction) -> CmdResult {
    match action {
        TimerAction::Run {
            focus,
            break_len,
            goal,
            no_adapt,
        } => run_timer(focus, break_len, goal, no_adapt),
        TimerAction::Recommend { window } => {
            let config = Config::load()?;
            let store = config.open_store()?;
            let window = window.unwrap_or(config.adaptive.window_days);
            let recommendation =
                recommend_next_focus(&store.load_all(), window, Local::now().naive_local());
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_unit_durations() {
        assert_eq!(parse_duration("90"), Ok(90));
        assert_eq!(parse_duration("90s"), Ok(90));
        assert_eq!(parse_duration("25m"), Ok(1500));
        assert_eq!(parse_duration("1h30m"), Ok(5400));
        assert_eq!(parse_duration("1h5m10s"), Ok(3910));
        assert_eq!(parse_duration("0"), Ok(0));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("99999999999999999999h").is_err());
    }

    #[test]
    fn maps_input_lines_to_commands() {
        assert_eq!(parse_command(" P "), Some(Command::Pause));
        assert_eq!(parse_command("resume"), Some(Command::Start));
        assert_eq!(parse_command("q"), Some(Command::Stop));
        assert_eq!(parse_command("r"), Some(Command::Reset));
        assert_eq!(parse_command("hello"), None);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3725), "01:02:05");
    }
}
