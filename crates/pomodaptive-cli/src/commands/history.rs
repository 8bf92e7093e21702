use chrono::{Local, NaiveDate};
use clap::Subcommand;
use pomodaptive_core::{summarize, Config};

use super::CmdResult;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded days, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a finished session by hand
    Add {
        /// Session length in minutes
        minutes: u64,
        /// Day to record on (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Write the daily review
    Review {
        /// Review text
        #[arg(long)]
        text: String,
        /// Extra minutes you could still focus today
        #[arg(long)]
        extra: Option<u64>,
        /// Day to review (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: HistoryAction) -> CmdResult {
    let store = Config::load()?.open_store()?;
    let today = Local::now().date_naive();

    match action {
        HistoryAction::List { json } => {
            let summary = summarize(&store.try_load_all()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary.entries)?);
                return Ok(());
            }
            if summary.entries.is_empty() {
                println!("no sessions recorded yet");
            }
            for day in &summary.entries {
                println!(
                    "{}  {} session(s), {} min",
                    day.date, day.sessions, day.total_minutes
                );
                if let Some(review) = &day.review {
                    println!("    review: {review}");
                }
                if let Some(extra) = day.additional_minutes {
                    println!("    extra focus available: {extra} min");
                }
            }
        }
        HistoryAction::Add { minutes, date } => {
            match store.append_session(date.unwrap_or(today), minutes)? {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => println!("skipped: {minutes} min is below the minimum session length"),
            }
        }
        HistoryAction::Review { text, extra, date } => {
            let date = date.unwrap_or(today);
            store.set_review(date, &text, extra)?;
            println!("review saved for {date}");
        }
    }
    Ok(())
}
