use chrono::Local;
use clap::Subcommand;
use pomodaptive_core::{summarize, Config};

use super::CmdResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time stats
    All,
}

pub fn run(action: StatsAction) -> CmdResult {
    let store = Config::load()?.open_store()?;
    let history = store.try_load_all()?;

    let summary = match action {
        StatsAction::Today => {
            let today = Local::now().date_naive();
            let today_only: Vec<_> = history.into_iter().filter(|d| d.date == today).collect();
            summarize(&today_only)
        }
        StatsAction::All => summarize(&history),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
