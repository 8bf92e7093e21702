mod config;
pub mod history;

pub use config::{AdaptiveConfig, Config, HistoryConfig, TimerSection};
pub use history::{DayEntry, SessionEntry, SessionStore};

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "POMODAPTIVE_DATA_DIR";

/// Returns `~/.config/pomodaptive/`, or `$POMODAPTIVE_DATA_DIR` when set.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pomodaptive"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
