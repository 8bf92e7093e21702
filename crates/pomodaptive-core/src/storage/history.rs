//! JSON-backed per-day session history.
//!
//! The file is a single array of day entries:
//!
//! ```text
//! [ { "date": "2025-05-20",
//!     "sessions": [ { "session_number": 1, "duration_minutes": 25 } ],
//!     "daily_review": "",
//!     "addition_time": null } ]
//! ```
//!
//! Dates are unique. Sessions are append-only; review fields are last
//! write wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

use super::data_dir;
use crate::error::StorageError;

pub const HISTORY_FILE: &str = "user_sessions.json";
pub const DEFAULT_MIN_DURATION_MINUTES: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session_number: u32,
    pub duration_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
    #[serde(default)]
    pub daily_review: String,
    /// Extra focus minutes the user thinks they could still do that day.
    #[serde(default)]
    pub addition_time: Option<u64>,
}

impl DayEntry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sessions: Vec::new(),
            daily_review: String::new(),
            addition_time: None,
        }
    }

    pub fn total_minutes(&self) -> u64 {
        self.sessions.iter().map(|s| s.duration_minutes).sum()
    }
}

/// Session record store.
///
/// Every mutation re-reads the backing file, applies the change and writes
/// it back while holding the lock, so two writers in one process cannot
/// lose each other's sessions.
pub struct SessionStore {
    /// `None` keeps everything in memory.
    path: Option<PathBuf>,
    entries: Mutex<Vec<DayEntry>>,
    min_duration_minutes: u64,
}

impl SessionStore {
    /// Open the store at `<data_dir>/user_sessions.json`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> std::io::Result<Self> {
        Ok(Self::open_at(data_dir()?.join(HISTORY_FILE)))
    }

    /// Use `path` as the backing file. The file is created on first write.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Mutex::new(Vec::new()),
            min_duration_minutes: DEFAULT_MIN_DURATION_MINUTES,
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Vec::new()),
            min_duration_minutes: DEFAULT_MIN_DURATION_MINUTES,
        }
    }

    /// Sessions shorter than this are dropped by `append_session`.
    pub fn with_min_duration(mut self, minutes: u64) -> Self {
        self.min_duration_minutes = minutes;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a finished session to `date`, numbering it after the day's
    /// existing sessions. Returns `Ok(None)` when the duration is below the
    /// minimum and nothing was written.
    ///
    /// # Errors
    /// Fails if the backing file is unreadable, corrupt or unwritable.
    pub fn append_session(
        &self,
        date: NaiveDate,
        duration_minutes: u64,
    ) -> Result<Option<SessionEntry>, StorageError> {
        if duration_minutes < self.min_duration_minutes {
            return Ok(None);
        }
        let entry = self.modify(|entries| {
            let day = day_mut(entries, date);
            let entry = SessionEntry {
                session_number: day.sessions.len() as u32 + 1,
                duration_minutes,
            };
            day.sessions.push(entry.clone());
            entry
        })?;
        info!(%date, session = entry.session_number, duration_minutes, "session recorded");
        Ok(Some(entry))
    }

    /// Set the review fields for `date`, leaving its sessions untouched.
    ///
    /// # Errors
    /// Fails if the backing file is unreadable, corrupt or unwritable.
    pub fn set_review(
        &self,
        date: NaiveDate,
        review: &str,
        additional_minutes: Option<u64>,
    ) -> Result<(), StorageError> {
        self.modify(|entries| {
            let day = day_mut(entries, date);
            day.daily_review = review.to_string();
            day.addition_time = additional_minutes;
        })
    }

    /// All entries in file order. Never fails: an unreadable or corrupt
    /// history is logged and treated as empty.
    pub fn load_all(&self) -> Vec<DayEntry> {
        match self.try_load_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "session history unavailable, using empty history");
                Vec::new()
            }
        }
    }

    /// All entries in file order.
    ///
    /// # Errors
    /// Surfaces read and decode failures.
    pub fn try_load_all(&self) -> Result<Vec<DayEntry>, StorageError> {
        let mut guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if let Some(path) = &self.path {
            *guard = read_entries(path)?;
        }
        Ok(guard.clone())
    }

    fn modify<T>(&self, apply: impl FnOnce(&mut Vec<DayEntry>) -> T) -> Result<T, StorageError> {
        let mut guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = match &self.path {
            Some(path) => read_entries(path)?,
            None => guard.clone(),
        };
        let out = apply(&mut entries);
        if let Some(path) = &self.path {
            write_entries(path, &entries)?;
        }
        *guard = entries;
        Ok(out)
    }
}

fn day_mut(entries: &mut Vec<DayEntry>, date: NaiveDate) -> &mut DayEntry {
    let idx = match entries.iter().position(|d| d.date == date) {
        Some(idx) => idx,
        None => {
            entries.push(DayEntry::new(date));
            entries.len() - 1
        }
    };
    &mut entries[idx]
}

fn read_entries(path: &Path) -> Result<Vec<DayEntry>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_entries(path: &Path, entries: &[DayEntry]) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(entries).map_err(|e| write_err(e.into()))?;
    std::fs::write(path, json).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn append_numbers_sessions_per_day() {
        let store = SessionStore::in_memory();
        let first = store.append_session(date("2025-05-20"), 25).unwrap().unwrap();
        let second = store.append_session(date("2025-05-20"), 30).unwrap().unwrap();
        let other = store.append_session(date("2025-05-21"), 10).unwrap().unwrap();
        assert_eq!(first.session_number, 1);
        assert_eq!(second.session_number, 2);
        assert_eq!(other.session_number, 1);

        let all = store.load_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sessions.len(), 2);
        assert_eq!(all[0].sessions[0].duration_minutes, 25);
        assert_eq!(all[0].total_minutes(), 55);
    }

    #[test]
    fn short_sessions_are_dropped() {
        let store = SessionStore::in_memory();
        assert_eq!(store.append_session(date("2025-05-20"), 0).unwrap(), None);
        assert!(store.load_all().is_empty());

        let strict = SessionStore::in_memory().with_min_duration(5);
        assert_eq!(strict.append_session(date("2025-05-20"), 4).unwrap(), None);
        assert!(strict.append_session(date("2025-05-20"), 5).unwrap().is_some());
    }

    #[test]
    fn review_keeps_sessions() {
        let store = SessionStore::in_memory();
        store.append_session(date("2025-05-20"), 25).unwrap();
        store.set_review(date("2025-05-20"), "good day", Some(15)).unwrap();
        store.set_review(date("2025-05-22"), "", None).unwrap();

        let all = store.load_all();
        let day = all.iter().find(|d| d.date == date("2025-05-20")).unwrap();
        assert_eq!(day.daily_review, "good day");
        assert_eq!(day.addition_time, Some(15));
        assert_eq!(day.sessions.len(), 1);
        assert!(all.iter().any(|d| d.date == date("2025-05-22") && d.sessions.is_empty()));
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(HISTORY_FILE);
        let store = SessionStore::open_at(&path);
        assert!(store.load_all().is_empty());

        store.append_session(date("2025-05-20"), 25).unwrap();
        store.set_review(date("2025-05-20"), "good day", Some(15)).unwrap();

        let reopened = SessionStore::open_at(&path);
        let all = reopened.try_load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sessions[0].session_number, 1);
        assert_eq!(all[0].daily_review, "good day");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["date"], "2025-05-20");
        assert_eq!(raw[0]["addition_time"], 15);
    }

    #[test]
    fn missing_optional_fields_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        std::fs::write(&path, r#"[{"date":"2025-05-20","sessions":[]}]"#).unwrap();
        let all = SessionStore::open_at(&path).load_all();
        assert_eq!(all[0].daily_review, "");
        assert_eq!(all[0].addition_time, None);
    }

    #[test]
    fn corrupt_file_fails_closed_and_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        std::fs::write(&path, "{not json").unwrap();
        let store = SessionStore::open_at(&path);

        assert!(store.load_all().is_empty());
        assert!(matches!(store.try_load_all(), Err(StorageError::Corrupt { .. })));
        assert!(store.append_session(date("2025-05-20"), 25).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
