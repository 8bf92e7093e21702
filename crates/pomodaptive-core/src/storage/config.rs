//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus/break lengths and the session goal
//! - Adaptive recommendation settings (window, success ratio)
//! - Pause policy (partial sessions, fatigue shrink)
//! - Session history location and minimum recorded duration
//!
//! Configuration is stored at `~/.config/pomodaptive/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use super::history::{SessionStore, DEFAULT_MIN_DURATION_MINUTES, HISTORY_FILE};
use crate::error::{ConfigError, CoreError};
use crate::stats::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::timer::{
    PausePolicy, SuccessRule, TimerConfig, TimerEngine, DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS,
    DEFAULT_SESSION_GOAL,
};

/// Raw timer values. Signed so that a negative value in the file is
/// reported instead of failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSection {
    #[serde(default = "default_focus_secs")]
    pub focus_secs: i64,
    #[serde(default = "default_break_secs")]
    pub break_secs: i64,
    #[serde(default = "default_session_goal")]
    pub session_goal: i64,
}

/// Adaptive recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_success_ratio")]
    pub success_ratio: f64,
    #[serde(default = "default_outcome_window")]
    pub outcome_window: usize,
}

/// Session history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Empty means `<data_dir>/user_sessions.json`.
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_min_duration")]
    pub min_duration_minutes: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomodaptive/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerSection,
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    #[serde(default)]
    pub pause: PausePolicy,
    #[serde(default)]
    pub history: HistoryConfig,
}

// Default functions
fn default_focus_secs() -> i64 {
    DEFAULT_FOCUS_SECS as i64
}
fn default_break_secs() -> i64 {
    DEFAULT_BREAK_SECS as i64
}
fn default_session_goal() -> i64 {
    DEFAULT_SESSION_GOAL as i64
}
fn default_true() -> bool {
    true
}
fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}
fn default_success_ratio() -> f64 {
    SuccessRule::default().ratio
}
fn default_outcome_window() -> usize {
    10
}
fn default_min_duration() -> u64 {
    DEFAULT_MIN_DURATION_MINUTES
}

impl Default for TimerSection {
    fn default() -> Self {
        Self {
            focus_secs: default_focus_secs(),
            break_secs: default_break_secs(),
            session_goal: default_session_goal(),
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_days: default_window_days(),
            success_ratio: default_success_ratio(),
            outcome_window: default_outcome_window(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            min_duration_minutes: default_min_duration(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| ConfigError::ParseFailed(format!("'{value}' is not a bool")))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        value
                            .parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| {
                                ConfigError::ParseFailed(format!("cannot parse '{value}' as number"))
                            })?
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(ConfigError::invalid(key, "is a section, not a value"));
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)
            .map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save.
    ///
    /// # Errors
    ///
    /// Same as [`Config::apply`], plus save failures.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check every value the timer depends on.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timer_config()?;
        let ratios = [
            ("adaptive.success_ratio", self.adaptive.success_ratio),
            ("pause.fatigue.threshold_ratio", self.pause.fatigue.threshold_ratio),
            ("pause.fatigue.shrink_ratio", self.pause.fatigue.shrink_ratio),
        ];
        for (key, ratio) in ratios {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::invalid(key, format!("{ratio} is not within 0..=1")));
            }
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.adaptive.window_days) {
            return Err(ConfigError::invalid(
                "adaptive.window_days",
                format!("must be between 1 and {MAX_WINDOW_DAYS}"),
            ));
        }
        Ok(())
    }

    /// Validated timer settings.
    ///
    /// # Errors
    /// Rejects negative durations and a goal below one.
    pub fn timer_config(&self) -> Result<TimerConfig, ConfigError> {
        TimerConfig::try_from_signed(
            self.timer.focus_secs,
            self.timer.break_secs,
            self.timer.session_goal,
        )
    }

    /// Idle engine wired with this config's policies.
    ///
    /// # Errors
    /// Fails if the config does not validate.
    pub fn build_engine(&self) -> Result<TimerEngine, ConfigError> {
        self.validate()?;
        Ok(TimerEngine::new(self.timer_config()?)
            .with_pause_policy(self.pause)
            .with_success_rule(SuccessRule {
                ratio: self.adaptive.success_ratio,
            })
            .with_outcome_window(self.adaptive.outcome_window))
    }

    /// Location of the session history file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn history_path(&self) -> std::io::Result<PathBuf> {
        if self.history.path.is_empty() {
            Ok(data_dir()?.join(HISTORY_FILE))
        } else {
            Ok(PathBuf::from(&self.history.path))
        }
    }

    /// Open the configured session store.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_store(&self) -> std::io::Result<SessionStore> {
        Ok(SessionStore::open_at(self.history_path()?)
            .with_min_duration(self.history.min_duration_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.focus_secs, 1500);
        assert_eq!(parsed.adaptive.window_days, 14);
        assert!(!parsed.pause.record_partial);
        assert!(!parsed.pause.fatigue.enabled);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[timer]\nfocus_secs = 600\n").unwrap();
        assert_eq!(parsed.timer.focus_secs, 600);
        assert_eq!(parsed.timer.break_secs, 300);
        assert_eq!(parsed.history.min_duration_minutes, 1);
        assert!(parsed.adaptive.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.session_goal").as_deref(), Some("3"));
        assert_eq!(cfg.get("pause.fatigue.enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("history.path").as_deref(), Some(""));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("timer.focus_secs", "900").unwrap();
        cfg.apply("pause.fatigue.enabled", "true").unwrap();
        cfg.apply("adaptive.success_ratio", "0.75").unwrap();
        cfg.apply("history.path", "/tmp/sessions.json").unwrap();
        assert_eq!(cfg.timer.focus_secs, 900);
        assert!(cfg.pause.fatigue.enabled);
        assert_eq!(cfg.adaptive.success_ratio, 0.75);
        assert_eq!(cfg.history.path, "/tmp/sessions.json");
    }

    #[test]
    fn apply_rejects_negative_duration() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.focus_secs", "-5").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.timer.focus_secs, 1500);
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.apply("adaptive.enabled", "maybe").is_err());
        assert!(cfg.apply("timer", "1").is_err());
        assert!(cfg.apply("adaptive.success_ratio", "1.5").is_err());
    }

    #[test]
    fn window_days_must_stay_in_range() {
        let mut cfg = Config::default();
        assert!(cfg.apply("adaptive.window_days", "0").is_err());
        assert!(cfg.apply("adaptive.window_days", "4000000000").is_err());
        assert_eq!(cfg.adaptive.window_days, 14);
        cfg.apply("adaptive.window_days", "36500").unwrap();
        assert_eq!(cfg.adaptive.window_days, MAX_WINDOW_DAYS);
    }

    #[test]
    fn zero_goal_fails_validation() {
        let mut cfg = Config::default();
        cfg.timer.session_goal = 0;
        assert!(cfg.validate().is_err());
        assert!(cfg.build_engine().is_err());
    }

    #[test]
    fn build_engine_applies_timer_values() {
        let mut cfg = Config::default();
        cfg.timer.focus_secs = 60;
        cfg.timer.session_goal = 2;
        let engine = cfg.build_engine().unwrap();
        assert_eq!(engine.config().focus_secs(), 60);
        assert_eq!(engine.config().session_goal(), 2);
        assert!(engine.is_idle());
    }

    #[test]
    fn explicit_history_path_is_used() {
        let mut cfg = Config::default();
        cfg.history.path = "/tmp/elsewhere.json".into();
        assert_eq!(cfg.history_path().unwrap(), PathBuf::from("/tmp/elsewhere.json"));
    }
}
