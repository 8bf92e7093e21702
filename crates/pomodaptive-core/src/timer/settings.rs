//! Validated timer settings.
//!
//! [`TimerConfig`] is what the state machine runs on. It can only be built
//! through [`TimerConfig::new`] or [`TimerConfig::try_from_signed`], so a
//! negative duration or a zero goal never reaches the engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default focus interval (25 minutes).
pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
/// Default break interval (5 minutes).
pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;
/// Default number of sessions per run.
pub const DEFAULT_SESSION_GOAL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    focus_secs: u64,
    break_secs: u64,
    session_goal: u32,
}

impl TimerConfig {
    /// Build a config from unsigned input.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if `session_goal` is zero.
    pub fn new(focus_secs: u64, break_secs: u64, session_goal: u32) -> Result<Self, ConfigError> {
        if session_goal == 0 {
            return Err(ConfigError::invalid("session_goal", "must be at least 1"));
        }
        Ok(Self {
            focus_secs,
            break_secs,
            session_goal,
        })
    }

    /// Build a config from raw user input, which may be negative.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn try_from_signed(
        focus_secs: i64,
        break_secs: i64,
        session_goal: i64,
    ) -> Result<Self, ConfigError> {
        let focus = u64::try_from(focus_secs)
            .map_err(|_| ConfigError::invalid("focus_secs", format!("{focus_secs} is negative")))?;
        let brk = u64::try_from(break_secs)
            .map_err(|_| ConfigError::invalid("break_secs", format!("{break_secs} is negative")))?;
        let goal = u32::try_from(session_goal).map_err(|_| {
            ConfigError::invalid("session_goal", format!("{session_goal} is out of range"))
        })?;
        Self::new(focus, brk, goal)
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }

    pub fn session_goal(&self) -> u32 {
        self.session_goal
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            break_secs: DEFAULT_BREAK_SECS,
            session_goal: DEFAULT_SESSION_GOAL,
        }
    }
}

/// Shrinks the next focus interval when a focus phase is paused early.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatiguePolicy {
    #[serde(default)]
    pub enabled: bool,
    /// Pausing before this share of the focus interval counts as fatigue.
    #[serde(default = "default_threshold_ratio")]
    pub threshold_ratio: f64,
    /// Next focus interval = current total * shrink_ratio.
    #[serde(default = "default_shrink_ratio")]
    pub shrink_ratio: f64,
    /// Floor for a shrunk interval.
    #[serde(default = "default_min_focus_secs")]
    pub min_focus_secs: u64,
}

fn default_threshold_ratio() -> f64 {
    0.5
}
fn default_shrink_ratio() -> f64 {
    0.8
}
fn default_min_focus_secs() -> u64 {
    5 * 60
}

impl Default for FatiguePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_ratio: default_threshold_ratio(),
            shrink_ratio: default_shrink_ratio(),
            min_focus_secs: default_min_focus_secs(),
        }
    }
}

impl FatiguePolicy {
    /// Next focus length if pausing after `consumed` of `total` seconds is
    /// a fatigue signal, `None` otherwise.
    pub fn shrunk_focus(&self, consumed: u64, total: u64) -> Option<u64> {
        if !self.enabled || total == 0 {
            return None;
        }
        if (consumed as f64) >= total as f64 * self.threshold_ratio {
            return None;
        }
        let shrunk = (total as f64 * self.shrink_ratio).floor() as u64;
        Some(shrunk.max(self.min_focus_secs).min(total))
    }
}

/// What `pause()` does besides stopping the clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PausePolicy {
    /// Emit the consumed part of a paused focus interval as a partial session.
    #[serde(default)]
    pub record_partial: bool,
    #[serde(default)]
    pub fatigue: FatiguePolicy,
}

/// Rule deciding whether a focus interval counts as a success.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessRule {
    /// Share of the planned focus interval that must have been consumed.
    pub ratio: f64,
}

impl Default for SuccessRule {
    fn default() -> Self {
        Self { ratio: 0.9 }
    }
}

impl SuccessRule {
    pub fn is_success(&self, consumed_secs: u64, planned_secs: u64) -> bool {
        let required = (planned_secs as f64 * self.ratio.clamp(0.0, 1.0)).ceil() as u64;
        consumed_secs >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_goal_is_rejected() {
        let err = TimerConfig::new(60, 30, 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "session_goal"));
    }

    #[test]
    fn negative_input_is_rejected() {
        assert!(TimerConfig::try_from_signed(-1, 30, 1).is_err());
        assert!(TimerConfig::try_from_signed(60, -30, 1).is_err());
        assert!(TimerConfig::try_from_signed(60, 30, -2).is_err());
        let cfg = TimerConfig::try_from_signed(0, 0, 1).unwrap();
        assert_eq!(cfg.focus_secs(), 0);
    }

    #[test]
    fn fatigue_disabled_never_shrinks() {
        let policy = FatiguePolicy::default();
        assert_eq!(policy.shrunk_focus(10, 1500), None);
    }

    #[test]
    fn fatigue_shrinks_below_threshold() {
        let policy = FatiguePolicy {
            enabled: true,
            ..FatiguePolicy::default()
        };
        assert_eq!(policy.shrunk_focus(600, 1500), Some(1200));
        assert_eq!(policy.shrunk_focus(750, 1500), None);
    }

    #[test]
    fn fatigue_respects_floor_and_total() {
        let policy = FatiguePolicy {
            enabled: true,
            min_focus_secs: 300,
            ..FatiguePolicy::default()
        };
        assert_eq!(policy.shrunk_focus(10, 200), Some(200));
        assert_eq!(policy.shrunk_focus(10, 360), Some(300));
    }

    #[test]
    fn success_rule_thresholds() {
        let rule = SuccessRule::default();
        assert!(rule.is_success(1500, 1500));
        assert!(rule.is_success(1350, 1500));
        assert!(!rule.is_success(1349, 1500));
        assert!(rule.is_success(0, 0));
    }
}
