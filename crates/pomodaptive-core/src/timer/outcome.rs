use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Result of one focus interval. Lives only in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub success: bool,
    pub consumed_secs: u64,
    pub planned_secs: u64,
}

/// Bounded window of the most recent outcomes, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeWindow {
    capacity: usize,
    outcomes: VecDeque<SessionOutcome>,
}

impl OutcomeWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, outcome: SessionOutcome) {
        if self.outcomes.len() == self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionOutcome> {
        self.outcomes.iter()
    }

    /// Share of successful outcomes, `None` while the window is empty.
    pub fn success_rate(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            return None;
        }
        let wins = self.outcomes.iter().filter(|o| o.success).count();
        Some(wins as f64 / self.outcomes.len() as f64)
    }
}

impl Default for OutcomeWindow {
    fn default() -> Self {
        Self::new(10)
    }
}
