use std::time::Duration;

/// Attempt budget and backoff schedule for webhook delivery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Length of one backoff "second". Tests shrink this to zero.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after a failed attempt, given the attempts still remaining.
    ///
    /// `(6 - remaining)^2 + 6` units, and nothing once the budget is spent.
    pub fn backoff(&self, remaining: u32) -> Option<Duration> {
        if remaining == 0 {
            return None;
        }
        let used = 6u32.saturating_sub(remaining);
        Some(self.backoff_unit * (used * used + 6))
    }

    pub fn immediate() -> Self {
        Self {
            backoff_unit: Duration::ZERO,
            ..Self::default()
        }
    }
}
