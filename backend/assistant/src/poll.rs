//! Poll schedule for assistant runs: a fixed interval with optional backoff
//! and a hard attempt bound, so a run that never reaches a terminal status
//! cannot stall the workflow forever.

use std::time::Duration;

/// Polling policy for run-status checks.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the first re-check.
    pub interval: Duration,
    /// Multiplier for each subsequent wait. 1.0 keeps the interval fixed.
    pub backoff_factor: f64,
    /// Cap on any single wait.
    pub max_interval: Duration,
    /// Maximum number of non-terminal status checks before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            backoff_factor: 1.0,
            max_interval: Duration::from_secs(10),
            max_attempts: 120,
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy with the given cadence and bound.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            ..Default::default()
        }
    }

    /// Compute the delay before poll attempt `attempt_number` (1-indexed).
    pub fn delay_for(&self, attempt_number: u32) -> Duration {
        if attempt_number == 0 {
            return Duration::ZERO;
        }
        let ms = self.interval.as_millis() as f64
            * self.backoff_factor.powi((attempt_number - 1) as i32);
        let capped = ms.min(self.max_interval.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Whether the attempt bound has been reached.
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_interval_stays_constant() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(50), Duration::from_secs(1));
    }

    #[test]
    fn backoff_grows_until_cap() {
        let policy = PollPolicy {
            backoff_factor: 2.0,
            ..Default::default()
        };
        let d1 = policy.delay_for(1);
        let d2 = policy.delay_for(2);
        let d3 = policy.delay_for(3);
        assert!(d2 > d1);
        assert!(d3 > d2);
        assert!(policy.delay_for(20) <= policy.max_interval);
    }

    #[test]
    fn exhaustion_at_bound() {
        let policy = PollPolicy::fixed(Duration::from_millis(10), 3);
        assert!(!policy.exhausted(2));
        assert!(policy.exhausted(3));
    }
}
