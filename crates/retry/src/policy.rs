use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Bounded-attempt, fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one attempt
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Delay before the next attempt, or `None` once `attempts_made` has
    /// reached the bound
    pub fn next_delay(&self, attempts_made: u32) -> Option<Duration> {
        if attempts_made >= self.max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }

    /// Upper bound on time spent sleeping under this policy
    pub fn max_total_delay(&self) -> Duration {
        self.delay * (self.max_attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.delay(), Duration::from_secs(10));
        assert_eq!(policy.max_total_delay(), Duration::from_secs(50));
    }

    #[test]
    fn test_delay_is_fixed() {
        let policy = RetryPolicy::new(4, Duration::from_millis(250));
        for attempt in 1..4 {
            assert_eq!(policy.next_delay(attempt), Some(Duration::from_millis(250)));
        }
        assert_eq!(policy.next_delay(4), None);
        assert_eq!(policy.next_delay(5), None);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.next_delay(1), None);
        assert_eq!(policy.max_total_delay(), Duration::ZERO);
    }

    #[test]
    fn test_with_delay() {
        let policy = RetryPolicy::default().with_delay(Duration::ZERO);
        assert_eq!(policy.delay(), Duration::ZERO);
        assert_eq!(policy.max_attempts(), 6);
    }
}
