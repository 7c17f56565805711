//! Fixed-interval readiness polling policy.

use std::time::Duration;

use crate::error::{PublishError, PublishResult};

/// Default spacing between publish attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Default ceiling on accumulated waiting per target.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);

/// How long to wait for a target to finish ingesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishPolicy {
    /// Sleep before the first attempt and after every not-ready response
    pub retry_interval: Duration,
    /// Attempts stop once accumulated waiting reaches this
    pub max_wait: Duration,
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl PublishPolicy {
    pub fn new(retry_interval: Duration, max_wait: Duration) -> PublishResult<Self> {
        let policy = Self {
            retry_interval,
            max_wait,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> PublishResult<()> {
        if self.retry_interval.is_zero() {
            return Err(PublishError::InvalidPolicy(
                "retry interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on publish attempts: `ceil(max_wait / retry_interval)`.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.retry_interval.as_millis().max(1);
        self.max_wait.as_millis().div_ceil(interval) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = PublishPolicy::default();
        assert_eq!(policy.retry_interval, Duration::from_secs(60));
        assert_eq!(policy.max_wait, Duration::from_secs(600));
        assert_eq!(policy.max_attempts(), 10);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = PublishPolicy::new(Duration::ZERO, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, PublishError::InvalidPolicy(_)));
    }

    #[test]
    fn test_max_attempts_rounds_up() {
        let policy = PublishPolicy::new(Duration::from_secs(7), Duration::from_secs(20)).unwrap();
        assert_eq!(policy.max_attempts(), 3);

        let none = PublishPolicy::new(Duration::from_secs(5), Duration::ZERO).unwrap();
        assert_eq!(none.max_attempts(), 0);
    }
}
