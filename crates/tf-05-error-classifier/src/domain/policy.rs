//! # Retry Policy
//!
//! Exponential backoff with a cap and proportional jitter:
//!
//! ```text
//! delay(n) = min(base * 2^n, max_delay) + uniform(0, jitter_ratio * that)
//! ```
//!
//! `n` is the number of retries already scheduled. A delay requested by the
//! server replaces the computed one. A declaration whose retryable failures
//! reach `max_retries` is given up.

use crate::domain::classify::Classification;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_JITTER_RATIO: f64 = 0.1;

/// Retry configuration. Immutable once the runtime starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on the computed delay, before jitter
    pub max_delay: Duration,
    /// Retryable failures tolerated before a declaration fails
    pub max_retries: u32,
    /// Largest jitter as a fraction of the delay
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }
}

/// What to do after a failed submission or poll.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Try again at `next_retry_at`. `attempt` is the new retry count.
    Retry {
        attempt: u32,
        delay: Duration,
        next_retry_at: DateTime<Utc>,
    },
    /// Retryable, but the budget is spent.
    Exhausted { attempts: u32 },
    /// Not retryable.
    Terminal,
}

impl RetryPolicy {
    /// Delay before jitter for the retry following `retries_so_far`.
    pub fn backoff(&self, retries_so_far: u32) -> Duration {
        let factor = 2u32.checked_pow(retries_so_far).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Backoff plus jitter drawn from `rng`.
    pub fn delay_with<R: Rng + ?Sized>(&self, retries_so_far: u32, rng: &mut R) -> Duration {
        let base = self.backoff(retries_so_far);
        let ratio = self.jitter_ratio.max(0.0);
        if ratio == 0.0 {
            return base;
        }
        let jitter = base.mul_f64(rng.gen_range(0.0..=ratio));
        base + jitter
    }

    /// Decide the next step for a failure, given how many retries the
    /// declaration already had.
    pub fn decide_with<R: Rng + ?Sized>(
        &self,
        classification: &Classification,
        retries_so_far: u32,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> RetryDecision {
        if !classification.is_retryable() {
            return RetryDecision::Terminal;
        }
        let attempt = retries_so_far.saturating_add(1);
        if attempt >= self.max_retries {
            return RetryDecision::Exhausted { attempts: attempt };
        }
        let delay = classification
            .retry_after
            .unwrap_or_else(|| self.delay_with(retries_so_far, rng));
        let next_retry_at = ChronoDuration::from_std(delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        RetryDecision::Retry {
            attempt,
            delay,
            next_retry_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::ErrorCategory;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
    }

    fn failure(category: ErrorCategory, retry_after: Option<Duration>) -> Classification {
        Classification {
            category,
            retry_after,
            context: "test".into(),
        }
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let policy = RetryPolicy::default();
        let millis: Vec<u128> = (0..9).map(|n| policy.backoff(n).as_millis()).collect();
        assert_eq!(
            millis,
            vec![5_000, 10_000, 20_000, 40_000, 80_000, 160_000, 300_000, 300_000, 300_000]
        );
        assert_eq!(policy.backoff(64), DEFAULT_MAX_DELAY);
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..8 {
            let base = policy.backoff(n);
            for _ in 0..50 {
                let d = policy.delay_with(n, &mut rng);
                assert!(d >= base);
                assert!(d <= base.mul_f64(1.1) + Duration::from_millis(1));
            }
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let policy = RetryPolicy {
            jitter_ratio: 0.0,
            ..RetryPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.delay_with(1, &mut rng), Duration::from_secs(10));
    }

    #[test]
    fn test_third_retryable_failure_exhausts() {
        let policy = RetryPolicy {
            jitter_ratio: 0.0,
            ..RetryPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let timeout = failure(ErrorCategory::Timeout, None);

        match policy.decide_with(&timeout, 0, now(), &mut rng) {
            RetryDecision::Retry {
                attempt,
                delay,
                next_retry_at,
            } => {
                assert_eq!(attempt, 1);
                assert_eq!(delay, Duration::from_secs(5));
                assert_eq!(next_retry_at, now() + ChronoDuration::seconds(5));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            policy.decide_with(&timeout, 1, now(), &mut rng),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert_eq!(
            policy.decide_with(&timeout, 2, now(), &mut rng),
            RetryDecision::Exhausted { attempts: 3 }
        );
    }

    #[test]
    fn test_server_delay_replaces_backoff() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        let limited = failure(ErrorCategory::Temporary, Some(Duration::from_secs(120)));
        match policy.decide_with(&limited, 0, now(), &mut rng) {
            RetryDecision::Retry { delay, .. } => assert_eq!(delay, Duration::from_secs(120)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_retryable_is_terminal() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        for category in [
            ErrorCategory::Authentication,
            ErrorCategory::Validation,
            ErrorCategory::Unknown,
        ] {
            assert_eq!(
                policy.decide_with(&failure(category, None), 0, now(), &mut rng),
                RetryDecision::Terminal
            );
        }
    }
}
