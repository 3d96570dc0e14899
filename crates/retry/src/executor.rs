use std::future::Future;
use tracing::{debug, warn};

use crate::{RetryPolicy, Sleeper, TokioSleeper};

/// Non-fatal result of running an operation under a retry policy
#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },

    /// Every attempt failed transiently; the last error is kept for reporting
    Exhausted { attempts: u32, last_error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryOutcome::Exhausted { .. })
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Some(value),
            RetryOutcome::Exhausted { .. } => None,
        }
    }
}

/// Runs operations under a bounded, fixed-delay retry policy
pub struct RetryExecutor<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryExecutor<TokioSleeper> {
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(policy, TokioSleeper)
    }
}

impl Default for RetryExecutor<TokioSleeper> {
    fn default() -> Self {
        Self::with_policy(RetryPolicy::default())
    }
}

impl<S: Sleeper> RetryExecutor<S> {
    pub fn new(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `operation` until it succeeds, fails fatally or the attempt
    /// bound is reached
    ///
    /// Errors for which `is_transient` returns false are returned as `Err`
    /// without further attempts. Exhaustion is reported as
    /// `Ok(RetryOutcome::Exhausted)`.
    pub async fn execute<T, E, F, Fut, C>(
        &self,
        mut operation: F,
        is_transient: C,
    ) -> Result<RetryOutcome<T, E>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(attempts, "Operation succeeded after retry");
                    }
                    return Ok(RetryOutcome::Succeeded { value, attempts });
                }
                Err(error) if is_transient(&error) => match self.policy.next_delay(attempts) {
                    Some(delay) => {
                        warn!(
                            attempt = attempts,
                            max_attempts = self.policy.max_attempts(),
                            delay_secs = delay.as_secs_f64(),
                            error = %error,
                            "Transient failure, retrying"
                        );
                        self.sleeper.sleep(delay).await;
                    }
                    None => {
                        warn!(
                            attempts,
                            error = %error,
                            "Transient failure, retries exhausted"
                        );
                        return Ok(RetryOutcome::Exhausted {
                            attempts,
                            last_error: error,
                        });
                    }
                },
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSleeper;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Timeout,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn transient(e: &TestError) -> bool {
        *e == TestError::Timeout
    }

    /// Operation that fails transiently `failures` times, then succeeds
    async fn run_with_failures(
        failures: u32,
    ) -> (Result<RetryOutcome<u32, TestError>, TestError>, u32, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        let executor = RetryExecutor::new(RetryPolicy::default(), sleeper.clone());
        let calls = Arc::new(AtomicU32::new(0));

        let result = executor
            .execute(
                || {
                    let calls = calls.clone();
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        if n < failures {
                            Err(TestError::Timeout)
                        } else {
                            Ok(n + 1)
                        }
                    }
                },
                transient,
            )
            .await;

        (result, calls.load(Ordering::SeqCst), sleeper)
    }

    #[tokio::test]
    async fn test_immediate_success_does_not_sleep() {
        let (result, calls, sleeper) = run_with_failures(0).await;
        assert_eq!(
            result.unwrap(),
            RetryOutcome::Succeeded {
                value: 1,
                attempts: 1
            }
        );
        assert_eq!(calls, 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_succeeds_while_below_bound() {
        for failures in 1..6 {
            let (result, calls, sleeper) = run_with_failures(failures).await;
            let outcome = result.unwrap();
            assert!(!outcome.is_exhausted(), "failed with {failures} failures");
            assert_eq!(outcome.attempts(), failures + 1);
            assert_eq!(calls, failures + 1);
            assert_eq!(
                sleeper.total_slept(),
                Duration::from_secs(10) * failures
            );
        }
    }

    #[tokio::test]
    async fn test_exhausts_at_six_failures() {
        let (result, calls, sleeper) = run_with_failures(6).await;
        let outcome = result.unwrap();
        assert_eq!(
            outcome,
            RetryOutcome::Exhausted {
                attempts: 6,
                last_error: TestError::Timeout
            }
        );
        assert_eq!(calls, 6);
        // no delay after the final attempt
        assert_eq!(sleeper.sleeps().len(), 5);
    }

    #[tokio::test]
    async fn test_never_exceeds_bound() {
        let (result, calls, _) = run_with_failures(100).await;
        assert!(result.unwrap().is_exhausted());
        assert_eq!(calls, 6);
    }

    #[tokio::test]
    async fn test_fatal_error_propagates_without_retry() {
        let sleeper = RecordingSleeper::new();
        let executor = RetryExecutor::new(RetryPolicy::default(), sleeper.clone());
        let calls = AtomicU32::new(0);

        let result: Result<RetryOutcome<(), TestError>, TestError> = executor
            .execute(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(TestError::Fatal) }
                },
                transient,
            )
            .await;

        assert_eq!(result.unwrap_err(), TestError::Fatal);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_custom_policy_bound() {
        let sleeper = RecordingSleeper::new();
        let executor = RetryExecutor::new(
            RetryPolicy::new(2, Duration::from_secs(1)),
            sleeper.clone(),
        );

        let result: Result<RetryOutcome<(), TestError>, TestError> = executor
            .execute(|| async { Err(TestError::Timeout) }, transient)
            .await;

        assert_eq!(result.unwrap().attempts(), 2);
        assert_eq!(sleeper.total_slept(), Duration::from_secs(1));
    }
}
