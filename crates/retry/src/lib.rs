//! Retry handling for calls against a flaky execution endpoint
//!
//! - `RetryPolicy`: bounded attempts with a fixed delay between them
//! - `RetryExecutor`: runs an operation under a policy, retrying only errors
//!   classified as transient
//! - `Sleeper`: injectable suspension so tests can run without real delays

pub mod executor;
pub mod policy;
pub mod sleeper;

pub use executor::{RetryExecutor, RetryOutcome};
pub use policy::{RetryPolicy, DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum CallError {
        Unresponsive,
        Rejected,
    }

    impl std::fmt::Display for CallError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn is_transient(e: &CallError) -> bool {
        *e == CallError::Unresponsive
    }

    #[tokio::test]
    async fn test_real_sleeper_with_short_policy() {
        let executor = RetryExecutor::new(
            RetryPolicy::new(3, Duration::from_millis(10)),
            TokioSleeper,
        );
        let calls = Arc::new(AtomicU32::new(0));

        let started = std::time::Instant::now();
        let outcome = executor
            .execute(
                || {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err(CallError::Unresponsive)
                        } else {
                            Ok("deployed")
                        }
                    }
                },
                is_transient,
            )
            .await
            .unwrap();

        assert_eq!(outcome.into_value(), Some("deployed"));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_fatal_after_transient_stops_immediately() {
        let sleeper = RecordingSleeper::new();
        let executor = RetryExecutor::new(RetryPolicy::default(), sleeper.clone());
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<RetryOutcome<(), CallError>, CallError> = executor
            .execute(
                || {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(CallError::Unresponsive)
                        } else {
                            Err(CallError::Rejected)
                        }
                    }
                },
                is_transient,
            )
            .await;

        assert_eq!(result.unwrap_err(), CallError::Rejected);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sleeper.total_slept(), Duration::from_secs(10));
    }
}
