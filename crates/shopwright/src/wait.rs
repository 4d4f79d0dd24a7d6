//! Bounded cooperative waiting.
//!
//! Every auto-wait in Shopwright (locator resolution before an interaction,
//! `expect` assertions) is a poll loop with a fixed budget. Between probes the
//! task sleeps on the tokio timer, so concurrent sessions never block each
//! other.

use crate::result::E2eResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: crate::locator::DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The condition holds
    Done(T),
    /// Not yet; carries a description of what was observed
    NotYet(String),
}

/// Outcome of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The condition held before the budget ran out
    Ready {
        /// Value produced by the final probe
        value: T,
        /// Time spent waiting
        elapsed: Duration,
    },
    /// The budget ran out
    TimedOut {
        /// What the last probe observed
        last_observed: String,
        /// Time spent waiting
        elapsed: Duration,
    },
}

impl<T> WaitOutcome<T> {
    /// Whether the condition held
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Time spent waiting
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Ready { elapsed, .. } | Self::TimedOut { elapsed, .. } => *elapsed,
        }
    }
}

/// Probe repeatedly until it reports [`Probe::Done`] or the budget runs out.
///
/// The probe runs at least once, even with a zero budget. Errors from the
/// probe abort the wait immediately.
pub async fn poll_until<T, F, Fut>(options: WaitOptions, mut probe: F) -> E2eResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Probe<T>>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    loop {
        let last_observed = match probe().await? {
            Probe::Done(value) => {
                return Ok(WaitOutcome::Ready {
                    value,
                    elapsed: start.elapsed(),
                })
            }
            Probe::NotYet(observed) => observed,
        };

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitOutcome::TimedOut {
                last_observed,
                elapsed,
            });
        }
        let remaining = timeout.saturating_sub(elapsed);
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::E2eError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::new();
            assert_eq!(options.timeout_ms, 5000);
            assert_eq!(options.poll_interval(), Duration::from_millis(50));
        }

        #[test]
        fn test_builder() {
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(5);
            assert_eq!(options.timeout(), Duration::from_millis(100));
            assert_eq!(options.poll_interval_ms, 5);
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_ready_after_a_few_probes() {
            let calls = AtomicUsize::new(0);
            let calls_ref = &calls;
            let outcome = poll_until(WaitOptions::new().with_poll_interval(1), move || async move {
                let n = calls_ref.fetch_add(1, Ordering::SeqCst);
                Ok::<_, E2eError>(if n >= 2 {
                    Probe::Done(n)
                } else {
                    Probe::NotYet(format!("call {n}"))
                })
            })
            .await
            .unwrap();
            assert!(outcome.is_ready());
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_times_out_with_last_observation() {
            let outcome: WaitOutcome<()> = poll_until(
                WaitOptions::new().with_timeout(20).with_poll_interval(5),
                || async { Ok::<_, E2eError>(Probe::NotYet("still hidden".to_string())) },
            )
            .await
            .unwrap();
            match outcome {
                WaitOutcome::TimedOut {
                    last_observed,
                    elapsed,
                } => {
                    assert_eq!(last_observed, "still hidden");
                    assert!(elapsed >= Duration::from_millis(20));
                }
                WaitOutcome::Ready { .. } => panic!("expected timeout"),
            }
        }

        #[tokio::test]
        async fn test_zero_budget_probes_once() {
            let calls = AtomicUsize::new(0);
            let calls_ref = &calls;
            let outcome: WaitOutcome<()> =
                poll_until(WaitOptions::new().with_timeout(0), move || async move {
                    calls_ref.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, E2eError>(Probe::NotYet(String::new()))
                })
                .await
                .unwrap();
            assert!(!outcome.is_ready());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_probe_error_aborts() {
            let result: E2eResult<WaitOutcome<()>> =
                poll_until(WaitOptions::new(), || async { Err::<Probe<()>, _>(E2eError::driver("closed")) }).await;
            assert!(matches!(result, Err(E2eError::DriverFault { .. })));
        }
    }
}
