//! Retry policy for operations worth repeating.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Fixed-backoff retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Same attempt count, no waiting. For tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Run `op` until it succeeds or attempts run out, returning the last error.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts => {
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Attempt failed, retrying"
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = RetryPolicy::immediate(3)
            .run("flaky", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(format!("attempt {} failed", attempt))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = RetryPolicy::immediate(3)
            .run("always-fails", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {}", attempt)) }
            })
            .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let _: Result<(), &str> = RetryPolicy::immediate(0)
            .run("once", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("no") }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}
