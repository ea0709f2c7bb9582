use std::future::Future;
use std::time::Duration;

use configs::RetryConfig;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::StoreError;

/// Bounded retry with exponential backoff for document writes.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_max: Duration,
    enabled: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration, backoff_max: Duration, enabled: bool) -> Self {
        Self { max_attempts, backoff_base, backoff_max, enabled }
    }

    /// One attempt, no waiting.
    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, cfg.backoff_base(), cfg.backoff_max(), cfg.enabled)
    }

    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32 << (attempt - 1).min(16);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    async fn wait_before_retry(&self, attempt: u32) {
        let delay = self.backoff(attempt);
        debug!(?delay, attempt, "retrying write");
        sleep(delay).await;
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. The last error is returned.
pub async fn retry_with_policy<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            policy.wait_before_retry(attempt).await;
        }
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(retries = attempt, "write succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) => {
                attempt += 1;
                if attempt < max_attempts && error.is_retryable() {
                    warn!(attempt, max_attempts, error = %error, "write attempt failed");
                    continue;
                }
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn io_failure() -> StoreError {
        StoreError::io(Path::new("/x/data.json"), io::Error::new(io::ErrorKind::Other, "disk busy"))
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350), true);
        assert_eq!(policy.backoff(0), Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100), true);
        let calls = Arc::new(AtomicU32::new(0));

        let result = retry_with_policy(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(io_failure())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(100), true);
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = retry_with_policy(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(io_failure())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disabled_policy_tries_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = retry_with_policy(&RetryPolicy::disabled(), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(io_failure())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn document_errors_are_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(1), true);
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = retry_with_policy(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let parse = serde_json::from_str::<u8>("nope").unwrap_err();
                Err(StoreError::from(models::errors::ModelError::Parse(parse)))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
