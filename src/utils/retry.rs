use std::time::Duration;

use tokio::time::sleep;

// ============================================================================
// Bounded Retry for Idempotent Reads
// ============================================================================
//
// Datastore reads are safe to repeat, so a transient failure gets one more
// attempt after a short delay. Writes are never routed through here: a blind
// write retry risks duplicate side effects.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_millis(100),
        }
    }
}

/// Check if an error is transient (worth retrying) or permanent.
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Run an idempotent operation, retrying transient failures up to the
/// configured attempt count.
pub async fn retry_read<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempt = attempt, "read succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) if error.is_transient() && attempt < config.max_attempts => {
                tracing::warn!(
                    attempt = attempt,
                    error = %error,
                    delay_ms = config.delay.as_millis(),
                    "transient read failure, retrying after delay"
                );
                sleep(config.delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct FakeError(bool);

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake failure")
        }
    }

    impl IsTransient for FakeError {
        fn is_transient(&self) -> bool {
            self.0
        }
    }

    fn quick_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 2,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_read(&quick_config(), || {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FakeError(true))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = retry_read(&quick_config(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError(false))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_is_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = retry_read(&quick_config(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FakeError(true))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
