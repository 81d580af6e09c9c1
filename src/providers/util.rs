use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Waits between retry attempts.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Bounded retry configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Retries an async operation with a fixed delay between attempts
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `policy`: Attempt budget and delay between attempts
/// - `delay`: Waits `policy.delay` between attempts, never after the last one
/// - `on_failure`: Called with `(attempt, total, error)` for every failed attempt
///
/// # Returns
/// Either the first successful result or the error of the final attempt
pub async fn with_retry<F, Fut, T, E, L>(
    mut operation: F,
    policy: &RetryPolicy,
    delay: &dyn Delay,
    mut on_failure: L,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    L: FnMut(u32, u32, &E),
{
    let total = policy.attempts();
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                on_failure(attempt, total, &err);
                if attempt >= total {
                    return Err(err);
                }
                debug!("Attempt {}/{} failed. Retrying...", attempt, total);
                attempt += 1;
                delay.wait(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct RecordingDelay {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_after_failures() {
        let calls = &AtomicU32::new(0);
        let delay = RecordingDelay::default();
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let mut failures = Vec::new();

        let result: Result<&str, String> = with_retry(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err(format!("boom {n}")) } else { Ok("ok") }
            },
            &policy,
            &delay,
            |attempt, total, err: &String| failures.push((attempt, total, err.clone())),
        )
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            failures,
            vec![(1, 3, "boom 1".to_string()), (2, 3, "boom 2".to_string())]
        );
        assert_eq!(
            *delay.waits.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_without_trailing_delay() {
        let calls = &AtomicU32::new(0);
        let delay = RecordingDelay::default();
        let policy = RetryPolicy::new(3, Duration::from_millis(10));

        let result: Result<(), &str> = with_retry(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down")
            },
            &policy,
            &delay,
            |_, _, _| {},
        )
        .await;

        assert_eq!(result.unwrap_err(), "down");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(delay.waits.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_with_retry_zero_attempts_runs_once() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(0, Duration::ZERO);

        let result: Result<(), &str> = with_retry(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down")
            },
            &policy,
            &NoDelay,
            |_, _, _| {},
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
