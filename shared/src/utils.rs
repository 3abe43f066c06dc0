use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::*;

/// fixed backoff between attempts; `max_attempts: None` retries until success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn forever(backoff: Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    pub fn limited(backoff: Duration, max_attempts: u32) -> Self {
        Self {
            backoff,
            max_attempts: Some(max_attempts),
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// run `retry_fn` until it succeeds or the policy gives up, returning the last error
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, retry_fn: F) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    F: Fn() -> Fut,
    E: Display, {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match retry_fn().await {
            Ok(value) => return Ok(value),
            Err(err) if policy.exhausted(attempts) => {
                error!("{label} failed after {attempts} attempts: {err}");
                return Err(err);
            }
            Err(err) => {
                warn!("{label} failed: {err}, retry in {:?}...({attempts})", policy.backoff);
                sleep(policy.backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn waits_backoff_between_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();

        let res: Result<u32, String> = retry(
            &RetryPolicy::forever(Duration::from_secs(10)),
            "fetch",
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(format!("attempt {n} refused"))
                } else {
                    Ok(n)
                }
            },
        )
        .await;

        assert_eq!(res, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn limited_policy_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let res: Result<(), String> =
            retry(&RetryPolicy::limited(Duration::from_secs(1), 3), "fetch", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(format!("boom {n}"))
            })
            .await;

        assert_eq!(res, Err("boom 2".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
