use std::future::Future;
use std::time::Duration;

/// What a single poll observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check<T> {
    Done(T),
    Pending,
}

/// Fixed-interval poller: sleep, check, repeat. No backoff.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
    max_attempts: Option<u32>,
}

impl Poller {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Give up after this many checks. Unlimited by default.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Run `check` (with a 1-based attempt number) after each sleep until it
    /// reports `Done`. Errors end the loop immediately. Returns `Ok(None)`
    /// when the attempt limit is reached first.
    pub async fn until<T, E, F, Fut>(&self, mut check: F) -> Result<Option<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Check<T>, E>>,
    {
        let mut attempt = 0u32;
        loop {
            if self.max_attempts.is_some_and(|max| attempt >= max) {
                return Ok(None);
            }
            tokio::time::sleep(self.interval).await;
            attempt += 1;
            if let Check::Done(value) = check(attempt).await? {
                return Ok(Some(value));
            }
        }
    }
}
