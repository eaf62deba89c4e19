//! Retry decorator for transports with exponential backoff and jitter.
use async_trait::async_trait;
use log::*;
use std::time::Duration;

use crate::{
    Result,
    forge::request::{ApiRequest, RawResponse, Transport},
};

/// Total attempts made for a single logical call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Computes how long to wait after a failed attempt (1-based).
pub trait Backoff: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

impl<F> Backoff for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Doubles `base` for every failed attempt and adds up to `max_jitter` of
/// random delay.
pub struct ExponentialJitter {
    pub base: Duration,
    pub max_jitter: Duration,
    pub random: fn() -> u64,
}

impl Default for ExponentialJitter {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max_jitter: Duration::from_millis(1000),
            random: os_random,
        }
    }
}

impl Backoff for ExponentialJitter {
    fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let exponential = self.base.saturating_mul(1 << exponent);

        let jitter_ceiling = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ceiling == 0 {
            0
        } else {
            (self.random)() % (jitter_ceiling + 1)
        };

        exponential.saturating_add(Duration::from_millis(jitter))
    }
}

/// Random source backed by the operating system. Jitter silently drops to
/// zero if the OS source is unavailable.
fn os_random() -> u64 {
    getrandom::u64().unwrap_or(0)
}

/// Wraps a transport and retries transient failures.
pub struct Retry<T> {
    inner: T,
    max_attempts: u32,
    backoff: Box<dyn Backoff>,
}

impl<T: Transport> Retry<T> {
    pub fn new(inner: T) -> Self {
        Self::with_backoff(
            inner,
            DEFAULT_MAX_ATTEMPTS,
            ExponentialJitter::default(),
        )
    }

    pub fn with_backoff(
        inner: T,
        max_attempts: u32,
        backoff: impl Backoff + 'static,
    ) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff: Box::new(backoff),
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for Retry<T> {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let mut attempt = 1;

        loop {
            match self.inner.send(request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        "attempt {attempt}/{} for '{} {}' failed: {err}; retrying in {:.1}s",
                        self.max_attempts,
                        request.method,
                        request.url,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
