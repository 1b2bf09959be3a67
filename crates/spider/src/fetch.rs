//! Remote fetching with exponential-backoff retry.

use std::{fmt::Display, sync::Arc, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Result, SpiderError},
    traits::{Fetcher, Sleeper},
};

/// How often and how patiently a failed fetch is retried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included
    #[schemars(range(min = 1))]
    pub max_attempts: u32,
    /// Wait before the first retry, in seconds
    pub initial_delay_secs: f64,
    /// Factor applied to the wait after every retry
    #[schemars(range(min = 1.0))]
    pub backoff: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff: f64) -> Self {
        Self {
            max_attempts,
            initial_delay_secs: initial_delay.as_secs_f64(),
            backoff,
        }
    }

    /// Wait before the first retry; out-of-range values saturate
    pub fn initial_delay(&self) -> Duration {
        if self.initial_delay_secs.is_nan() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.initial_delay_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Wait that follows `delay`
    fn next_delay(&self, delay: Duration) -> Duration {
        let secs = delay.as_secs_f64() * self.backoff;
        if secs.is_nan() {
            return delay;
        }
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SpiderError::Configuration(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.backoff >= 1.0) {
            return Err(SpiderError::Configuration(format!(
                "retry.backoff must be >= 1, got {}",
                self.backoff
            )));
        }
        if !self.backoff.is_finite() {
            return Err(SpiderError::Configuration(format!(
                "retry.backoff must be finite, got {}",
                self.backoff
            )));
        }
        if Duration::try_from_secs_f64(self.initial_delay_secs).is_err() {
            return Err(SpiderError::Configuration(format!(
                "retry.initial_delay_secs must be a finite number of seconds >= 0, got {}",
                self.initial_delay_secs
            )));
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay_secs: 3.0,
            backoff: 2.0,
        }
    }
}

/// Run `operation` until it succeeds, retrying errors accepted by `is_retryable`.
///
/// Between attempts the delay starts at the policy's initial delay and is
/// multiplied by the backoff factor. The last attempt's error is returned
/// unchanged.
pub fn retry_with_backoff<T, E, F, P>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: P,
    mut operation: F,
) -> std::result::Result<T, E>
where
    E: Display,
    F: FnMut() -> std::result::Result<T, E>,
    P: Fn(&E) -> bool,
{
    let mut remaining = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay();

    while remaining > 1 {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) => {
                warn!(
                    error = %e,
                    delay_secs = delay.as_secs_f64(),
                    remaining_attempts = remaining - 1,
                    "{}, retrying in {:?}",
                    e,
                    delay
                );
                sleeper.sleep(delay);
                remaining -= 1;
                delay = policy.next_delay(delay);
            }
            Err(e) => return Err(e),
        }
    }

    operation()
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, delay: Duration) {
        (**self).sleep(delay)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    fn fetch(&self, request: &str) -> Result<Vec<u8>> {
        (**self).fetch(request)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, request: &str) -> Result<Vec<u8>> {
        (**self).fetch(request)
    }
}

/// Blocking HTTP GET fetcher.
///
/// Transport failures and non-success statuses are both reported as
/// [`SpiderError::Fetch`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("picture-spider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SpiderError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: &str) -> Result<Vec<u8>> {
        debug!(request, "GET");
        let response = self
            .client
            .get(request)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| SpiderError::Fetch(e.to_string()))?;
        let body = response.bytes().map_err(|e| SpiderError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Wraps a fetcher so every failed call is retried with backoff.
///
/// Every [`SpiderError::Fetch`] is retried the same way, whether the cause
/// was a timeout or a request the server will never accept.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<F, S = ThreadSleeper> {
    inner: F,
    sleeper: S,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F, ThreadSleeper> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, ThreadSleeper)
    }
}

impl<F: Fetcher, S: Sleeper> RetryingFetcher<F, S> {
    pub fn with_sleeper(inner: F, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<F: Fetcher, S: Sleeper> Fetcher for RetryingFetcher<F, S> {
    fn fetch(&self, request: &str) -> Result<Vec<u8>> {
        retry_with_backoff(
            &self.policy,
            &self.sleeper,
            |e| matches!(e, SpiderError::Fetch(_)),
            || self.inner.fetch(request),
        )
        .map_err(|e| match e {
            SpiderError::Fetch(message) => SpiderError::TransientFetch {
                attempts: self.policy.max_attempts.max(1),
                message,
            },
            other => other,
        })
    }
}
