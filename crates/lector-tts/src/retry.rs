//! Retry wrapper
//!
//! Transient failures, rate-limit signals included, are retried internally
//! with exponential backoff plus jitter, bounded by a maximum attempt count.
//! After exhaustion the wrapper raises `RateLimited` when the last failure
//! was a rate limit, so the caller can degrade instead of abort.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::provider::{SynthError, SynthesisProvider};

/// Backoff tuning.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first call included.
    pub max_attempts: u32,
    /// Backoff base; attempt n sleeps base * 2^n plus jitter.
    pub base: Duration,
    /// Upper bound on any single sleep.
    pub max_sleep: Duration,
    /// Uniform jitter added to each sleep.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base: Duration::from_millis(500),
            max_sleep: Duration::from_secs(8),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    fn sleep_for(&self, attempt: u32) -> Duration {
        let backoff = self.base.saturating_mul(1 << attempt.min(16));
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..=self.jitter);
        (backoff + jitter).min(self.max_sleep)
    }
}

/// A provider wrapped with bounded retry.
pub struct Retrying<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> Retrying<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: SynthesisProvider> SynthesisProvider for Retrying<P> {
    async fn synth(&self, text: &str, voice: &str) -> Result<Vec<i16>, SynthError> {
        let mut last_err = None;
        for attempt in 0..self.policy.max_attempts {
            match self.inner.synth(text, voice).await {
                Ok(pcm) => return Ok(pcm),
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "Synthesis attempt failed");
                    last_err = Some(err);
                    if attempt + 1 < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.sleep_for(attempt)).await;
                    }
                }
            }
        }
        match last_err {
            // Persistent backpressure surfaces distinctly.
            Some(SynthError::RateLimited) => Err(SynthError::RateLimited),
            Some(err) => Err(err),
            None => Err(SynthError::Failed("no attempts made".to_string())),
        }
    }
}
