//! Bounded retry with jittered delay

use crate::errors::RetryError;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Generic bounded-retry-with-jittered-delay wrapper.
///
/// Deliberately class-blind: every failure is treated as transient and
/// retried identically. Distinguishing element misses from network
/// timeouts would complicate the policy for no observed benefit in the
/// source system.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay_min: Duration,
    delay_max: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least 1; the delay range is
    /// reordered if given backwards.
    pub fn new(max_attempts: u32, delay_min: Duration, delay_max: Duration) -> Self {
        let (delay_min, delay_max) = if delay_min <= delay_max {
            (delay_min, delay_max)
        } else {
            (delay_max, delay_min)
        };
        Self {
            max_attempts: max_attempts.max(1),
            delay_min,
            delay_max,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` up to `max_attempts` times, sleeping a uniformly
    /// random duration within the delay range between attempts.
    ///
    /// The cancellation token is checked between attempts, never
    /// mid-attempt; a cancelled loop aborts cleanly without touching any
    /// caller state.
    pub async fn execute<T, E, F, Fut>(
        &self,
        label: &str,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, RetryError>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut last = String::new();

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                debug!("'{}' cancelled before attempt {}", label, attempt);
                return Err(RetryError::Cancelled {
                    label: label.to_string(),
                });
            }

            debug!("'{}' attempt {}/{}", label, attempt, self.max_attempts);
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        "'{}' attempt {}/{} failed: {}",
                        label, attempt, self.max_attempts, err
                    );
                    last = err.to_string();
                }
            }

            if attempt < self.max_attempts {
                sleep(self.jittered_delay()).await;
            }
        }

        Err(RetryError::Exhausted {
            label: label.to_string(),
            attempts: self.max_attempts,
            last,
        })
    }

    fn jittered_delay(&self) -> Duration {
        let min = self.delay_min.as_millis() as u64;
        let max = self.delay_max.as_millis() as u64;
        if min >= max {
            return self.delay_min;
        }
        let ms = rand::thread_rng().gen_range(min..=max);
        Duration::from_millis(ms)
    }
}
