use crate::config::BatchingConfig;
use crate::harvest::traits::{Delay, FetchError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Bounded retry budget with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl From<&BatchingConfig> for RetryPolicy {
    fn from(config: &BatchingConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }
}

/// States of one bounded retry run. Attempts are numbered from 1.
///
/// Terminal states own their outcome: `Succeeded` holds the value and
/// `Exhausted` holds the last attempt's error.
#[derive(Debug)]
pub enum RetryState<T> {
    Attempting { attempt: u32 },
    Waiting { attempt: u32, last_error: FetchError },
    Succeeded { attempts: u32, value: T },
    Exhausted { attempts: u32, last_error: FetchError },
}

impl<T> RetryState<T> {
    pub fn start() -> Self {
        RetryState::Attempting { attempt: 1 }
    }

    pub fn on_success(self, value: T) -> Self {
        match self {
            RetryState::Attempting { attempt } => RetryState::Succeeded {
                attempts: attempt,
                value,
            },
            other => other,
        }
    }

    /// A failed attempt moves to `Waiting` while retries remain, else `Exhausted`.
    pub fn on_failure(self, error: FetchError, policy: &RetryPolicy) -> Self {
        match self {
            RetryState::Attempting { attempt } if attempt > policy.max_retries => {
                RetryState::Exhausted {
                    attempts: attempt,
                    last_error: error,
                }
            }
            RetryState::Attempting { attempt } => RetryState::Waiting {
                attempt,
                last_error: error,
            },
            other => other,
        }
    }

    pub fn on_wait_elapsed(self) -> Self {
        match self {
            RetryState::Waiting { attempt, .. } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }
}

/// A value produced by [`RetryExecutor::execute`] and the attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// The retry budget ran out; `source` is the last attempt's error, unchanged.
#[derive(Error, Debug)]
#[error("{operation} failed after {attempts} attempt(s): {source}")]
pub struct RetryExhausted {
    pub operation: String,
    pub attempts: u32,
    #[source]
    pub source: FetchError,
}

impl RetryExhausted {
    pub fn into_inner(self) -> FetchError {
        self.source
    }
}

/// Runs a fallible async operation under a [`RetryPolicy`].
pub struct RetryExecutor {
    policy: RetryPolicy,
    delay: Arc<dyn Delay>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, delay: Arc<dyn Delay>) -> Self {
        Self { policy, delay }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Calls `attempt_fn` until it succeeds or the budget is spent.
    ///
    /// Every [`FetchError`] is retried the same way: wait `retry_delay`, try
    /// again. After `max_retries` retries the last error is returned.
    #[instrument(skip(self, attempt_fn), fields(max_retries = self.policy.max_retries))]
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        mut attempt_fn: F,
    ) -> Result<Attempted<T>, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut state = RetryState::start();

        loop {
            state = match state {
                RetryState::Attempting { attempt } => match attempt_fn().await {
                    Ok(value) => {
                        debug!(attempt, "{} succeeded", operation);
                        state.on_success(value)
                    }
                    Err(e) => {
                        let next = state.on_failure(e, &self.policy);
                        if let RetryState::Waiting { last_error, .. } = &next {
                            warn!(
                                attempt,
                                max_retries = self.policy.max_retries,
                                retry_delay_ms = self.policy.retry_delay.as_millis() as u64,
                                kind = %last_error.kind(),
                                error = %last_error,
                                "{} failed, retrying",
                                operation
                            );
                        }
                        next
                    }
                },
                RetryState::Waiting { .. } => {
                    self.delay.wait(self.policy.retry_delay).await;
                    state.on_wait_elapsed()
                }
                RetryState::Succeeded { attempts, value } => {
                    return Ok(Attempted { value, attempts });
                }
                RetryState::Exhausted {
                    attempts,
                    last_error,
                } => {
                    return Err(RetryExhausted {
                        operation: operation.to_string(),
                        attempts,
                        source: last_error,
                    });
                }
            };
        }
    }
}
