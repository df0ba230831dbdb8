//! Bounded-retry primitive
//!
//! Converts "try, inspect, sleep, try again" into a single awaitable call. The Platform's
//! `creating → created | failed` lifecycle is driven through this loop.
//!
//! Semantics per attempt:
//! 1. if the overall deadline has elapsed, fail with [`RetryError::Timeout`];
//! 2. if the cancellation token fired, fail with [`RetryError::Cancelled`];
//! 3. run the operation;
//! 4. an `Ok` value the `result_checker` flags as bad, or an `Err` the `error_checker`
//!    accepts as retryable, triggers another attempt after `sleep`;
//! 5. when the attempt count reaches `retry_limit`, the `after_retry_limit` hook runs and the
//!    call fails with [`RetryError::MaxRetriesReached`] carrying the last error;
//! 6. a non-retryable error returns immediately as [`RetryError::Inner`].
//!
//! Defaults: `retry_limit = 10`, `timeout = 5 min`, every error retryable, every value
//! accepted, one second between attempts.
//!
//! ```rust
//! use std::time::Duration;
//! use adaptive_provider::{InstantSleeper, RetryPolicy};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut polls = 0;
//! let policy = RetryPolicy::<u32, std::io::Error>::builder()
//!     .retry_limit(5)
//!     .sleep(Duration::from_secs(10))
//!     .result_checker(|v: &u32| *v < 3)
//!     .with_sleeper(InstantSleeper)
//!     .build()
//!     .unwrap();
//! let value = policy
//!     .execute(|| {
//!         polls += 1;
//!         let current = polls;
//!         async move { Ok::<_, std::io::Error>(current) }
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(value, 3);
//! # });
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clock::{Clock, MonotonicClock};
use crate::error::RetryError;
use crate::sleeper::{Sleeper, TokioSleeper};

/// Default number of attempts.
pub const DEFAULT_RETRY_LIMIT: usize = 10;
/// Default overall deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Default pause between attempts.
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(1);

type ErrorChecker<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type ResultChecker<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type AfterRetryLimit<E> = Arc<dyn Fn(Option<&E>) + Send + Sync>;

/// Retry policy: attempt budget, pause, deadline and the two checkers.
pub struct RetryPolicy<T, E> {
    retry_limit: usize,
    sleep: Duration,
    timeout: Option<Duration>,
    error_checker: ErrorChecker<E>,
    result_checker: ResultChecker<T>,
    after_retry_limit: Option<AfterRetryLimit<E>>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl<T, E> Clone for RetryPolicy<T, E> {
    fn clone(&self) -> Self {
        Self {
            retry_limit: self.retry_limit,
            sleep: self.sleep,
            timeout: self.timeout,
            error_checker: self.error_checker.clone(),
            result_checker: self.result_checker.clone(),
            after_retry_limit: self.after_retry_limit.clone(),
            sleeper: self.sleeper.clone(),
            clock: self.clock.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for RetryPolicy<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("retry_limit", &self.retry_limit)
            .field("sleep", &self.sleep)
            .field("timeout", &self.timeout)
            .field("sleeper", &self.sleeper)
            .field("error_checker", &"<predicate>")
            .field("result_checker", &"<predicate>")
            .finish()
    }
}

impl<T, E> RetryPolicy<T, E>
where
    T: Send,
    E: Send,
{
    /// Construct a new builder with defaults.
    pub fn builder() -> RetryPolicyBuilder<T, E> {
        RetryPolicyBuilder::new()
    }

    /// Configured attempt budget.
    pub fn retry_limit(&self) -> usize {
        self.retry_limit
    }

    /// Run `operation` until it yields an accepted value or the budget runs out.
    pub async fn execute<Fut, Op>(&self, mut operation: Op) -> Result<T, RetryError<E>>
    where
        Fut: Future<Output = Result<T, E>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        let started = self.clock.now_millis();
        let mut last_error: Option<E> = None;

        for attempt in 1..=self.retry_limit {
            if let Some(timeout) = self.timeout {
                let elapsed =
                    Duration::from_millis(self.clock.now_millis().saturating_sub(started));
                if elapsed >= timeout {
                    return Err(RetryError::Timeout { elapsed, timeout, attempts: attempt - 1 });
                }
            }
            if self.cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt - 1 });
            }

            match operation().await {
                Ok(value) if !(self.result_checker)(&value) => return Ok(value),
                Ok(_) => last_error = None,
                Err(e) if (self.error_checker)(&e) => last_error = Some(e),
                Err(e) => return Err(RetryError::Inner(e)),
            }

            if attempt >= self.retry_limit {
                if let Some(hook) = &self.after_retry_limit {
                    hook(last_error.as_ref());
                }
                return Err(RetryError::MaxRetriesReached { attempts: attempt, last: last_error });
            }

            debug!(attempt, retry_limit = self.retry_limit, delay = ?self.sleep, "retrying");
            tokio::select! {
                _ = self.sleeper.sleep(self.sleep) => {}
                _ = self.cancel.cancelled() => {
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
            }
        }

        // retry_limit is validated to be > 0, so the loop always returns.
        Err(RetryError::MaxRetriesReached { attempts: self.retry_limit, last: last_error })
    }
}

/// Builder for [`RetryPolicy`].
pub struct RetryPolicyBuilder<T, E> {
    retry_limit: usize,
    sleep: Duration,
    timeout: Option<Duration>,
    error_checker: ErrorChecker<E>,
    result_checker: ResultChecker<T>,
    after_retry_limit: Option<AfterRetryLimit<E>>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

/// Errors produced while building a retry policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// `retry_limit` must be > 0.
    #[error("retry_limit must be > 0 (got {0})")]
    InvalidRetryLimit(usize),
}

impl<T, E> RetryPolicyBuilder<T, E> {
    /// Create a builder with the default policy.
    pub fn new() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            sleep: DEFAULT_SLEEP,
            timeout: Some(DEFAULT_TIMEOUT),
            error_checker: Arc::new(|_| true),
            result_checker: Arc::new(|_| false),
            after_retry_limit: None,
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(MonotonicClock::default()),
            cancel: CancellationToken::default(),
        }
    }

    /// Maximum number of attempts. Must be > 0.
    pub fn retry_limit(mut self, attempts: usize) -> Self {
        self.retry_limit = attempts;
        self
    }

    /// Pause between attempts.
    pub fn sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    /// Overall deadline; `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Predicate deciding whether an error is worth another attempt.
    pub fn error_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.error_checker = Arc::new(checker);
        self
    }

    /// Predicate flagging an `Ok` value as bad (keep polling).
    pub fn result_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.result_checker = Arc::new(checker);
        self
    }

    /// Hook invoked once when the attempt budget is exhausted.
    pub fn after_retry_limit<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&E>) + Send + Sync + 'static,
    {
        self.after_retry_limit = Some(Arc::new(hook));
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Share an existing sleeper.
    pub fn with_shared_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Share an existing clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Abort between attempts when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build the retry policy, validating inputs.
    pub fn build(self) -> Result<RetryPolicy<T, E>, BuildError> {
        if self.retry_limit == 0 {
            return Err(BuildError::InvalidRetryLimit(0));
        }
        Ok(RetryPolicy {
            retry_limit: self.retry_limit,
            sleep: self.sleep,
            timeout: self.timeout,
            error_checker: self.error_checker,
            result_checker: self.result_checker,
            after_retry_limit: self.after_retry_limit,
            sleeper: self.sleeper,
            clock: self.clock,
            cancel: self.cancel,
        })
    }
}

impl<T, E> Default for RetryPolicyBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
