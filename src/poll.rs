//! Status polling on top of [`RetryPolicy`].
//!
//! Turns the Platform's `creating → created | failed` lifecycle into one awaitable call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{Entity, ObjectState};
use crate::clock::{Clock, MonotonicClock};
use crate::error::{ProviderError, ProviderResult, RetryError};
use crate::retry::{RetryPolicy, DEFAULT_TIMEOUT};
use crate::sleeper::{Sleeper, TokioSleeper};

pub const STATUS_CREATING: &str = "creating";
pub const STATUS_CREATED: &str = "created";

/// Attempt budget for one status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub attempts: usize,
    pub interval: Duration,
    /// Deadline across all attempts. `None` leaves only the attempt budget.
    pub timeout: Option<Duration>,
}

impl PollSettings {
    /// `attempts` checks spaced `interval` apart, bounded by the default retry deadline.
    pub const fn new(attempts: usize, interval: Duration) -> Self {
        Self { attempts, interval, timeout: Some(DEFAULT_TIMEOUT) }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Drop the overall deadline; only the attempt budget bounds the poll.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Resources: 20 checks, 10 s apart.
    pub const fn resource() -> Self {
        Self::new(20, Duration::from_secs(10))
    }

    /// Sessions: 30 checks, 10 s apart.
    pub const fn session() -> Self {
        Self::new(30, Duration::from_secs(10))
    }

    /// Authorizations: 20 checks, 10 s apart.
    pub const fn authorization() -> Self {
        Self::new(20, Duration::from_secs(10))
    }

    /// Session delete: 20 checks, 10 s apart.
    pub const fn session_delete() -> Self {
        Self::new(20, Duration::from_secs(10))
    }
}

/// Drives status polls with a shared sleeper and clock.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self { sleeper: Arc::new(TokioSleeper), clock: Arc::new(MonotonicClock::default()) }
    }
}

impl StatusPoller {
    pub fn new(sleeper: Arc<dyn Sleeper>, clock: Arc<dyn Clock>) -> Self {
        Self { sleeper, clock }
    }

    /// Retry policy polling `ObjectState`s while `keep_polling` holds.
    pub fn policy<F>(
        &self,
        settings: PollSettings,
        cancel: &CancellationToken,
        keep_polling: F,
    ) -> ProviderResult<RetryPolicy<ObjectState, ProviderError>>
    where
        F: Fn(&ObjectState) -> bool + Send + Sync + 'static,
    {
        RetryPolicy::builder()
            .retry_limit(settings.attempts)
            .sleep(settings.interval)
            .timeout(settings.timeout)
            .error_checker(ProviderError::is_retryable)
            .result_checker(keep_polling)
            .with_shared_sleeper(self.sleeper.clone())
            .with_clock(self.clock.clone())
            .with_cancel(cancel.clone())
            .build()
            .map_err(|error| ProviderError::Config(error.to_string()))
    }

    /// Poll `read` until the object leaves `creating`.
    ///
    /// `created` is success; any other settled status is [`ProviderError::AsyncFailed`]; an
    /// exhausted budget is [`ProviderError::AsyncTimeout`].
    pub async fn wait_while_creating<Fut, Op>(
        &self,
        entity: Entity,
        id: &str,
        settings: PollSettings,
        cancel: &CancellationToken,
        read: Op,
    ) -> ProviderResult<ObjectState>
    where
        Fut: Future<Output = ProviderResult<ObjectState>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        let policy = self.policy(settings, cancel, |state| state.status_is(STATUS_CREATING))?;

        match policy.execute(read).await {
            Ok(state) if state.status_is(STATUS_CREATED) => {
                debug!(%entity, id, "settled");
                Ok(state)
            }
            Ok(state) => {
                let status = state.status().unwrap_or_default().to_owned();
                warn!(%entity, id, status = %status, "settled in unexpected status");
                Err(ProviderError::AsyncFailed { entity, id: id.to_owned(), status })
            }
            Err(error) => Err(settle_error(entity, id, error)),
        }
    }
}

/// Map the retry outcome of a status poll onto the provider taxonomy.
pub(crate) fn settle_error(
    entity: Entity,
    id: &str,
    error: RetryError<ProviderError>,
) -> ProviderError {
    match error {
        RetryError::Inner(error) => error,
        RetryError::Cancelled { .. } => ProviderError::Cancelled,
        RetryError::MaxRetriesReached { attempts, last } => {
            if let Some(last) = &last {
                warn!(%entity, id, attempts, error = %last, "status poll exhausted");
            }
            ProviderError::AsyncTimeout { entity, id: id.to_owned(), attempts }
        }
        RetryError::Timeout { elapsed, attempts, .. } => {
            warn!(%entity, id, attempts, ?elapsed, "status poll deadline exceeded");
            ProviderError::AsyncTimeout { entity, id: id.to_owned(), attempts }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sleeper::TrackingSleeper;
    use futures::future::BoxFuture;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sleeper that moves a manual clock instead of waiting.
    #[derive(Debug)]
    struct AdvancingSleeper(ManualClock);

    impl Sleeper for AdvancingSleeper {
        fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
            self.0.advance(duration);
            Box::pin(async {})
        }
    }

    fn state(status: &str) -> ObjectState {
        serde_json::from_value(json!({ "Status": status })).unwrap()
    }

    fn poller(sleeper: &TrackingSleeper) -> StatusPoller {
        StatusPoller::new(Arc::new(sleeper.clone()), Arc::new(ManualClock::new()))
    }

    #[tokio::test]
    async fn converges_once_status_leaves_creating() {
        let sleeper = TrackingSleeper::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = poller(&sleeper)
            .wait_while_creating(
                Entity::Resource,
                "r1",
                PollSettings::resource(),
                &CancellationToken::new(),
                move || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(state(if n < 2 { "Creating" } else { "CREATED" })) }
                },
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.calls(), 2);
        assert_eq!(sleeper.call_at(0), Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn failed_status_is_reported_immediately() {
        let sleeper = TrackingSleeper::new();
        let err = poller(&sleeper)
            .wait_while_creating(
                Entity::Authorization,
                "a1",
                PollSettings::authorization(),
                &CancellationToken::new(),
                || async { Ok(state("failed")) },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::AsyncFailed { ref status, .. } if status == "failed"));
        assert_eq!(sleeper.calls(), 0);
    }

    #[tokio::test]
    async fn exhausted_budget_is_async_timeout() {
        let sleeper = TrackingSleeper::new();
        let err = poller(&sleeper)
            .wait_while_creating(
                Entity::Session,
                "s1",
                PollSettings::new(4, Duration::from_secs(10)),
                &CancellationToken::new(),
                || async { Ok(state("creating")) },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::AsyncTimeout { attempts: 4, .. }));
        assert_eq!(sleeper.calls(), 3);
    }

    #[tokio::test]
    async fn authentication_failure_stops_polling() {
        let sleeper = TrackingSleeper::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let err = poller(&sleeper)
            .wait_while_creating(
                Entity::Resource,
                "r1",
                PollSettings::resource(),
                &CancellationToken::new(),
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Err(ProviderError::AuthenticationFailed) }
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::AuthenticationFailed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_first_read() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = poller(&TrackingSleeper::new())
            .wait_while_creating(
                Entity::Resource,
                "r1",
                PollSettings::resource(),
                &cancel,
                || async { Ok(state("creating")) },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
    }

    #[test]
    fn standard_budgets_carry_the_default_deadline() {
        for settings in [
            PollSettings::resource(),
            PollSettings::session(),
            PollSettings::authorization(),
            PollSettings::session_delete(),
        ] {
            assert_eq!(settings.timeout, Some(DEFAULT_TIMEOUT));
        }
        assert_eq!(PollSettings::session().without_timeout().timeout, None);
    }

    #[tokio::test]
    async fn slow_reads_hit_the_deadline_before_the_attempt_budget() {
        let clock = ManualClock::new();
        let poller =
            StatusPoller::new(Arc::new(AdvancingSleeper(clock.clone())), Arc::new(clock.clone()));
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = reads.clone();
        let read_clock = clock.clone();

        let err = poller
            .wait_while_creating(
                Entity::Session,
                "s1",
                PollSettings::session(),
                &CancellationToken::new(),
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    read_clock.advance(Duration::from_secs(15));
                    async { Ok(state("creating")) }
                },
            )
            .await
            .unwrap_err();

        // 15 s read + 10 s pause per cycle: the twelfth cycle ends exactly at five minutes.
        assert_eq!(reads.load(Ordering::SeqCst), 12);
        assert_eq!(clock.now_millis(), 300_000);
        assert!(matches!(err, ProviderError::AsyncTimeout { attempts: 12, .. }));
    }
}
