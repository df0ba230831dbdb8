//! Wall-clock budget for a whole CRUD call.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::ProviderError;

/// Default budget for create, update and delete.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy)]
pub struct OperationTimeout {
    duration: Duration,
}

impl OperationTimeout {
    /// Create a timeout. A zero duration is rejected.
    pub fn new(duration: Duration) -> Result<Self, ProviderError> {
        if duration.is_zero() {
            return Err(ProviderError::Config("operation timeout must be non-zero".into()));
        }
        Ok(Self { duration })
    }

    /// Inspect the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub async fn run<T, Fut>(&self, operation: Fut) -> Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let start = Instant::now();

        match tokio::time::timeout(self.duration, operation).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::OperationTimeout {
                elapsed: start.elapsed(),
                timeout: self.duration,
            }),
        }
    }
}

impl Default for OperationTimeout {
    fn default() -> Self {
        Self { duration: DEFAULT_OPERATION_TIMEOUT }
    }
}
