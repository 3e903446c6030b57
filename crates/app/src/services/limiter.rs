use lopper_core::{CoreError, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many repositories are processed at once.
///
/// Waiters are served first-come-first-served, so a waiting dispatcher is
/// never starved by permits being handed to later callers.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One unit of concurrency capacity. Dropping it releases the slot.
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl Permit {
    /// Give the slot back to the limiter
    pub fn release(self) {}
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > Semaphore::MAX_PERMITS {
            return Err(CoreError::InvalidConcurrency { value: capacity });
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// Wait for a free slot. Fails once the limiter has been closed.
    pub async fn acquire(&self) -> Result<Permit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CoreError::PermitAcquisition {
                reason: e.to_string(),
            })?;
        Ok(Permit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Fail every pending and future `acquire`
    pub fn close(&self) {
        self.semaphore.close();
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}
