//! Mock collaborators for cache and alert testing

use async_trait::async_trait;
use chartdash_core::cache::CacheStoreStats;
use chartdash_core::error::{Error, StorageError};
use chartdash_core::{AlertTransport, ChartCache, Result};
use std::sync::Mutex;
use std::time::Duration;

/// A primary cache whose every operation fails with a storage error
///
/// Used to exercise the fallback coordinator and the facade's guarantee that
/// cache failures never reach callers.
pub struct FailingCache;

impl FailingCache {
    fn unavailable<T>() -> Result<T> {
        Err(Error::Storage(StorageError::cache_unavailable(
            "simulated outage",
        )))
    }
}

#[async_trait]
impl ChartCache for FailingCache {
    async fn set(&self, _key: &str, _payload: &str, _ttl: Duration) -> Result<()> {
        Self::unavailable()
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Self::unavailable()
    }

    async fn is_valid(&self, _key: &str) -> Result<bool> {
        Self::unavailable()
    }

    async fn invalidate(&self, _key: &str) -> Result<()> {
        Self::unavailable()
    }

    async fn clear(&self) -> Result<()> {
        Self::unavailable()
    }

    async fn cleanup(&self) -> Result<u64> {
        Self::unavailable()
    }

    async fn stats(&self) -> Result<CacheStoreStats> {
        Self::unavailable()
    }
}

/// One alert delivery captured by [`CapturingTransport`]
#[derive(Debug, Clone)]
pub struct CapturedAlert {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// An alert transport that records deliveries instead of sending them
#[derive(Default)]
pub struct CapturingTransport {
    sent: Mutex<Vec<CapturedAlert>>,
    fail: bool,
}

impl CapturingTransport {
    /// Create a transport that accepts every delivery
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that rejects every delivery
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Deliveries captured so far
    pub fn captured(&self) -> Vec<CapturedAlert> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AlertTransport for CapturingTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Storage(StorageError::connection(
                "simulated transport failure",
            )));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(CapturedAlert {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        }
        Ok(())
    }
}
