//! Inter-request pacing for rate-limited providers.
//!
//! Synthesis providers enforce per-minute rate limits, so the chunk loop
//! waits between consecutive requests. The wait is behind a trait so tests
//! can run the loop without real delays.

use async_trait::async_trait;
use std::time::Duration;

/// A pause inserted between consecutive synthesis requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Waits a fixed interval between requests.
pub struct FixedIntervalPacer {
    interval: Duration,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

#[async_trait]
impl Pacer for FixedIntervalPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Never waits. For tests and providers without rate limits.
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_pacer_returns_immediately() {
        let pacer = NoPacer;
        pacer.pause().await;
    }

    #[tokio::test]
    async fn test_fixed_interval_zero() {
        let pacer = FixedIntervalPacer::from_secs(0);
        pacer.pause().await;
    }
}
