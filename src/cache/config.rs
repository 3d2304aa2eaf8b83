//! Query cache configuration.
//!
//! Controls staleness, retry and capacity via the `[cache]` section of
//! `choplink.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

pub(crate) const DEFAULT_STALE_SECONDS: u64 = 30;
pub(crate) const DEFAULT_RETRY: u32 = 1;
pub(crate) const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub(crate) const DEFAULT_MAX_ENTRIES: usize = 500;
const MAX_RETRY_DELAY_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age (seconds) after which a cached result is refetched on access.
    pub stale_seconds: u64,
    /// Retries after the first failed fetch.
    pub retry: u32,
    /// Base delay (ms) before the first retry; doubles per attempt.
    pub retry_delay_ms: u64,
    /// Maximum cached queries before least recently used ones are evicted.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_seconds: DEFAULT_STALE_SECONDS,
            retry: DEFAULT_RETRY,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            stale_seconds: settings.stale_time.as_secs(),
            retry: settings.retry,
            retry_delay_ms: u64::try_from(settings.retry_delay.as_millis()).unwrap_or(u64::MAX),
            max_entries: settings.max_entries.get(),
        }
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_seconds)
    }

    /// Delay before retry number `attempt` (zero based), capped at 30 seconds.
    pub fn retry_delay_for(&self, attempt: u32) -> Duration {
        let factor = 1_u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let millis = self
            .retry_delay_ms
            .saturating_mul(factor)
            .min(MAX_RETRY_DELAY_MS);
        Duration::from_millis(millis)
    }

    /// Returns the entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_entries).unwrap_or(NonZeroUsize::MIN)
    }
}
