//! Keyed store of query results.
//!
//! Reads are served from a fresh entry when possible. Otherwise callers for
//! the same key share one fetch running on a spawned task, which retries with
//! exponential backoff before reporting failure to every waiter. Writes mark
//! key prefixes as invalid; nothing is evicted until capacity forces it.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::application::error::ApiError;

use super::clock::{Clock, SystemClock};
use super::config::CacheConfig;
use super::keys::QueryKey;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_HIT: &str = "choplink_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "choplink_cache_miss_total";
pub(crate) const METRIC_CACHE_RETRY: &str = "choplink_cache_fetch_retry_total";
pub(crate) const METRIC_CACHE_INVALIDATED: &str = "choplink_cache_invalidated_total";
pub(crate) const METRIC_CACHE_EVICT: &str = "choplink_cache_evict_total";
pub(crate) const METRIC_CACHE_FETCH_MS: &str = "choplink_cache_fetch_ms";

type AnyValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<AnyValue, ApiError>>>;

#[derive(Clone)]
struct CacheEntry {
    value: Option<AnyValue>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    failure_count: u32,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, config: &CacheConfig) -> bool {
        match (&self.value, self.fetched_at) {
            (Some(_), Some(at)) if !self.invalidated => {
                now.saturating_duration_since(at) <= config.stale_time()
            }
            _ => false,
        }
    }
}

struct InFlight {
    token: u64,
    future: SharedFetch,
}

struct Inner {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: Mutex<LruCache<QueryKey, CacheEntry>>,
    in_flight: DashMap<QueryKey, InFlight>,
    next_token: AtomicU64,
}

/// Snapshot of one query as a consumer would render it.
#[derive(Debug)]
pub struct QueryState<T> {
    /// Last successful result, kept even when stale or after a failed refetch.
    pub data: Option<Arc<T>>,
    pub fetched_at: Option<Instant>,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub failure_count: u32,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            fetched_at: None,
            is_stale: true,
            is_fetching: false,
            failure_count: 0,
        }
    }
}

/// Shared query cache. Clones refer to the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("clock", &self.inner.clock)
            .field("in_flight", &self.inner.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = LruCache::new(config.max_entries_non_zero());
        Self {
            inner: Arc::new(Inner {
                config,
                clock,
                entries: Mutex::new(entries),
                in_flight: DashMap::new(),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Returns the cached value for `key` when fresh, otherwise the result of
    /// the shared in-flight fetch (starting one if none is running).
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if let Some(value) = self.fresh_value(&key) {
            counter!(METRIC_CACHE_HIT).increment(1);
            debug!(key = %key, "query cache hit");
            return downcast(&key, value);
        }

        counter!(METRIC_CACHE_MISS).increment(1);
        let pending = self.join_or_start(&key, fetcher);
        let value = pending.await?;
        downcast(&key, value)
    }

    /// Marks every entry under `prefix` as invalid and detaches matching
    /// in-flight fetches. Returns the number of entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "invalidate");
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        let detached = self.detach_in_flight(prefix);
        drop(entries);

        counter!(METRIC_CACHE_INVALIDATED).increment(marked as u64);
        info!(prefix = %prefix, marked, detached, "invalidated query cache entries");
        marked
    }

    /// Evicts every entry under `prefix`. Returns the number removed.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "remove");
        let doomed: Vec<QueryKey> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        self.detach_in_flight(prefix);
        drop(entries);

        debug!(prefix = %prefix, removed = doomed.len(), "removed query cache entries");
        doomed.len()
    }

    pub fn clear(&self) {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "clear");
        entries.clear();
        self.inner.in_flight.clear();
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.inner.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current state of `key` without touching recency or starting a fetch.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let now = self.inner.clock.now();
        let entries = mutex_lock(&self.inner.entries, SOURCE, "peek");
        let is_fetching = self.inner.in_flight.contains_key(key);
        match entries.peek(key) {
            Some(entry) => QueryState {
                data: entry
                    .value
                    .clone()
                    .and_then(|value| value.downcast::<T>().ok()),
                fetched_at: entry.fetched_at,
                is_stale: !entry.is_fresh(now, &self.inner.config),
                is_fetching,
                failure_count: entry.failure_count,
            },
            None => QueryState {
                is_fetching,
                ..QueryState::default()
            },
        }
    }

    fn fresh_value(&self, key: &QueryKey) -> Option<AnyValue> {
        let now = self.inner.clock.now();
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "fresh_value");
        let entry = entries.get(key)?;
        if entry.is_fresh(now, &self.inner.config) {
            entry.value.clone()
        } else {
            None
        }
    }

    fn join_or_start<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        use dashmap::mapref::entry::Entry;

        match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                debug!(key = %key, "joining in-flight query fetch");
                occupied.get().future.clone()
            }
            Entry::Vacant(vacant) => {
                let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
                let cache = self.clone();
                let task_key = key.clone();
                let handle =
                    tokio::spawn(async move { cache.run_fetch(task_key, token, fetcher).await });
                let future = async move {
                    handle.await.unwrap_or_else(|err| {
                        Err(ApiError::cache(format!("query fetch task failed: {err}")))
                    })
                }
                .boxed()
                .shared();
                vacant.insert(InFlight {
                    token,
                    future: future.clone(),
                });
                debug!(key = %key, token, "started query fetch");
                future
            }
        }
    }

    async fn run_fetch<T, F, Fut>(
        self,
        key: QueryKey,
        token: u64,
        fetcher: F,
    ) -> Result<AnyValue, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let started = Instant::now();
        let retries = self.inner.config.retry;
        let mut attempt: u32 = 0;

        let outcome = loop {
            match fetcher().await {
                Ok(value) => break Ok(Arc::new(value) as AnyValue),
                Err(err) if attempt < retries && err.is_retryable() => {
                    let delay = self.inner.config.retry_delay_for(attempt);
                    counter!(METRIC_CACHE_RETRY).increment(1);
                    warn!(
                        key = %key,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "query fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => break Err(err),
            }
        };

        histogram!(METRIC_CACHE_FETCH_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        self.complete(&key, token, &outcome, attempt + 1);
        outcome
    }

    /// Records the outcome unless the fetch was detached meanwhile, then
    /// releases the in-flight slot.
    fn complete(
        &self,
        key: &QueryKey,
        token: u64,
        outcome: &Result<AnyValue, ApiError>,
        attempts: u32,
    ) {
        let now = self.inner.clock.now();
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "complete");
        let current = self
            .inner
            .in_flight
            .get(key)
            .is_some_and(|in_flight| in_flight.token == token);

        if current {
            match outcome {
                Ok(value) => {
                    let entry = CacheEntry {
                        value: Some(Arc::clone(value)),
                        fetched_at: Some(now),
                        invalidated: false,
                        failure_count: 0,
                    };
                    if let Some((evicted, _)) = entries.push(key.clone(), entry) {
                        if evicted != *key {
                            counter!(METRIC_CACHE_EVICT).increment(1);
                            debug!(key = %evicted, "evicted least recently used query");
                        }
                    }
                }
                Err(err) => {
                    warn!(key = %key, attempts, error = %err, "query fetch failed");
                    match entries.get_mut(key) {
                        Some(entry) => entry.failure_count = attempts,
                        None => {
                            entries.put(
                                key.clone(),
                                CacheEntry {
                                    value: None,
                                    fetched_at: None,
                                    invalidated: false,
                                    failure_count: attempts,
                                },
                            );
                        }
                    }
                }
            }
        } else {
            debug!(key = %key, token, "discarding result of detached query fetch");
        }

        self.inner
            .in_flight
            .remove_if(key, |_, in_flight| in_flight.token == token);
    }

    fn detach_in_flight(&self, prefix: &QueryKey) -> usize {
        let before = self.inner.in_flight.len();
        self.inner
            .in_flight
            .retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.inner.in_flight.len())
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: AnyValue) -> Result<Arc<T>, ApiError> {
    value.downcast::<T>().map_err(|_| {
        ApiError::cache(format!(
            "cached value for {key} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::infra::http::TransportError;

    fn config() -> CacheConfig {
        CacheConfig {
            retry_delay_ms: 0,
            ..CacheConfig::default()
        }
    }

    fn counting_fetcher(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl Fn() -> BoxFuture<'static, Result<String, ApiError>> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(value.to_string()) }.boxed()
        }
    }

    #[tokio::test]
    async fn fresh_entry_is_served_without_refetch() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::restaurants();

        let first = cache
            .fetch(key.clone(), counting_fetcher(&calls, "a"))
            .await
            .expect("first");
        let second = cache
            .fetch(key.clone(), counting_fetcher(&calls, "b"))
            .await
            .expect("second");

        assert_eq!(*first, "a");
        assert_eq!(*second, "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_is_refetched() {
        let clock = Arc::new(ManualClock::new());
        let cache = QueryCache::with_clock(config(), clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::restaurant(1);

        cache
            .fetch(key.clone(), counting_fetcher(&calls, "a"))
            .await
            .expect("first");
        clock.advance(Duration::from_secs(30));
        cache
            .fetch(key.clone(), counting_fetcher(&calls, "a"))
            .await
            .expect("within window");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        assert!(cache.peek::<String>(&key).is_stale);
        cache
            .fetch(key.clone(), counting_fetcher(&calls, "a"))
            .await
            .expect("after window");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn type_mismatch_is_a_cache_error() {
        let cache = QueryCache::new(config());
        let key = QueryKey::menu_item(1);
        cache
            .fetch(key.clone(), || async { Ok::<_, ApiError>(5_u32) })
            .await
            .expect("seed");

        let err = cache
            .fetch(key, || async { Ok::<_, ApiError>("x".to_string()) })
            .await
            .expect_err("mismatched type");
        assert!(matches!(err, ApiError::Cache(_)));
    }

    #[tokio::test]
    async fn failure_records_count_without_caching() {
        let cache = QueryCache::new(config());
        let key = QueryKey::restaurants();

        let err = cache
            .fetch(key.clone(), || async {
                Err::<String, _>(ApiError::from(TransportError::Network("down".into())))
            })
            .await
            .expect_err("fails");
        assert!(matches!(err, ApiError::Transport(_)));

        let state = cache.peek::<String>(&key);
        assert!(state.data.is_none());
        assert_eq!(state.failure_count, 2);
        assert!(!state.is_fetching);
    }

    #[tokio::test]
    async fn lru_capacity_evicts_oldest_query() {
        let cache = QueryCache::new(CacheConfig {
            max_entries: 2,
            ..config()
        });
        for id in 1..=3 {
            cache
                .fetch(QueryKey::menu_item(id), move || async move {
                    Ok::<_, ApiError>(id)
                })
                .await
                .expect("fetch");
        }

        assert_eq!(cache.len(), 2);
        assert!(cache.peek::<i64>(&QueryKey::menu_item(1)).data.is_none());
        assert!(cache.peek::<i64>(&QueryKey::menu_item(3)).data.is_some());
    }

    #[tokio::test]
    async fn remove_and_clear_evict_entries() {
        let cache = QueryCache::new(config());
        for key in [
            QueryKey::restaurants(),
            QueryKey::restaurant(1),
            QueryKey::restaurant_menu(1),
            QueryKey::menu_item(1),
        ] {
            cache
                .fetch(key, || async { Ok::<_, ApiError>(()) })
                .await
                .expect("fetch");
        }

        assert_eq!(cache.remove(&QueryKey::restaurant(1)), 2);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
