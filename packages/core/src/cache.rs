use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// Source of "now" for cache staleness and for anchoring schedules.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: StdMutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: StdMutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A value together with the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CachedValue<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CachedValue<T> {
    pub fn new(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }

    /// True once more than `ttl` has passed since the fetch.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at > ttl
    }
}

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Keyed read-through TTL cache. Callers pass `now` and the fetch
/// function, so the cache itself owns no clock and no client.
pub struct TtlCache<K, T> {
    entries: Mutex<HashMap<K, CachedValue<T>>>,
    ttl: Duration,
}

impl<K, T> TtlCache<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value only while it is fresh.
    pub async fn get(&self, key: &K, now: DateTime<Utc>) -> Option<T> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|cached| !cached.is_stale(now, self.ttl))
            .map(|cached| cached.value.clone())
    }

    pub async fn insert(&self, key: K, value: T, now: DateTime<Utc>) {
        self.entries
            .lock()
            .await
            .insert(key, CachedValue::new(value, now));
    }

    /// Serve `key` from the cache, or run `fetch` and remember its result.
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: K,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<(T, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(&key, now).await {
            return Ok((value, CacheStatus::Hit));
        }

        let fresh = fetch().await?;
        self.insert(key, fresh.clone(), now).await;
        Ok((fresh, CacheStatus::Miss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn cached_value_goes_stale_after_ttl() {
        let cached = CachedValue::new(42_u64, start());
        let ttl = Duration::hours(1);

        assert!(!cached.is_stale(start(), ttl));
        assert!(!cached.is_stale(start() + ttl, ttl));
        assert!(cached.is_stale(start() + ttl + Duration::seconds(1), ttl));
    }

    #[tokio::test]
    async fn get_returns_none_when_cache_is_empty() {
        let cache = TtlCache::<&str, u64>::new(Duration::seconds(5));
        assert!(cache.get(&"ma", start()).await.is_none());
    }

    #[tokio::test]
    async fn get_returns_none_after_ttl_expires() {
        let cache = TtlCache::new(Duration::minutes(60));
        cache.insert("ma", 42_u64, start()).await;

        assert_eq!(cache.get(&"ma", start() + Duration::minutes(30)).await, Some(42));
        assert!(cache.get(&"ma", start() + Duration::hours(2)).await.is_none());
    }

    #[tokio::test]
    async fn get_or_fetch_refetches_only_when_stale() {
        let cache = TtlCache::new(Duration::hours(1));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let clock = FixedClock::new(start());

        let fetch = move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(n)
        };

        let (first, status) = cache.get_or_fetch("lpa", clock.now(), fetch).await.unwrap();
        assert_eq!((first, status), (0, CacheStatus::Miss));

        clock.advance(Duration::minutes(59));
        let (second, status) = cache.get_or_fetch("lpa", clock.now(), fetch).await.unwrap();
        assert_eq!((second, status), (0, CacheStatus::Hit));

        clock.advance(Duration::hours(1));
        let (third, status) = cache.get_or_fetch("lpa", clock.now(), fetch).await.unwrap();
        assert_eq!((third, status), (1, CacheStatus::Miss));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = TtlCache::<&str, u64>::new(Duration::hours(1));

        let err = cache
            .get_or_fetch("sc", start(), || async { Err::<u64, _>("upstream down") })
            .await
            .unwrap_err();
        assert_eq!(err, "upstream down");

        let (value, status) = cache
            .get_or_fetch("sc", start(), || async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!((value, status), (7, CacheStatus::Miss));
    }
}
