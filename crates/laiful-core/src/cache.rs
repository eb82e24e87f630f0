//! Short-lived caches for gateway lookups.
//!
//! [`ShortLivedCache`] is a keyed TTL cache used for price lists.
//! [`LatestSnapshot`] is a single last-fetch-wins slot used for deposit
//! methods and banks: no expiry, replaced whenever the menu is re-opened.

use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Keyed cache whose entries expire a fixed time after they were fetched
#[derive(Clone)]
pub struct ShortLivedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<K, V>,
}

impl<K, V> ShortLivedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose entries stay fresh for `ttl`.
    ///
    /// # Arguments
    ///
    /// * `ttl` - Freshness window, counted from the fetch
    /// * `max_capacity` - Maximum number of keys kept
    #[must_use]
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Returns the cached value for `key`, calling `fetch` when absent or stale.
    ///
    /// Concurrent misses on the same key share one `fetch`. A failed fetch
    /// stores nothing, so the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch`.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        self.cache
            .try_get_with(key, fetch())
            .await
            .map_err(|e: Arc<E>| E::clone(&e))
    }
}

/// Single-slot cache that always holds the most recent fetch
pub struct LatestSnapshot<T> {
    slot: RwLock<Arc<Vec<T>>>,
}

impl<T> Default for LatestSnapshot<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(Arc::new(Vec::new())),
        }
    }
}

impl<T> LatestSnapshot<T> {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot.
    pub async fn replace(&self, items: Vec<T>) {
        *self.slot.write().await = Arc::new(items);
    }

    /// Current snapshot, possibly empty
    #[cfg(test)]
    pub async fn current(&self) -> Arc<Vec<T>> {
        Arc::clone(&*self.slot.read().await)
    }

    /// First item of the current snapshot matching `pred`
    pub async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T>
    where
        T: Clone,
    {
        self.slot.read().await.iter().find(|item| pred(item)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(calls: &AtomicUsize, value: u32) -> Result<u32, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_is_cached() {
        let cache: ShortLivedCache<&'static str, u32> =
            ShortLivedCache::new(Duration::from_secs(300), 10);
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_fetch("prabayar", || counted(&calls, 1)).await;
        let second = cache.get_or_fetch("prabayar", || counted(&calls, 2)).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache: ShortLivedCache<&'static str, u32> =
            ShortLivedCache::new(Duration::from_secs(300), 10);
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch("prabayar", || counted(&calls, 1)).await.ok();
        let post = cache.get_or_fetch("pascabayar", || counted(&calls, 2)).await;

        assert_eq!(post, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let cache: ShortLivedCache<&'static str, u32> =
            ShortLivedCache::new(Duration::from_millis(50), 10);
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch("prabayar", || counted(&calls, 1)).await.ok();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let refreshed = cache.get_or_fetch("prabayar", || counted(&calls, 2)).await;

        assert_eq!(refreshed, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ShortLivedCache<&'static str, u32> =
            ShortLivedCache::new(Duration::from_secs(300), 10);

        let failed = cache
            .get_or_fetch("prabayar", || async { Err::<u32, String>("down".into()) })
            .await;
        assert_eq!(failed, Err("down".to_string()));

        let ok = cache
            .get_or_fetch("prabayar", || async { Ok::<u32, String>(7) })
            .await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache: ShortLivedCache<&'static str, u32> =
            ShortLivedCache::new(Duration::from_secs(300), 10);
        let calls = AtomicUsize::new(0);
        let slow = |value| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<u32, String>(value)
            }
        };

        let (first, second) = tokio::join!(
            cache.get_or_fetch("prabayar", || slow(1)),
            cache.get_or_fetch("prabayar", || slow(2)),
        );

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_snapshot_find_matches_latest() {
        let snapshot = LatestSnapshot::new();
        snapshot.replace(vec!["QRIS", "BCA"]).await;

        assert_eq!(snapshot.find(|m| m.eq_ignore_ascii_case("bca")).await, Some("BCA"));
        snapshot.replace(vec!["OVO"]).await;
        assert_eq!(snapshot.find(|m| *m == "BCA").await, None);
    }

    #[tokio::test]
    async fn test_snapshot_last_fetch_wins() {
        let snapshot = LatestSnapshot::new();
        assert!(snapshot.current().await.is_empty());

        snapshot.replace(vec!["QRIS", "BCA"]).await;
        let held = snapshot.current().await;
        snapshot.replace(vec!["OVO"]).await;

        // Earlier readers keep their copy
        assert_eq!(held.as_slice(), &["QRIS", "BCA"]);
        assert_eq!(snapshot.current().await.as_slice(), &["OVO"]);
    }
}
