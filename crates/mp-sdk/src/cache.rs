//! Query cache
//!
//! Short-lived cache of query results, keyed by segment lists such as
//! `["loans", "{\"page\":2}"]`. Entries serve reads inside their staleness
//! window; mutations invalidate by prefix so `["loans"]` drops every loan
//! page at once. The backend is always the source of truth.

use crate::error::Result;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Append a segment derived from query parameters.
    pub fn with_params<P: Serialize>(mut self, params: &P) -> Self {
        let rendered = serde_json::to_string(params).unwrap_or_default();
        self.0.push(rendered);
        self
    }

    pub fn with(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
    /// Bumped by every invalidation so in-flight loads can tell they raced one.
    generation: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    state: Mutex<State>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value if it is younger than `stale`.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey, stale: Duration) -> Option<T> {
        let state = self.state.lock();
        let entry = state.entries.get(key)?;
        if entry.fetched_at.elapsed() >= stale {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn put<T: Serialize>(&self, key: QueryKey, value: &T) {
        // Values that cannot be represented as JSON are simply not cached.
        if let Ok(value) = serde_json::to_value(value) {
            self.state.lock().entries.insert(
                key,
                Entry {
                    value,
                    fetched_at: Instant::now(),
                },
            );
        }
    }

    /// Store `value` only if nothing was invalidated since `generation`.
    fn put_if_current<T: Serialize>(&self, key: QueryKey, value: &T, generation: u64) -> bool {
        let Ok(value) = serde_json::to_value(value) else {
            return false;
        };
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
        true
    }

    fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Serve from cache or run `loader`, caching a successful result.
    /// Errors are never cached, and neither is a result whose load overlapped
    /// an invalidation or a clear.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, stale: Duration, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get::<T>(&key, stale) {
            trace!(key = %key, "Query cache hit");
            return Ok(hit);
        }
        let generation = self.generation();
        let value = loader().await?;
        if !self.put_if_current(key.clone(), &value, generation) {
            trace!(key = %key, "Cache invalidated during load, result not stored");
        }
        Ok(value)
    }

    /// Drop every entry under `prefix`. Returns how many were removed.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - state.entries.len();
        trace!(prefix = %prefix, removed, "Invalidated queries");
        removed
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_prefix_invalidation() {
        let cache = QueryCache::new();
        cache.put(QueryKey::new(["loans"]).with("p1"), &1);
        cache.put(QueryKey::new(["loans"]).with("p2"), &2);
        cache.put(QueryKey::new(["loan-stats"]), &3);

        assert_eq!(cache.invalidate(&QueryKey::new(["loans"])), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get::<i32>(&QueryKey::new(["loan-stats"]), Duration::from_secs(60)),
            Some(3)
        );
    }

    #[test]
    fn test_stale_entries_are_ignored() {
        let cache = QueryCache::new();
        let key = QueryKey::new(["settings"]);
        cache.put(key.clone(), &"v");
        assert_eq!(cache.get::<String>(&key, Duration::ZERO), None);
        assert_eq!(
            cache.get::<String>(&key, Duration::from_secs(30)).as_deref(),
            Some("v")
        );
    }

    #[tokio::test]
    async fn test_fetch_loads_once_and_skips_errors() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let key = QueryKey::new(["dashboard"]);

        for _ in 0..3 {
            let value: u32 = cache
                .fetch(key.clone(), Duration::from_secs(30), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let failing = QueryKey::new(["health"]);
        let result: Result<u32> = cache
            .fetch(failing.clone(), Duration::from_secs(30), || async {
                Err(crate::Error::Other("boom".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.get::<u32>(&failing, Duration::from_secs(30)).is_none());
    }

    #[tokio::test]
    async fn test_invalidation_during_load_drops_the_result() {
        let cache = QueryCache::new();
        let key = QueryKey::new(["loans"]).with("p1");
        let stale = Duration::from_secs(30);

        let value: u32 = cache
            .fetch(key.clone(), stale, || async {
                // A mutation lands while the read is in flight.
                cache.invalidate(&QueryKey::new(["loans"]));
                Ok(1)
            })
            .await
            .unwrap();
        assert_eq!(value, 1);
        assert!(cache.get::<u32>(&key, stale).is_none());

        let value: u32 = cache
            .fetch(key.clone(), stale, || async {
                cache.clear();
                Ok(2)
            })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert!(cache.is_empty());

        // An undisturbed load is stored as usual.
        let value: u32 = cache.fetch(key.clone(), stale, || async { Ok(3) }).await.unwrap();
        assert_eq!(value, 3);
        assert_eq!(cache.get::<u32>(&key, stale), Some(3));
    }

    #[test]
    fn test_params_segment_distinguishes_pages() {
        #[derive(Serialize)]
        struct P {
            page: u32,
        }
        let a = QueryKey::new(["users"]).with_params(&P { page: 1 });
        let b = QueryKey::new(["users"]).with_params(&P { page: 2 });
        assert_ne!(a, b);
        assert!(a.starts_with(&QueryKey::new(["users"])));
        assert_eq!(a.to_string(), "users/{\"page\":1}");
    }
}
