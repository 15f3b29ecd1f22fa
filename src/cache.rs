//! Whole-page response cache.
//!
//! Entries are keyed by route plus query string and hold the serialized
//! response body. They expire after a fixed TTL or when a mutation handler
//! invalidates the route they belong to. Writes that bypass the handlers do
//! not invalidate anything: the stale page is served until expiry or
//! [`PageCache::clear`].
//!
//! Every invalidation bumps a generation counter. A render that started
//! before an invalidation finished is handed to its caller but never stored.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedPage {
    body: Bytes,
    expires_at: Instant,
    generation: u64,
}

impl CachedPage {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct PageCache {
    store: DashMap<String, CachedPage>,
    ttl: Duration,
    generation: AtomicU64,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
            generation: AtomicU64::new(0),
        }
    }

    /// `/` with `page=2` becomes `/?page=2`; an absent or empty query is dropped.
    pub fn key(route: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}?{}", route, q),
            _ => route.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                debug!(key, "page cache HIT");
                return Some(entry.body.clone());
            }
        }
        // Expired entries are dropped on read; the guard above is released by now.
        self.store.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn insert(&self, key: String, body: Bytes) {
        self.insert_rendered(key, body, self.current_generation());
    }

    /// Stores a page rendered while `generation` was current. Nothing is kept
    /// if an invalidation happened since.
    fn insert_rendered(&self, key: String, body: Bytes, generation: u64) {
        if self.ttl.is_zero() || self.current_generation() != generation {
            return;
        }
        debug!(key = %key, size_bytes = body.len(), "page cache STORE");
        self.store.insert(
            key.clone(),
            CachedPage {
                body,
                expires_at: Instant::now() + self.ttl,
                generation,
            },
        );

        // An invalidation may have slipped in between the check and the insert.
        if self.current_generation() != generation {
            self.store
                .remove_if(&key, |_, entry| entry.generation == generation);
        }
    }

    /// Returns the cached body for `key`, rendering and storing it on a miss.
    pub async fn get_or_render<F, Fut, E>(&self, key: String, render: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if let Some(body) = self.get(&key) {
            return Ok(body);
        }
        debug!(key = %key, "page cache MISS");

        let generation = self.current_generation();
        let body = render().await?;
        self.insert_rendered(key, body.clone(), generation);
        Ok(body)
    }

    /// Drops every entry of `route`, whatever its query string.
    pub fn invalidate_route(&self, route: &str) {
        let prefix = format!("{}?", route);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store
            .retain(|key, _| key != route && !key.starts_with(&prefix));
        debug!(route, "page cache INVALIDATE");
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
