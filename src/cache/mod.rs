//! Rendered page cache
//!
//! Holds the HTML of rendered routes so the server only goes back to the
//! content API when a page is missing or has outlived its time to live.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A rendered page and when it was produced
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub html: String,
    pub rendered_at: Instant,
    /// `None` keeps the page until it is replaced
    pub ttl: Option<Duration>,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.duration_since(self.rendered_at) < ttl,
            None => true,
        }
    }
}

/// Route -> rendered HTML
#[derive(Debug, Default)]
pub struct PageCache {
    pages: RwLock<HashMap<String, CacheEntry>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh HTML for a route, if any
    pub async fn get(&self, route: &str) -> Option<String> {
        let pages = self.pages.read().await;
        let entry = pages.get(route)?;
        if entry.is_fresh(Instant::now()) {
            Some(entry.html.clone())
        } else {
            tracing::debug!("Cache entry for {} is stale", route);
            None
        }
    }

    /// The stored entry for a route, fresh or not
    pub async fn entry(&self, route: &str) -> Option<CacheEntry> {
        self.pages.read().await.get(route).cloned()
    }

    /// Last HTML stored for a route, fresh or not
    pub async fn get_stale(&self, route: &str) -> Option<String> {
        self.entry(route).await.map(|e| e.html)
    }

    /// Store HTML for a route, replacing any previous page
    pub async fn insert(&self, route: &str, html: String, ttl: Option<Duration>) {
        let entry = CacheEntry {
            html,
            rendered_at: Instant::now(),
            ttl,
        };
        self.pages.write().await.insert(route.to_string(), entry);
        tracing::debug!("Cached {}", route);
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = PageCache::new();
        assert!(cache.is_empty().await);

        cache.insert("/", "<p>home</p>".to_string(), None).await;
        assert_eq!(cache.get("/").await.as_deref(), Some("<p>home</p>"));
        assert_eq!(cache.get("/post/a").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_not_served() {
        let cache = PageCache::new();
        cache
            .insert("/", "old".to_string(), Some(Duration::ZERO))
            .await;
        assert_eq!(cache.get("/").await, None);
        assert_eq!(cache.get_stale("/").await.as_deref(), Some("old"));

        cache
            .insert("/", "new".to_string(), Some(Duration::from_secs(3600)))
            .await;
        assert_eq!(cache.get("/").await.as_deref(), Some("new"));
    }

    #[test]
    fn test_freshness() {
        let now = Instant::now();
        let entry = CacheEntry {
            html: String::new(),
            rendered_at: now,
            ttl: Some(Duration::from_secs(10)),
        };
        assert!(entry.is_fresh(now + Duration::from_secs(9)));
        assert!(!entry.is_fresh(now + Duration::from_secs(10)));
    }
}
