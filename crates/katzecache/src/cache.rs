//! ImageCache: shared LRU of image bytes keyed by URL

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Bounds applied to an `ImageCache`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Maximum number of images held
    pub max_entries: usize,
    /// Maximum sum of image sizes in bytes
    pub max_cost: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_entries: 50_000_000,
            max_cost: 50_000_000,
        }
    }
}

/// Thread-safe cache of downloaded image bytes.
///
/// Keys are percent-encoded URL strings; the cost of an entry is its length
/// in bytes. Clones share the same underlying cache.
#[derive(Clone)]
pub struct ImageCache {
    /// LRU cache for image bytes
    cache: Arc<RwLock<LruCache<String, Bytes>>>,

    /// Cache statistics
    stats: Arc<CacheStats>,

    /// Configured bounds
    limits: CacheLimits,
}

impl ImageCache {
    /// Create a new ImageCache with the given limits
    ///
    /// # Panics
    /// If either limit is zero.
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(limits.max_entries, limits.max_cost))),
            stats: Arc::new(CacheStats::new()),
            limits,
        }
    }

    /// Look up an image, recording a hit or a miss
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut cache = self.cache.write();
        // Bytes clones are reference counted
        match cache.get(key) {
            Some(bytes) => {
                self.stats.record_hit();
                Some(bytes.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Store an image under `key` with cost equal to its length
    ///
    /// # Returns
    /// * `bool` - Whether the image was kept (it may exceed the cost limit alone)
    pub fn insert(&self, key: &str, bytes: Bytes) -> bool {
        let cost = bytes.len();
        let mut cache = self.cache.write();
        let evicted = cache.put(key.to_string(), bytes, cost);
        self.stats.record_evictions(evicted);

        let kept = cache.contains(key);
        if kept {
            self.stats.record_insert();
        }
        kept
    }

    /// Check for a key without affecting recency or statistics
    pub fn contains(&self, key: &str) -> bool {
        self.cache.read().contains(key)
    }

    /// Drop every cached image and reset statistics
    pub fn purge(&self) {
        let mut cache = self.cache.write();
        cache.clear();
        self.stats.reset();
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of cached images
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Total bytes held
    pub fn total_cost(&self) -> usize {
        self.cache.read().total_cost()
    }

    /// Configured bounds
    pub fn limits(&self) -> CacheLimits {
        self.limits
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(CacheLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL_A: &str = "https://cdn2.thecatapi.com/images/a.jpg";
    const URL_B: &str = "https://cdn2.thecatapi.com/images/b.jpg";
    const URL_C: &str = "https://cdn2.thecatapi.com/images/c.jpg";

    fn small() -> ImageCache {
        ImageCache::new(CacheLimits {
            max_entries: 2,
            max_cost: 1024,
        })
    }

    #[test]
    fn test_cache_basic() {
        let cache = small();

        assert!(cache.insert(URL_A, Bytes::from_static(b"jpeg bytes")));
        let data = cache.get(URL_A).unwrap();

        assert_eq!(&data[..], b"jpeg bytes");
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 0);
        assert_eq!(cache.total_cost(), 10);
    }

    #[test]
    fn test_cache_miss() {
        let cache = small();

        assert!(cache.get(URL_A).is_none());
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_cache_eviction() {
        let cache = small();

        cache.insert(URL_A, Bytes::from_static(b"a"));
        cache.insert(URL_B, Bytes::from_static(b"b"));
        assert_eq!(cache.len(), 2);

        cache.insert(URL_C, Bytes::from_static(b"c"));

        // A was least recently used
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions(), 1);
        assert!(!cache.contains(URL_A));
        assert!(cache.contains(URL_B));
        assert!(cache.contains(URL_C));
    }

    #[test]
    fn test_cost_limit() {
        let cache = ImageCache::new(CacheLimits {
            max_entries: 10,
            max_cost: 8,
        });

        assert!(cache.insert(URL_A, Bytes::from_static(b"12345")));
        assert!(cache.insert(URL_B, Bytes::from_static(b"12345")));
        assert!(!cache.contains(URL_A));

        assert!(!cache.insert(URL_C, Bytes::from_static(b"123456789")));
        assert!(cache.contains(URL_B));
        assert_eq!(cache.stats().inserts(), 2);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = small();
        let other = cache.clone();

        cache.insert(URL_A, Bytes::from_static(b"a"));

        assert!(other.get(URL_A).is_some());
        assert_eq!(cache.stats().hits(), 1);
    }

    #[test]
    fn test_cache_purge() {
        let cache = small();

        cache.insert(URL_A, Bytes::from_static(b"a"));
        cache.get(URL_A);
        cache.purge();

        assert!(cache.is_empty());
        assert_eq!(cache.total_cost(), 0);
        assert_eq!(cache.stats().hits(), 0);
    }

    #[test]
    fn test_default_limits() {
        let cache = ImageCache::default();

        assert_eq!(cache.limits().max_entries, 50_000_000);
        assert_eq!(cache.limits().max_cost, 50_000_000);
    }
}
