//! # katzecache
//!
//! In-memory image cache for the Katze client.
//!
//! ## Architecture
//! - **HashMap**: AHash keyed lookups (O(1))
//! - **LRU List**: index-linked list for promotion and eviction (O(1))
//! - **Limits**: entry count and total byte cost, whichever binds first

#![warn(missing_docs)]

mod cache;
mod lru;
mod stats;

pub use cache::{CacheLimits, ImageCache};
pub use lru::LruCache;
pub use stats::{CacheStats, StatsSnapshot};
