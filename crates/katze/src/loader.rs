//! Get-or-fetch image loading through the shared image cache

use std::sync::Arc;

use bytes::Bytes;
use katzecache::ImageCache;
use tracing::debug;

use crate::api::{encode_image_url, CatApi, Result};

/// Loads images, answering repeat requests for a URL from memory
pub struct ImageLoader<A> {
    api: Arc<A>,
    cache: ImageCache,
}

impl<A: CatApi> ImageLoader<A> {
    pub fn new(api: Arc<A>, cache: ImageCache) -> Self {
        Self { api, cache }
    }

    /// Return the image at `raw_url`, downloading it only on a cache miss.
    ///
    /// The percent-encoded form of `raw_url` is both the request URL and the
    /// cache key.
    pub async fn load(&self, raw_url: &str) -> Result<Bytes> {
        let url = encode_image_url(raw_url)?;
        if let Some(bytes) = self.cache.get(url.as_str()) {
            debug!(url = %url, size = bytes.len(), "image cache hit");
            return Ok(bytes);
        }

        let bytes = self.api.fetch_image(&url).await?;
        let kept = self.cache.insert(url.as_str(), bytes.clone());
        debug!(url = %url, size = bytes.len(), kept, "image fetched");
        Ok(bytes)
    }

    /// Empty the image cache
    pub fn purge(&self) {
        self.cache.purge();
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }
}
