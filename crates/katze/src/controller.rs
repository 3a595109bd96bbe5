//! Cats controller: paging, image loading and favorites behind one service

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use katzecache::ImageCache;
use katzestore::{CatRecord, Favorites};
use tracing::{debug, info, warn};

use crate::api::CatApi;
use crate::loader::ImageLoader;

/// Records requested per page
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Front door for the list screens.
///
/// Failures from the API are logged and reported to callers as "no data".
/// Page requests are not deduplicated: two overlapping `fetch_cats` calls
/// both request the current page.
pub struct CatsController<A> {
    api: Arc<A>,
    images: ImageLoader<A>,
    favorites: Favorites,
    /// Next page to request; advances only on success
    page: AtomicU32,
    limit: u32,
}

impl<A: CatApi> CatsController<A> {
    pub fn new(api: Arc<A>, cache: ImageCache, favorites: Favorites, limit: u32) -> Self {
        Self {
            images: ImageLoader::new(Arc::clone(&api), cache),
            api,
            favorites,
            page: AtomicU32::new(0),
            limit,
        }
    }

    /// Fetch the next page of records, or nothing if the request fails
    pub async fn fetch_cats(&self) -> Vec<CatRecord> {
        let page = self.page.load(Ordering::SeqCst);
        match self.api.fetch_page(page, self.limit).await {
            Ok(cats) => {
                self.page.fetch_add(1, Ordering::SeqCst);
                info!(page, count = cats.len(), "fetched page");
                cats
            }
            Err(e) => {
                warn!(page, error = %e, "page fetch failed");
                Vec::new()
            }
        }
    }

    /// Load an image through the cache, or nothing if the request fails
    pub async fn fetch_image(&self, raw_url: &str) -> Option<Bytes> {
        match self.images.load(raw_url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(url = raw_url, error = %e, "image fetch failed");
                None
            }
        }
    }

    pub fn add_favorite(&self, record: CatRecord) -> katzestore::Result<()> {
        debug!(id = %record.id, "adding favorite");
        self.favorites.add(record)
    }

    pub fn remove_favorite(&self, record: &CatRecord) -> katzestore::Result<usize> {
        debug!(id = %record.id, "removing favorite");
        self.favorites.remove(record)
    }

    /// Heart tap: remove if the id is a favorite, add otherwise
    pub fn toggle_favorite(&self, record: CatRecord) -> katzestore::Result<bool> {
        let now = self.favorites.toggle(record)?;
        debug!(favorite = now, "toggled favorite");
        Ok(now)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains_id(id)
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn images(&self) -> &ImageLoader<A> {
        &self.images
    }

    /// Next page that `fetch_cats` will request
    pub fn page(&self) -> u32 {
        self.page.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
