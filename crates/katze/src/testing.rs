//! In-memory `CatApi` for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use katzestore::CatRecord;
use parking_lot::Mutex;
use url::Url;

use crate::api::{CatApi, FetchError, Result};

/// Serves configured pages and images, counting every request
#[derive(Default)]
pub struct FakeApi {
    pages: Mutex<HashMap<u32, Vec<CatRecord>>>,
    timeouts: Mutex<HashSet<u32>>,
    images: Mutex<HashMap<String, Bytes>>,
    page_requests: Mutex<Vec<(u32, u32)>>,
    image_requests: AtomicUsize,
}

impl FakeApi {
    pub fn set_page(&self, page: u32, records: Vec<CatRecord>) {
        self.pages.lock().insert(page, records);
    }

    /// Make requests for `page` time out until it is set again
    pub fn time_out_page(&self, page: u32) {
        self.timeouts.lock().insert(page);
    }

    pub fn clear_timeout(&self, page: u32) {
        self.timeouts.lock().remove(&page);
    }

    /// Serve `body` for the encoded form of `url`
    pub fn add_image(&self, url: &str, body: &[u8]) {
        self.images
            .lock()
            .insert(url.to_string(), Bytes::copy_from_slice(body));
    }

    /// Every `(page, limit)` requested so far
    pub fn page_requests(&self) -> Vec<(u32, u32)> {
        self.page_requests.lock().clone()
    }

    pub fn image_requests(&self) -> usize {
        self.image_requests.load(Ordering::SeqCst)
    }
}

impl CatApi for FakeApi {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<CatRecord>> {
        self.page_requests.lock().push((page, limit));
        if self.timeouts.lock().contains(&page) {
            return Err(FetchError::Timeout);
        }
        match self.pages.lock().get(&page) {
            Some(records) => Ok(records.iter().take(limit as usize).cloned().collect()),
            None => Err(FetchError::Decoding {
                message: format!("no page {}", page),
                status: 404,
            }),
        }
    }

    async fn fetch_image(&self, url: &Url) -> Result<Bytes> {
        self.image_requests.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Error(format!("404 for {}", url)))
    }
}

/// `count` records with ids `{prefix}0..`
pub fn records(prefix: &str, count: usize) -> Vec<CatRecord> {
    (0..count)
        .map(|i| {
            CatRecord::new(
                format!("{}{}", prefix, i),
                format!("https://cdn2.thecatapi.com/images/{}{}.jpg", prefix, i),
                640,
                480,
            )
        })
        .collect()
}
