//! Records exchanged with the cat image API

use serde::{Deserialize, Serialize};

/// A single cat image as listed by the search endpoint.
///
/// Equality is structural: two records are equal only when all four
/// fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatRecord {
    /// Image identifier assigned by the API
    pub id: String,
    /// Full image URL
    #[serde(rename = "url")]
    pub image_url: String,
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl CatRecord {
    /// Create a record
    pub fn new(id: impl Into<String>, image_url: impl Into<String>, width: i64, height: i64) -> Self {
        Self {
            id: id.into(),
            image_url: image_url.into(),
            width,
            height,
        }
    }
}

/// Error object the API returns instead of a record array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human readable message
    pub message: String,
    /// HTTP-like status code
    pub status: i64,
    /// Severity label
    pub level: String,
}
