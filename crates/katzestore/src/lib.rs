//! # katzestore
//!
//! Local persistence for the Katze client.
//!
//! ## Contents
//! - `CatRecord`: the value object returned by the image search API
//! - `KvStore`: named JSON slots kept in one file, written through on every change
//! - `Favorites`: the user's favorites list mirrored to a `KvStore` slot

#![warn(missing_docs)]

mod error;
mod favorites;
mod model;
mod storage;

pub use error::{Error, Result};
pub use favorites::{Favorites, FAVORITES_KEY};
pub use model::{ApiErrorBody, CatRecord};
pub use storage::KvStore;
