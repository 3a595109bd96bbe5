//! # katze
//!
//! Client for the cat image search API.
//!
//! - `api`: the `CatApi` seam and its reqwest implementation
//! - `loader`: get-or-fetch image loading over `katzecache::ImageCache`
//! - `controller`: paging, images and favorites behind one service object
//! - `feed`: view models for the cats and favorites screens
//! - `config`: command line, environment and TOML settings

pub mod api;
pub mod config;
pub mod controller;
pub mod feed;
pub mod loader;

#[cfg(test)]
mod testing;
