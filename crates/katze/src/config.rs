//! Runtime settings: command line and environment over an optional TOML file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use katzecache::CacheLimits;
use serde::Deserialize;

use crate::api::{ApiConfig, DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_IMAGE_TIMEOUT};
use crate::controller::DEFAULT_PAGE_LIMIT;

const DEFAULT_DATA_DIR: &str = "./data";

/// Options shared by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Data directory holding the favorites store
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// TOML file with defaults for any of these options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API key sent with search requests
    #[arg(long, env = "KATZE_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "KATZE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Records per page
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Image cache entry limit
    #[arg(long, global = true)]
    pub cache_count: Option<usize>,

    /// Image cache byte limit
    #[arg(long, global = true)]
    pub cache_cost: Option<usize>,

    /// Image download timeout in seconds
    #[arg(long, global = true)]
    pub image_timeout_secs: Option<u64>,
}

/// Contents of the `--config` file; every key is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub data: Option<PathBuf>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub limit: Option<u32>,
    pub cache_count: Option<usize>,
    pub cache_cost: Option<usize>,
    pub image_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub api: ApiConfig,
    pub limit: u32,
    pub cache: CacheLimits,
}

impl GlobalArgs {
    /// Merge flags, the config file named by `--config`, and defaults
    pub fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(&self, file: FileConfig) -> Result<Settings> {
        let defaults = CacheLimits::default();
        let limit = self.limit.or(file.limit).unwrap_or(DEFAULT_PAGE_LIMIT);
        let cache = CacheLimits {
            max_entries: self
                .cache_count
                .or(file.cache_count)
                .unwrap_or(defaults.max_entries),
            max_cost: self
                .cache_cost
                .or(file.cache_cost)
                .unwrap_or(defaults.max_cost),
        };

        anyhow::ensure!(limit > 0, "limit must be greater than 0");
        anyhow::ensure!(
            cache.max_entries > 0 && cache.max_cost > 0,
            "cache limits must be greater than 0"
        );

        let image_timeout = self
            .image_timeout_secs
            .or(file.image_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IMAGE_TIMEOUT);

        Ok(Settings {
            data_dir: self
                .data
                .clone()
                .or(file.data)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            api: ApiConfig {
                base_url: self
                    .base_url
                    .clone()
                    .or(file.base_url)
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                api_key: self
                    .api_key
                    .clone()
                    .or(file.api_key)
                    .unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
                image_timeout,
            },
            limit,
            cache,
        })
    }
}
