//! Cat image API client.
//!
//! `CatApi` is the only place HTTP requests are made. The controller and the
//! image loader call through the trait, so tests swap in an in-memory fake.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use katzestore::{ApiErrorBody, CatRecord};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Public API host
pub const DEFAULT_BASE_URL: &str = "https://api.thecatapi.com";

/// Key shipped with the client when none is configured
pub const DEFAULT_API_KEY: &str = "f2211390-de6a-4292-88c1-eca84177c6a0";

/// Per-request timeout for image downloads
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

const SEARCH_PATH: &str = "/v1/images/search";
const API_KEY_HEADER: &str = "x-api-key";
const USER_AGENT: &str = concat!("katze/", env!("CARGO_PKG_VERSION"));

/// Bytes escaped in image URLs: everything outside the URL query-allowed set
/// (ASCII alphanumerics and `!$&'()*+,-./:;=?@_~`). Non-ASCII is always escaped.
const QUERY_ESCAPED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Ways a fetch can fail
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request timed out
    #[error("request timed out")]
    Timeout,

    /// Transport or HTTP failure
    #[error("request failed: {0}")]
    Error(String),

    /// The API answered with its error object instead of records
    #[error("API error {status}: {message}")]
    Decoding {
        /// Message from the error object
        message: String,
        /// Status from the error object
        status: i64,
    },

    /// The search URL could not be built
    #[error("could not encode request URL: {0}")]
    Encoding(String),

    /// The body was empty or matched neither response shape
    #[error("unparseable response body")]
    Parsing,

    /// The image URL string was empty
    #[error("invalid image URL {0:?}")]
    InvalidPercentEncoding(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Error(err.to_string())
        }
    }
}

/// Access to the cat image API.
///
/// Uses return-position `impl Future` so implementations can be plain
/// `async fn`s; the trait is therefore used through generics, not `dyn`.
pub trait CatApi: Send + Sync {
    /// Fetch one page of records in ascending order.
    fn fetch_page(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<CatRecord>>> + Send;

    /// Download the raw bytes of an already encoded image URL.
    fn fetch_image(&self, url: &Url) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Connection settings for `HttpCatApi`
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme and host of the API, e.g. `https://api.thecatapi.com`
    pub base_url: String,
    /// Value sent in the `x-api-key` header
    pub api_key: String,
    /// Timeout applied to each image download
    pub image_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }
}

/// `CatApi` over HTTPS using reqwest
pub struct HttpCatApi {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    image_timeout: Duration,
}

impl HttpCatApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Error(format!("failed to build HTTP client: {}", e)))?;
        Self::with_client(client, config)
    }

    /// Use a preconfigured client, e.g. one without proxy settings
    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Result<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| FetchError::Encoding(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            image_timeout: config.image_timeout,
        })
    }

    /// URL of the search endpoint for one page
    pub fn search_url(&self, page: u32, limit: u32) -> Result<Url> {
        search_url(&self.base_url, page, limit)
    }
}

impl CatApi for HttpCatApi {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<CatRecord>> {
        let url = self.search_url(page, limit)?;
        // Status is not checked: error responses carry the error object
        let body = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .bytes()
            .await?;
        decode_page(&body)
    }

    async fn fetch_image(&self, url: &Url) -> Result<Bytes> {
        let bytes = self
            .client
            .get(url.clone())
            .timeout(self.image_timeout)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        if bytes.is_empty() {
            return Err(FetchError::Error(format!("empty image body from {}", url)));
        }
        Ok(bytes)
    }
}

/// Build `{base}/v1/images/search?page={page}&limit={limit}&order=Asc`
pub fn search_url(base: &Url, page: u32, limit: u32) -> Result<Url> {
    if base.cannot_be_a_base() {
        return Err(FetchError::Encoding(format!("{} cannot be a base URL", base)));
    }
    let mut url = base
        .join(SEARCH_PATH)
        .map_err(|e| FetchError::Encoding(e.to_string()))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("page", &page.to_string())
        .append_pair("limit", &limit.to_string())
        .append_pair("order", "Asc");
    Ok(url)
}

/// Interpret a search response body.
///
/// A record array (possibly short or empty) is success; the API's error
/// object maps to `Decoding`; anything else is `Parsing`.
pub fn decode_page(body: &[u8]) -> Result<Vec<CatRecord>> {
    if body.is_empty() {
        return Err(FetchError::Parsing);
    }
    if let Ok(records) = serde_json::from_slice::<Vec<CatRecord>>(body) {
        return Ok(records);
    }
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(err) => Err(FetchError::Decoding {
            message: err.message,
            status: err.status,
        }),
        Err(_) => Err(FetchError::Parsing),
    }
}

/// Percent-encode a raw image URL string.
///
/// Every byte outside the query-allowed set is escaped, `%` included, so
/// `#` and `\` stay part of the path instead of being reinterpreted by the
/// URL parser. The resulting string is both the request URL and the image
/// cache key.
pub fn encode_image_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(FetchError::InvalidPercentEncoding(raw.to_string()));
    }
    let encoded = utf8_percent_encode(raw, QUERY_ESCAPED).to_string();
    let url = Url::parse(&encoded)
        .map_err(|e| FetchError::Error(format!("invalid image URL {:?}: {}", encoded, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::Error(format!("unsupported scheme {:?}", other))),
    }
}
