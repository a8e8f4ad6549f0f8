//! Ladder API client.
//!
//! Performs the three read-only lookups the pipeline needs against the
//! Riot Games endpoints. The account lookup goes to the regional host,
//! summoner and league lookups go to the platform host. Every request
//! carries the API key in the `X-Riot-Token` header, never in the URL, and
//! transport errors are stripped of their URL before they are reported.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::models::{Account, Puuid, RankedEntry, SummonerId, SummonerRecord};

#[cfg(test)]
pub mod fake;

/// Errors that can occur during a single lookup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The lookups the identity chain and the ranked fetcher depend on.
#[async_trait]
pub trait LadderApi: Send + Sync {
    /// Riot ID (`name#tag`) to account record.
    async fn account_by_riot_id(&self, name: &str, tag: &str) -> Result<Account, ClientError>;

    /// puuid to platform summoner record.
    async fn summoner_by_puuid(&self, puuid: &Puuid) -> Result<SummonerRecord, ClientError>;

    /// All queue entries for a summoner.
    async fn entries_by_summoner(
        &self,
        summoner_id: &SummonerId,
    ) -> Result<Vec<RankedEntry>, ClientError>;
}

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-riot-token";

/// Configuration for the HTTP client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Host serving account lookups (e.g. `https://americas.api.riotgames.com`)
    pub regional_url: Url,

    /// Host serving summoner and league lookups (e.g. `https://la1.api.riotgames.com`)
    pub platform_url: Url,

    pub api_key: String,

    /// Request timeout; a request that exceeds it fails with `ClientError::Http`
    pub timeout: Duration,

    pub user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("regional_url", &self.regional_url)
            .field("platform_url", &self.platform_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Build a client configuration from the `[api]` config section and a resolved key.
    pub fn from_api_config(api: &ApiConfig, api_key: String) -> Result<Self, ClientError> {
        let parse = |s: &str| Url::parse(s).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", s, e)));

        Ok(Self {
            regional_url: parse(&api.regional_url)?,
            platform_url: parse(&api.platform_url)?,
            api_key,
            timeout: Duration::from_secs(api.timeout_seconds),
            user_agent: format!("ladder-watch/{}", env!("CARGO_PKG_VERSION")),
        })
    }
}

/// reqwest-backed [`LadderApi`].
pub struct LadderClient {
    client: Client,
    config: ClientConfig,
}

impl LadderClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("ladder-watch")),
        );

        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| ClientError::InvalidApiKey)?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    fn account_url(&self, name: &str, tag: &str) -> Result<Url, ClientError> {
        build_url(
            &self.config.regional_url,
            &["riot", "account", "v1", "accounts", "by-riot-id", name, tag],
        )
    }

    fn summoner_url(&self, puuid: &Puuid) -> Result<Url, ClientError> {
        build_url(
            &self.config.platform_url,
            &["lol", "summoner", "v4", "summoners", "by-puuid", puuid.as_str()],
        )
    }

    fn entries_url(&self, summoner_id: &SummonerId) -> Result<Url, ClientError> {
        build_url(
            &self.config.platform_url,
            &["lol", "league", "v4", "entries", "by-summoner", summoner_id.as_str()],
        )
    }

    /// GET a URL and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!("GET {}{}", url.host_str().unwrap_or("unknown"), url.path());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(status_error(status, url.path(), retry_after));
        }

        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl LadderApi for LadderClient {
    async fn account_by_riot_id(&self, name: &str, tag: &str) -> Result<Account, ClientError> {
        let url = self.account_url(name, tag)?;
        self.get_json(url).await
    }

    async fn summoner_by_puuid(&self, puuid: &Puuid) -> Result<SummonerRecord, ClientError> {
        let url = self.summoner_url(puuid)?;
        self.get_json(url).await
    }

    async fn entries_by_summoner(
        &self,
        summoner_id: &SummonerId,
    ) -> Result<Vec<RankedEntry>, ClientError> {
        let url = self.entries_url(summoner_id)?;
        self.get_json(url).await
    }
}

/// Append percent-encoded path segments to a base URL.
fn build_url(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a non-success status to a client error.
fn status_error(status: StatusCode, path: &str, retry_after: Option<u64>) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(path.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        },
        _ => ClientError::HttpStatus {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        },
    }
}
