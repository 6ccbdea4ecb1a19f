//! OMDb poster lookup.
//!
//! API flow: `GET {base_url}?apikey={key}&t={title}` returns a JSON object
//! whose `Poster` field holds an image URL, or `"N/A"` when OMDb knows the
//! movie but has no artwork.

use crate::{PLACEHOLDER_POSTER_URL, PosterError, PosterFetcher};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default OMDb endpoint
pub const DEFAULT_OMDB_URL: &str = "http://www.omdbapi.com/";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Poster fetcher backed by the OMDb HTTP API
#[derive(Clone)]
pub struct OmdbPosterClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbPosterClient {
    /// Create a client with the default endpoint and timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, PosterError> {
        Self::with_options(api_key, DEFAULT_OMDB_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client against a specific endpoint with a per-request timeout
    pub fn with_options(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PosterError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            api_url: api_url.into(),
        })
    }

    /// Look up the poster URL for `title`, reporting why it failed
    #[instrument(skip(self))]
    pub async fn try_fetch_poster(&self, title: &str) -> Result<String, PosterError> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("apikey", self.api_key.as_str()), ("t", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PosterError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        poster_from_body(&body)
    }
}

/// Extract a usable poster URL from an OMDb response body
pub fn poster_from_body(body: &str) -> Result<String, PosterError> {
    let response: OmdbResponse = serde_json::from_str(body)?;

    match response.poster {
        Some(url) if !url.is_empty() && url != "N/A" => Ok(url),
        _ => Err(PosterError::MissingPoster(
            response.error.unwrap_or_else(|| "no poster field".to_string()),
        )),
    }
}

#[async_trait::async_trait]
impl PosterFetcher for OmdbPosterClient {
    async fn fetch_poster(&self, title: &str) -> String {
        match self.try_fetch_poster(title).await {
            Ok(url) => {
                debug!(title, "Found poster");
                url
            }
            Err(e) => {
                warn!(title, error = %e, "Poster lookup failed, using placeholder");
                PLACEHOLDER_POSTER_URL.to_string()
            }
        }
    }
}
