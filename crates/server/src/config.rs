use anyhow::Context;
use posters::{OmdbPosterClient, PlaceholderPosterFetcher, PosterFetcher};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// OMDb API key; posters fall back to the placeholder when unset
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Directory holding movies.dat and similarity.bin
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Per-poster lookup timeout in milliseconds
    #[serde(default = "default_poster_timeout_ms")]
    pub poster_timeout_ms: u64,

    /// Number of recommendations when the caller does not specify one
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,
}

fn default_omdb_api_url() -> String {
    posters::omdb::DEFAULT_OMDB_URL.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_poster_timeout_ms() -> u64 {
    3000
}

fn default_recommendations() -> usize {
    recommender::DEFAULT_K
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<AppConfig>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn poster_timeout(&self) -> Duration {
        Duration::from_millis(self.poster_timeout_ms)
    }

    /// Build the poster fetcher this configuration describes
    pub fn poster_fetcher(&self) -> anyhow::Result<Arc<dyn PosterFetcher>> {
        match self.omdb_api_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => {
                let client = OmdbPosterClient::with_options(
                    key,
                    self.omdb_api_url.clone(),
                    self.poster_timeout(),
                )
                .context("Failed to build OMDb client")?;
                Ok(Arc::new(client))
            }
            None => {
                warn!("OMDB_API_KEY not set, posters will use the placeholder image");
                Ok(Arc::new(PlaceholderPosterFetcher))
            }
        }
    }
}
