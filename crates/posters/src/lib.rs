//! Poster lookup for recommended titles.
//!
//! This crate is the boundary to the external movie-metadata service. It
//! provides:
//! - The `PosterFetcher` trait, so the service can be swapped or mocked
//! - `OmdbPosterClient`, the HTTP implementation
//! - `PlaceholderPosterFetcher`, for running without an API key
//! - `fetch_posters`, which looks up many titles concurrently
//!
//! A poster lookup never fails from the caller's point of view: network
//! errors, timeouts and missing artwork all turn into
//! `PLACEHOLDER_POSTER_URL`.

pub mod omdb;

pub use omdb::OmdbPosterClient;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Image shown when no poster could be found
pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/300x450?text=No+Poster";

/// Reasons a poster lookup did not produce a URL
#[derive(Error, Debug)]
pub enum PosterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metadata service returned status {0}")]
    Status(u16),

    #[error("Invalid response from metadata service: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("No poster available: {0}")]
    MissingPoster(String),
}

/// Looks up a poster image URL for a movie title.
///
/// Implementations must always return a URL, falling back to
/// `PLACEHOLDER_POSTER_URL`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterFetcher: Send + Sync {
    async fn fetch_poster(&self, title: &str) -> String;
}

/// Fetcher that never touches the network
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPosterFetcher;

#[async_trait::async_trait]
impl PosterFetcher for PlaceholderPosterFetcher {
    async fn fetch_poster(&self, _title: &str) -> String {
        PLACEHOLDER_POSTER_URL.to_string()
    }
}

/// Fetch posters for every title concurrently.
///
/// Each lookup runs in its own task with its own `timeout`; a lookup that
/// times out or panics gets the placeholder without affecting the others.
/// The output is in the same order as `titles`.
pub async fn fetch_posters(
    fetcher: Arc<dyn PosterFetcher>,
    titles: &[String],
    timeout: Duration,
) -> Vec<String> {
    let handles: Vec<_> = titles
        .iter()
        .cloned()
        .map(|title| {
            let fetcher = fetcher.clone();
            tokio::spawn(async move {
                match tokio::time::timeout(timeout, fetcher.fetch_poster(&title)).await {
                    Ok(url) => url,
                    Err(_) => {
                        warn!(title = %title, ?timeout, "Poster lookup timed out");
                        PLACEHOLDER_POSTER_URL.to_string()
                    }
                }
            })
        })
        .collect();

    let mut posters = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(url) => posters.push(url),
            Err(e) => {
                warn!(error = %e, "Poster task failed");
                posters.push(PLACEHOLDER_POSTER_URL.to_string());
            }
        }
    }
    posters
}
