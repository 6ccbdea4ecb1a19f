//! Simple test harness for the recommendation orchestrator.
//!
//! Loads the dataset named by the environment configuration and prints
//! recommendations for the title given as the first argument (or the first
//! title in the catalog).

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use data_loader::DatasetStore;
use server::{AppConfig, RecommendationOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,server=debug,recommender=debug,posters=debug")
                }),
        )
        .init();

    info!("Starting ReelRecs server test harness");
    let config = AppConfig::from_env()?;

    info!("Loading dataset from {}...", config.data_dir.display());
    let store = Arc::new(
        DatasetStore::load_from_dir(&config.data_dir).context("Failed to load similarity dataset")?,
    );
    info!("Dataset loaded: {} movies", store.len());

    let orchestrator = RecommendationOrchestrator::new(store.clone(), config.poster_fetcher()?)
        .with_poster_timeout(config.poster_timeout())
        .with_default_k(config.default_recommendations);

    let title = match std::env::args().nth(1) {
        Some(title) => title,
        None => store.title_at(0).to_string(),
    };

    info!("Getting recommendations for '{}'", title);
    let recommendations = orchestrator.get_default_recommendations(&title).await?;

    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        info!("{}. {} - Score: {:.3}", i + 1, rec.title, rec.score);
        info!("   Poster: {}", rec.poster_url);
    }

    Ok(())
}
