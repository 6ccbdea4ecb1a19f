//! # Recommendation Orchestrator
//!
//! This module wires the pieces of a "more like this" request together:
//! 1. Rank neighbours of the selected title (CPU-bound, on the blocking pool)
//! 2. Fetch a poster for every neighbour concurrently
//! 3. Return titles, scores and poster URLs in ranked order
//!
//! Ranking failures (an unknown title) are returned to the caller; poster
//! failures never are, they degrade to the placeholder image.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument};

use data_loader::{DatasetStore, MovieId};
use posters::{PosterFetcher, fetch_posters};
use recommender::SimilarityRecommender;

/// Default time allowed for each poster lookup
pub const DEFAULT_POSTER_TIMEOUT: Duration = Duration::from_secs(3);

/// Final recommendation returned to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
    /// Empty when posters were not requested
    #[serde(skip_serializing_if = "String::is_empty")]
    pub poster_url: String,
}

/// Coordinates the recommender and the poster service
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<DatasetStore>,
    recommender: SimilarityRecommender,
    posters: Arc<dyn PosterFetcher>,
    poster_timeout: Duration,
}

impl RecommendationOrchestrator {
    /// Create a new orchestrator over a loaded dataset
    ///
    /// # Arguments
    /// * `store` - Shared, already validated dataset
    /// * `posters` - Poster lookup implementation (OMDb, placeholder, or a test double)
    pub fn new(store: Arc<DatasetStore>, posters: Arc<dyn PosterFetcher>) -> Self {
        let recommender = SimilarityRecommender::new(store.clone());
        Self {
            store,
            recommender,
            posters,
            poster_timeout: DEFAULT_POSTER_TIMEOUT,
        }
    }

    /// Configure the per-poster timeout (default: 3s)
    pub fn with_poster_timeout(mut self, timeout: Duration) -> Self {
        self.poster_timeout = timeout;
        self
    }

    /// Configure the number of recommendations used by `get_default_recommendations`
    pub fn with_default_k(mut self, k: usize) -> Self {
        self.recommender = self.recommender.with_default_k(k);
        self
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    pub fn recommender(&self) -> &SimilarityRecommender {
        &self.recommender
    }

    /// All catalog titles in order, for populating a selection list
    pub fn list_titles(&self) -> Vec<&str> {
        self.store.list_titles()
    }

    /// Main entry point: recommendations with posters for a title
    ///
    /// # Returns
    /// Up to `limit` recommendations, most similar first. Fails with a
    /// `data_loader::NotFoundError` (reachable via `downcast_ref`) when the
    /// title is not in the catalog.
    #[instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();

        // Rank on the blocking pool so large rows don't stall the runtime
        let ranked = tokio::task::spawn_blocking({
            let recommender = self.recommender.clone();
            let title = title.to_string();
            move || recommender.recommend_scored(&title, limit)
        })
        .await
        .context("Ranking task failed")??;
        info!("Ranked {} neighbours for '{}'", ranked.len(), title);

        let titles: Vec<String> = ranked.iter().map(|r| r.title.clone()).collect();
        let poster_urls = fetch_posters(self.posters.clone(), &titles, self.poster_timeout).await;

        let recommendations: Vec<MovieRecommendation> = ranked
            .into_iter()
            .zip(poster_urls)
            .map(|(rec, poster_url)| MovieRecommendation {
                movie_id: rec.movie_id,
                title: rec.title,
                score: rec.score,
                poster_url,
            })
            .collect();

        info!(
            "Total time to get recommendations for '{}': {:.2?}",
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// `get_recommendations` with the configured default count
    pub async fn get_default_recommendations(&self, title: &str) -> Result<Vec<MovieRecommendation>> {
        self.get_recommendations(title, self.recommender.default_k()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MovieRecord, NotFoundError, SimilarityMatrix};
    use posters::{PLACEHOLDER_POSTER_URL, PlaceholderPosterFetcher};

    struct StaticPosterFetcher;

    #[async_trait::async_trait]
    impl PosterFetcher for StaticPosterFetcher {
        async fn fetch_poster(&self, title: &str) -> String {
            format!("https://img.example/{}.jpg", title.to_lowercase())
        }
    }

    fn create_test_store() -> Arc<DatasetStore> {
        let catalog = ["Avatar", "Spectre", "Tangled", "Up"]
            .iter()
            .enumerate()
            .map(|(index, title)| MovieRecord {
                index,
                movie_id: 10 + index as MovieId,
                title: title.to_string(),
            })
            .collect();

        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.4, 0.2, 0.1],
            vec![0.4, 1.0, 0.1, 0.0],
            vec![0.2, 0.1, 1.0, 0.8],
            vec![0.1, 0.0, 0.8, 1.0],
        ])
        .unwrap();

        Arc::new(DatasetStore::from_parts(catalog, matrix).unwrap())
    }

    #[tokio::test]
    async fn test_recommendations_have_posters() {
        let orchestrator =
            RecommendationOrchestrator::new(create_test_store(), Arc::new(StaticPosterFetcher));

        let recs = orchestrator.get_recommendations("Tangled", 2).await.unwrap();

        assert_eq!(
            recs,
            vec![
                MovieRecommendation {
                    movie_id: 13,
                    title: "Up".to_string(),
                    score: 0.8,
                    poster_url: "https://img.example/up.jpg".to_string(),
                },
                MovieRecommendation {
                    movie_id: 10,
                    title: "Avatar".to_string(),
                    score: 0.2,
                    poster_url: "https://img.example/avatar.jpg".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_title_is_not_found() {
        let orchestrator =
            RecommendationOrchestrator::new(create_test_store(), Arc::new(PlaceholderPosterFetcher));

        let err = orchestrator
            .get_recommendations("Nope", 5)
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<NotFoundError>(),
            Some(&NotFoundError::Title("Nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_default_count_and_placeholder() {
        let orchestrator =
            RecommendationOrchestrator::new(create_test_store(), Arc::new(PlaceholderPosterFetcher))
                .with_default_k(2);

        let recs = orchestrator.get_default_recommendations("Avatar").await.unwrap();

        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.poster_url == PLACEHOLDER_POSTER_URL));
    }

    #[test]
    fn test_list_titles() {
        let orchestrator =
            RecommendationOrchestrator::new(create_test_store(), Arc::new(PlaceholderPosterFetcher));

        assert_eq!(orchestrator.list_titles(), vec!["Avatar", "Spectre", "Tangled", "Up"]);
    }
}
