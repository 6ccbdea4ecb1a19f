//! Similarity Recommender - Top-K nearest neighbours
//!
//! Ranks every other movie in the catalog by its precomputed similarity to
//! the queried movie.
//!
//! ## Algorithm
//! 1. Resolve the query title to its catalog index
//! 2. Read that row of the similarity matrix as (index, score) pairs
//! 3. Drop the query's own index from the candidates
//! 4. Order by score descending, ties by ascending index
//! 5. Keep the first `k` and map them back to titles
//!
//! The query is removed by index before ranking rather than by skipping the
//! first ranked entry, so a neighbour that ties or beats the self-similarity
//! is still returned and the query never is.

use crate::types::{DEFAULT_K, Neighbor, Recommendation};
use data_loader::{CatalogIndex, DatasetStore, MovieId, NotFoundError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Content-based recommender over an immutable `DatasetStore`
///
/// Cloning is cheap: the store is shared through an `Arc`.
#[derive(Debug, Clone)]
pub struct SimilarityRecommender {
    /// Shared reference to the dataset
    store: Arc<DatasetStore>,

    /// Number of neighbours returned by `recommend_default`
    default_k: usize,
}

impl SimilarityRecommender {
    /// Create a new recommender
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self {
            store,
            default_k: DEFAULT_K,
        }
    }

    /// Configure the neighbour count used by `recommend_default` (default: 5)
    pub fn with_default_k(mut self, k: usize) -> Self {
        self.default_k = k;
        self
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    /// Titles of the `k` movies most similar to `title`, best match first
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<String>, NotFoundError> {
        Ok(self
            .recommend_scored(title, k)?
            .into_iter()
            .map(|r| r.title)
            .collect())
    }

    /// `recommend` with the configured default count
    pub fn recommend_default(&self, title: &str) -> Result<Vec<String>, NotFoundError> {
        self.recommend(title, self.default_k)
    }

    /// Like `recommend`, but keeps the index, id and score of each neighbour
    #[instrument(skip(self))]
    pub fn recommend_scored(
        &self,
        title: &str,
        k: usize,
    ) -> Result<Vec<Recommendation>, NotFoundError> {
        let index = self.store.resolve_index(title)?;
        Ok(self.recommend_for_index(index, k))
    }

    /// Neighbours of the movie with the given upstream id
    #[instrument(skip(self))]
    pub fn recommend_by_id(
        &self,
        movie_id: MovieId,
        k: usize,
    ) -> Result<Vec<Recommendation>, NotFoundError> {
        let index = self.store.index_of_id(movie_id)?;
        Ok(self.recommend_for_index(index, k))
    }

    /// Rank the similarity row of catalog entry `index`
    ///
    /// `index` must come from a store lookup, so it always has a row.
    pub(crate) fn recommend_for_index(&self, index: CatalogIndex, k: usize) -> Vec<Recommendation> {
        let neighbors = top_k(self.store.row_at(index), index, k);
        debug!(
            "Ranked {} neighbours for '{}'",
            neighbors.len(),
            self.store.title_at(index)
        );

        neighbors
            .into_iter()
            .map(|n| {
                let movie = &self.store.catalog()[n.index];
                Recommendation {
                    index: n.index,
                    movie_id: movie.movie_id,
                    title: movie.title.clone(),
                    score: n.score,
                }
            })
            .collect()
    }
}

/// Select the `k` best entries of `row`, excluding position `exclude`
///
/// Partitions with `select_nth_unstable_by` and only sorts the kept prefix,
/// which is cheap when `k` is much smaller than the catalog.
pub(crate) fn top_k(row: &[f32], exclude: CatalogIndex, k: usize) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Neighbor> = row
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != exclude)
        .map(|(index, &score)| Neighbor { index, score })
        .collect();

    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, Neighbor::rank_cmp);
        candidates.truncate(k);
    }
    candidates.sort_by(Neighbor::rank_cmp);
    candidates
}
