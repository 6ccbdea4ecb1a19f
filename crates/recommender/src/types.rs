//! Result types produced by the recommender.

use data_loader::{CatalogIndex, MovieId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of neighbours returned when the caller does not ask for a count
pub const DEFAULT_K: usize = 5;

/// A ranked neighbour of the queried movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Catalog position of the neighbour
    pub index: CatalogIndex,
    pub movie_id: MovieId,
    pub title: String,
    /// Similarity between the query and this neighbour
    pub score: f32,
}

/// One entry of a similarity row while ranking
#[derive(Debug, Clone, Copy)]
pub(crate) struct Neighbor {
    pub index: CatalogIndex,
    pub score: f32,
}

impl Neighbor {
    /// Ranking order: score descending, then catalog index ascending.
    ///
    /// Scores compare by value, so `-0.0` and `0.0` tie. Stored scores are
    /// always finite, which makes this a total order: any sort or selection
    /// with it gives the same result as a stable descending sort over the
    /// enumerated row.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.index.cmp(&other.index))
    }
}
