//! # Recommender Crate
//!
//! Content-based "more like this" recommendations over the precomputed
//! similarity matrix held by a `DatasetStore`.
//!
//! Everything here is a pure, synchronous computation over immutable data:
//! no I/O, no locking, no mutation. A single `Arc<DatasetStore>` can back any
//! number of concurrent callers.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DatasetStore;
//! use recommender::SimilarityRecommender;
//! use std::sync::Arc;
//!
//! let store = Arc::new(DatasetStore::load_from_dir("data".as_ref())?);
//! let recommender = SimilarityRecommender::new(store);
//!
//! for title in recommender.recommend("Avatar", 5)? {
//!     println!("{title}");
//! }
//! ```

pub mod similarity;
pub mod types;

pub use similarity::SimilarityRecommender;
pub use types::{DEFAULT_K, Recommendation};

use data_loader::{DatasetStore, NotFoundError};

/// Titles of the `k` movies most similar to `title`, best match first.
///
/// Returns exactly `min(k, N - 1)` titles and never the queried movie
/// itself. Fails only when `title` is not in the catalog.
pub fn recommend(store: &DatasetStore, title: &str, k: usize) -> Result<Vec<String>, NotFoundError> {
    let index = store.resolve_index(title)?;

    Ok(similarity::top_k(store.row_at(index), index, k)
        .into_iter()
        .map(|n| store.title_at(n.index).to_string())
        .collect())
}
