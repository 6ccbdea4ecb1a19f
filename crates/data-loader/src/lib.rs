//! # Data Loader Crate
//!
//! This crate loads the precomputed content-similarity dataset: the movie
//! catalog and the N x N similarity matrix that the recommender reads.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, SimilarityMatrix, DatasetStore)
//! - **parser**: Parse movies.dat and similarity.bin into Rust structs
//! - **index**: Load, validate and index the dataset
//! - **error**: Error types for loading and lookups
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DatasetStore;
//! use std::path::Path;
//!
//! // Load once at startup
//! let store = DatasetStore::load_from_dir(Path::new("data"))?;
//!
//! // Query
//! let idx = store.resolve_index("Avatar")?;
//! let row = store.row_at(idx);
//! println!("{} has {} neighbours", store.title_at(idx), row.len() - 1);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, NotFoundError, Result};
pub use index::{CATALOG_FILE, SIMILARITY_FILE};
pub use types::{
    // Type aliases
    CatalogIndex,
    MovieId,
    // Core types
    DatasetStore,
    MovieRecord,
    SimilarityMatrix,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> DatasetStore {
        let catalog = ["A", "B", "A", "C"]
            .iter()
            .enumerate()
            .map(|(i, title)| MovieRecord {
                index: 99,
                movie_id: 100 + i as MovieId,
                title: title.to_string(),
            })
            .collect();

        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.2, 0.9, 0.1],
            vec![0.2, 1.0, 0.4, 0.3],
            vec![0.9, 0.4, 1.0, 0.5],
            vec![0.1, 0.3, 0.5, 1.0],
        ])
        .unwrap();

        DatasetStore::from_parts(catalog, matrix).unwrap()
    }

    #[test]
    fn test_indices_follow_catalog_order() {
        let store = create_test_store();

        for (position, movie) in store.catalog().iter().enumerate() {
            assert_eq!(movie.index, position);
        }
    }

    #[test]
    fn test_resolve_index_first_match() {
        let store = create_test_store();

        assert_eq!(store.resolve_index("A"), Ok(0));
        assert_eq!(store.resolve_index("C"), Ok(3));
    }

    #[test]
    fn test_resolve_index_is_case_sensitive() {
        let store = create_test_store();

        assert_eq!(
            store.resolve_index("a"),
            Err(NotFoundError::Title("a".to_string()))
        );
    }

    #[test]
    fn test_index_of_id() {
        let store = create_test_store();

        assert_eq!(store.index_of_id(102), Ok(2));
        assert_eq!(store.index_of_id(7), Err(NotFoundError::MovieId(7)));
    }

    #[test]
    fn test_list_titles_and_title_at() {
        let store = create_test_store();

        assert_eq!(store.list_titles(), vec!["A", "B", "A", "C"]);
        assert_eq!(store.title_at(1), "B");
        assert!(store.movie(4).is_none());
    }

    #[test]
    fn test_similarity_row() {
        let store = create_test_store();

        assert_eq!(store.similarity_row(2), Some(&[0.9, 0.4, 1.0, 0.5][..]));
        assert!(store.similarity_row(4).is_none());
        assert_eq!(store.similarity(3, 2), Some(0.5));
    }

    #[test]
    fn test_row_at_matches_similarity_row() {
        let store = create_test_store();

        for index in 0..store.len() {
            assert_eq!(Some(store.row_at(index)), store.similarity_row(index));
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_row_at_out_of_range_panics() {
        let store = create_test_store();
        store.row_at(4);
    }

    #[test]
    fn test_mismatched_matrix_is_rejected() {
        let catalog = vec![
            MovieRecord { index: 0, movie_id: 1, title: "A".to_string() },
            MovieRecord { index: 1, movie_id: 2, title: "B".to_string() },
        ];
        let matrix = SimilarityMatrix::from_flat(1, vec![1.0]).unwrap();

        let err = DatasetStore::from_parts(catalog, matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::DimensionMismatch { catalog: 2, .. }));
    }
}
