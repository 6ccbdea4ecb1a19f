//! Core domain types for the precomputed similarity dataset.
//!
//! The dataset is two positional structures that share one index space:
//! - the catalog, an ordered list of `MovieRecord`
//! - the `SimilarityMatrix`, an N x N grid of scores
//!
//! Row `i` of the matrix describes catalog entry `i`. Both are wrapped in a
//! `DatasetStore` that is built once and then only ever read.

use crate::error::{DataLoadError, NotFoundError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Upstream identifier of a movie (the TMDB id in the shipped dataset)
pub type MovieId = u32;

/// Position of a movie in the catalog, also its row in the similarity matrix
pub type CatalogIndex = usize;

// =============================================================================
// Movie Records
// =============================================================================

/// One entry of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Position in the catalog, assigned once at load time
    pub index: CatalogIndex,
    pub movie_id: MovieId,
    /// User-facing title, also the lookup key
    ///
    /// Not guaranteed unique: lookups resolve to the first match.
    pub title: String,
}

// =============================================================================
// Similarity Matrix
// =============================================================================

/// Square matrix of pairwise similarity scores, stored row-major
///
/// Symmetry is expected from the offline builder but is not enforced here.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build a matrix from a flat row-major buffer of `size * size` scores
    pub fn from_flat(size: usize, scores: Vec<f32>) -> Result<Self> {
        let expected = size.checked_mul(size).ok_or_else(|| {
            DataLoadError::MalformedMatrix(format!("dimension {} overflows", size))
        })?;
        if scores.len() != expected {
            return Err(DataLoadError::MalformedMatrix(format!(
                "expected {} scores for a {}x{} matrix, found {}",
                expected,
                size,
                size,
                scores.len()
            )));
        }
        Ok(Self { size, scores })
    }

    /// Build a matrix from nested rows, rejecting ragged or non-square input
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(DataLoadError::MalformedMatrix(format!(
                    "row {} has {} scores, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            scores.extend(row);
        }
        Ok(Self { size, scores })
    }

    /// Number of rows (equal to the number of columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Similarity of movie `index` to every movie, itself included
    pub fn row(&self, index: CatalogIndex) -> Option<&[f32]> {
        if index >= self.size {
            return None;
        }
        let start = index * self.size;
        Some(&self.scores[start..start + self.size])
    }

    /// Score for a single pair
    pub fn get(&self, i: CatalogIndex, j: CatalogIndex) -> Option<f32> {
        self.row(i).and_then(|row| row.get(j).copied())
    }

    /// Flat row-major view, used by the encoder and validation
    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }
}

// =============================================================================
// DatasetStore - immutable, load-once state
// =============================================================================

/// Catalog plus similarity matrix, validated to share one index space.
///
/// A `DatasetStore` is constructed once (see `load_from_dir` and
/// `from_parts`) and is never mutated afterwards, so it can be wrapped in an
/// `Arc` and read from any number of threads without locking.
#[derive(Debug)]
pub struct DatasetStore {
    pub(crate) catalog: Vec<MovieRecord>,
    pub(crate) similarity: SimilarityMatrix,

    /// First catalog index for each title
    pub(crate) title_index: HashMap<String, CatalogIndex>,
    /// Catalog index for each movie id
    pub(crate) id_index: HashMap<MovieId, CatalogIndex>,
}

impl DatasetStore {
    /// Build a store from in-memory parts.
    ///
    /// Catalog positions are reassigned from the vector order, so callers do
    /// not need to fill `MovieRecord::index` correctly. Fails when the matrix
    /// dimensions do not match the catalog, the catalog is empty, a movie id
    /// repeats, or a score is not finite.
    pub fn from_parts(catalog: Vec<MovieRecord>, similarity: SimilarityMatrix) -> Result<Self> {
        let catalog: Vec<MovieRecord> = catalog
            .into_iter()
            .enumerate()
            .map(|(index, record)| MovieRecord { index, ..record })
            .collect();

        let mut store = Self {
            catalog,
            similarity,
            title_index: HashMap::new(),
            id_index: HashMap::new(),
        };
        store.validate()?;
        store.build_indices()?;
        Ok(store)
    }

    /// Number of movies in the catalog
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Catalog index of the first movie whose title equals `title` exactly
    ///
    /// Matching is case-sensitive.
    pub fn resolve_index(&self, title: &str) -> std::result::Result<CatalogIndex, NotFoundError> {
        self.title_index
            .get(title)
            .copied()
            .ok_or_else(|| NotFoundError::Title(title.to_string()))
    }

    /// Catalog index of the movie with the given upstream id
    pub fn index_of_id(&self, movie_id: MovieId) -> std::result::Result<CatalogIndex, NotFoundError> {
        self.id_index
            .get(&movie_id)
            .copied()
            .ok_or(NotFoundError::MovieId(movie_id))
    }

    /// All titles in catalog order
    pub fn list_titles(&self) -> Vec<&str> {
        self.catalog.iter().map(|m| m.title.as_str()).collect()
    }

    /// Title of the movie at `index`
    ///
    /// # Panics
    /// If `index` is outside the catalog. Indices produced by this store and
    /// its similarity rows are always in range.
    pub fn title_at(&self, index: CatalogIndex) -> &str {
        &self.catalog[index].title
    }

    /// Record at `index`, if any
    pub fn movie(&self, index: CatalogIndex) -> Option<&MovieRecord> {
        self.catalog.get(index)
    }

    /// The whole catalog in order
    pub fn catalog(&self) -> &[MovieRecord] {
        &self.catalog
    }

    /// Similarity row for the movie at `index`
    pub fn similarity_row(&self, index: CatalogIndex) -> Option<&[f32]> {
        self.similarity.row(index)
    }

    /// Similarity row for a catalog index known to be valid
    ///
    /// # Panics
    /// If `index` is outside the catalog. Load validation guarantees one row
    /// per catalog entry, so indices from `resolve_index` or `index_of_id`
    /// always have a row.
    pub fn row_at(&self, index: CatalogIndex) -> &[f32] {
        let size = self.similarity.size();
        assert!(index < size, "catalog index {} out of range ({} movies)", index, size);
        &self.similarity.as_slice()[index * size..(index + 1) * size]
    }

    /// Similarity between two catalog entries
    pub fn similarity(&self, i: CatalogIndex, j: CatalogIndex) -> Option<f32> {
        self.similarity.get(i, j)
    }
}
