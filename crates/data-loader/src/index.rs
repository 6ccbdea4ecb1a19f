//! DatasetStore loading, validation and index building.
//!
//! Loading reads the catalog and the similarity matrix in parallel, then
//! checks that they describe the same index space before any query can run:
//! - catalog length == matrix rows == matrix cols
//! - every score is finite
//! - movie ids are unique

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{info, warn};

/// Catalog file name inside a dataset directory
pub const CATALOG_FILE: &str = "movies.dat";

/// Similarity matrix file name inside a dataset directory
pub const SIMILARITY_FILE: &str = "similarity.bin";

impl DatasetStore {
    /// Load the dataset from a directory holding movies.dat and similarity.bin
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        Self::load(&data_dir.join(CATALOG_FILE), &data_dir.join(SIMILARITY_FILE))
    }

    /// Load the dataset from explicit catalog and similarity paths
    ///
    /// Both files are parsed in parallel with `rayon::join`; all validation
    /// happens here so a returned store is always consistent.
    pub fn load(catalog_path: &Path, similarity_path: &Path) -> Result<Self> {
        info!(
            catalog = %catalog_path.display(),
            similarity = %similarity_path.display(),
            "Loading similarity dataset"
        );

        let (catalog, similarity) = rayon::join(
            || parser::parse_catalog(catalog_path),
            || parser::parse_similarity(similarity_path),
        );
        let catalog = catalog?;
        let similarity = similarity?;

        let store = Self::from_parts(catalog, similarity)?;
        info!(movies = store.len(), "Dataset loaded and validated");
        Ok(store)
    }

    /// Check dimensions and score values
    pub(crate) fn validate(&self) -> Result<()> {
        if self.catalog.is_empty() {
            return Err(DataLoadError::ValidationError(
                "catalog is empty".to_string(),
            ));
        }

        let size = self.similarity.size();
        if size != self.catalog.len() {
            return Err(DataLoadError::DimensionMismatch {
                catalog: self.catalog.len(),
                rows: size,
                cols: size,
            });
        }

        // Scan rows in parallel; report the lowest offending position
        let bad = self
            .similarity
            .as_slice()
            .par_chunks(size)
            .enumerate()
            .filter_map(|(i, row)| row.iter().position(|s| !s.is_finite()).map(|j| (i, j)))
            .min();

        if let Some((i, j)) = bad {
            return Err(DataLoadError::InvalidValue {
                field: format!("similarity[{}][{}]", i, j),
                value: self.similarity.get(i, j).unwrap_or(f32::NAN).to_string(),
            });
        }

        Ok(())
    }

    /// Build the title and id lookup tables
    ///
    /// Titles keep their first occurrence; ids must be unique.
    pub(crate) fn build_indices(&mut self) -> Result<()> {
        let mut duplicate_titles = 0usize;

        for movie in &self.catalog {
            match self.id_index.entry(movie.movie_id) {
                Entry::Occupied(_) => {
                    return Err(DataLoadError::DuplicateId {
                        id: movie.movie_id,
                        index: movie.index,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(movie.index);
                }
            }

            match self.title_index.entry(movie.title.clone()) {
                Entry::Occupied(_) => duplicate_titles += 1,
                Entry::Vacant(slot) => {
                    slot.insert(movie.index);
                }
            }
        }

        if duplicate_titles > 0 {
            warn!(
                duplicate_titles,
                "Catalog contains repeated titles; lookups resolve to the first occurrence"
            );
        }

        Ok(())
    }
}
