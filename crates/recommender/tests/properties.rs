//! Integration tests for the recommender.
//!
//! These run every catalog title through the recommender on a generated
//! dataset and check the ranking guarantees hold for all of them.

use data_loader::{DatasetStore, MovieRecord, SimilarityMatrix};
use rayon::prelude::*;
use recommender::{SimilarityRecommender, recommend};
use std::sync::Arc;

const N: usize = 40;

/// Symmetric matrix with plenty of repeated scores and a unit diagonal
fn create_test_store() -> Arc<DatasetStore> {
    let catalog = (0..N)
        .map(|i| MovieRecord {
            index: i,
            movie_id: 1000 + i as u32,
            title: format!("Movie {i}"),
        })
        .collect();

    let rows = (0..N)
        .map(|i| {
            (0..N)
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        ((i * j + i + j) % 7) as f32 / 7.0
                    }
                })
                .collect()
        })
        .collect();

    let matrix = SimilarityMatrix::from_rows(rows).unwrap();
    Arc::new(DatasetStore::from_parts(catalog, matrix).unwrap())
}

#[test]
fn test_length_is_min_of_k_and_catalog() {
    let store = create_test_store();

    for k in [0, 1, 5, N - 1, N, N + 10] {
        for title in store.list_titles() {
            let recs = recommend(&store, title, k).unwrap();
            assert_eq!(recs.len(), k.min(N - 1), "title {title}, k {k}");
        }
    }
}

#[test]
fn test_never_recommends_query() {
    let store = create_test_store();

    for title in store.list_titles() {
        let recs = recommend(&store, title, N).unwrap();
        assert!(!recs.iter().any(|t| t == title));
    }
}

#[test]
fn test_scores_are_non_increasing_with_index_tiebreak() {
    let store = create_test_store();
    let recommender = SimilarityRecommender::new(store.clone());

    for title in store.list_titles() {
        let recs = recommender.recommend_scored(title, N).unwrap();
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].index < pair[1].index);
            }
        }
    }
}

#[test]
fn test_scores_match_matrix() {
    let store = create_test_store();
    let recommender = SimilarityRecommender::new(store.clone());

    let query = store.resolve_index("Movie 12").unwrap();
    for rec in recommender.recommend_scored("Movie 12", 10).unwrap() {
        assert_eq!(Some(rec.score), store.similarity(query, rec.index));
    }
}

#[test]
fn test_concurrent_callers_agree() {
    let store = create_test_store();
    let recommender = SimilarityRecommender::new(store.clone());
    let expected = recommender.recommend("Movie 3", 5).unwrap();

    let results: Vec<Vec<String>> = (0..64)
        .into_par_iter()
        .map(|_| recommender.recommend("Movie 3", 5).unwrap())
        .collect();

    assert!(results.iter().all(|r| *r == expected));
}

#[test]
fn test_duplicate_titles_use_first_row() {
    let catalog = vec![
        MovieRecord { index: 0, movie_id: 1, title: "Twin".to_string() },
        MovieRecord { index: 1, movie_id: 2, title: "Other".to_string() },
        MovieRecord { index: 2, movie_id: 3, title: "Twin".to_string() },
    ];
    let matrix = SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.2, 0.8],
        vec![0.2, 1.0, 0.9],
        vec![0.8, 0.9, 1.0],
    ])
    .unwrap();
    let store = DatasetStore::from_parts(catalog, matrix).unwrap();

    // Row 0 is used, so the later "Twin" shows up as a neighbour
    assert_eq!(recommend(&store, "Twin", 2).unwrap(), vec!["Twin", "Other"]);
}

#[test]
fn test_bundled_dataset_excludes_query_on_self_tie() {
    // Demo dataset shipped at the workspace root; "The Dark Knight Rises"
    // scores 1.0 against "The Dark Knight", the same as against itself
    let data_dir = std::path::Path::new("../../data");

    if data_dir.exists() {
        let store = DatasetStore::load_from_dir(data_dir).unwrap();

        let recs = recommend(&store, "The Dark Knight Rises", 3).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], "The Dark Knight");

        for title in store.list_titles() {
            let recs = recommend(&store, title, store.len()).unwrap();
            assert_eq!(recs.len(), store.len() - 1);
            assert!(!recs.iter().any(|t| t == title), "{title} recommended for itself");
        }
    }
}
