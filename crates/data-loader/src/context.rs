//! Explicit dataset loading into one immutable context object.
//!
//! The engines and the ranker receive a [`DataContext`] by reference or
//! behind an `Arc`; nothing in this workspace reads datasets through
//! global state.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::parser;
use crate::rating_store::RatingStore;
use std::path::Path;
use tracing::info;

/// The loaded Catalog + Rating Store pair.
///
/// Constructed once at process start and immutable afterwards.
#[derive(Debug)]
pub struct DataContext {
    pub catalog: Catalog,
    pub ratings: RatingStore,
}

impl DataContext {
    /// Load the datasets from a directory.
    ///
    /// Expects `movies.csv` and `ratings.csv`; `imdb_data.csv` is optional
    /// and only enriches content vectors when present.
    ///
    /// Steps:
    /// 1. Parse all files (in parallel)
    /// 2. Build the catalog and rating indices
    /// 3. Compute per-movie statistics
    /// 4. Validate referential integrity and rating ranges
    pub fn load(data_dir: &Path) -> Result<Self> {
        let movies_path = data_dir.join("movies.csv");
        let ratings_path = data_dir.join("ratings.csv");
        let details_path = data_dir.join("imdb_data.csv");

        // Nested join gives three-way parse parallelism
        let ((movies, details), ratings) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&movies_path),
                    || {
                        if details_path.exists() {
                            parser::parse_details(&details_path).map(Some)
                        } else {
                            Ok(None)
                        }
                    },
                )
            },
            || parser::parse_ratings(&ratings_path),
        );
        let movies = movies?;
        let details = details?;
        let ratings = ratings?;

        info!(
            movies = movies.len(),
            ratings = ratings.len(),
            has_details = details.is_some(),
            "Parsed datasets from {}",
            data_dir.display()
        );

        let mut catalog = Catalog::new();
        for movie in movies {
            catalog.insert_movie(movie);
        }
        if let Some(details) = details {
            for row in details {
                catalog.insert_details(row);
            }
        }

        let mut store = RatingStore::new();
        for rating in ratings {
            store.insert_rating(rating);
        }
        store.compute_movie_stats();

        store.validate(&catalog)?;
        info!(
            movies = catalog.len(),
            users = store.user_count(),
            ratings = store.len(),
            "Data context built and validated"
        );

        Ok(Self {
            catalog,
            ratings: store,
        })
    }

    /// Assemble a context from already-built parts, running the same
    /// validation as [`DataContext::load`]. Test fixtures use this.
    pub fn from_parts(catalog: Catalog, mut ratings: RatingStore) -> Result<Self> {
        ratings.compute_movie_stats();
        ratings.validate(&catalog)?;
        Ok(Self { catalog, ratings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MovieRecord, RatingEvent};

    #[test]
    fn test_from_parts_validates() {
        let mut catalog = Catalog::new();
        catalog.insert_movie(MovieRecord {
            id: 1,
            title: "Toy Story (1995)".to_string(),
            year: Some(1995),
            genres: vec!["Animation".to_string()],
        });

        let mut store = RatingStore::new();
        store.insert_rating(RatingEvent {
            user_id: 1,
            movie_id: 1,
            rating: 4.0,
            timestamp: 978_300_760,
        });

        let context = DataContext::from_parts(catalog, store).unwrap();
        assert_eq!(context.catalog.len(), 1);
        assert!(context.ratings.stats(1).is_some());
    }

    #[test]
    fn test_from_parts_rejects_dangling_rating() {
        let catalog = Catalog::new();
        let mut store = RatingStore::new();
        store.insert_rating(RatingEvent {
            user_id: 1,
            movie_id: 42,
            rating: 4.0,
            timestamp: 978_300_760,
        });
        assert!(DataContext::from_parts(catalog, store).is_err());
    }
}
