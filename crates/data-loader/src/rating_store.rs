//! Sparse store of user-movie rating observations.

use crate::catalog::Catalog;
use crate::error::{DataLoadError, Result};
use crate::types::{MovieId, MovieStats, RatingEvent, UserId, RATING_MAX, RATING_MIN};
use rayon::prelude::*;
use std::collections::HashMap;

/// All observed ratings, indexed both ways for fast lookups.
///
/// Built once at load time; read-only while serving.
#[derive(Debug, Default)]
pub struct RatingStore {
    by_user: HashMap<UserId, Vec<RatingEvent>>,
    by_movie: HashMap<MovieId, Vec<RatingEvent>>,
    movie_stats: HashMap<MovieId, MovieStats>,
    total: usize,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rating and update both indices
    pub fn insert_rating(&mut self, rating: RatingEvent) {
        self.by_user.entry(rating.user_id).or_default().push(rating);
        self.by_movie
            .entry(rating.movie_id)
            .or_default()
            .push(rating);
        self.total += 1;
    }

    /// All ratings made by a user (empty slice if none)
    pub fn user_ratings(&self, user_id: UserId) -> &[RatingEvent] {
        self.by_user
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All ratings received by a movie (empty slice if none)
    pub fn movie_ratings(&self, movie_id: MovieId) -> &[RatingEvent] {
        self.by_movie
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Precomputed statistics for a movie
    pub fn stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.movie_stats.get(&movie_id)
    }

    /// Ids of all movies with at least one rating, ascending
    pub fn rated_movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.by_movie.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn movie_count(&self) -> usize {
        self.by_movie.len()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Mean of all observed ratings
    pub fn mean_rating(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .by_user
            .values()
            .flat_map(|v| v.iter())
            .map(|r| r.rating as f64)
            .sum();
        (sum / self.total as f64) as f32
    }

    /// All observed `(user, movie, rating)` triples in a fixed order
    /// (ascending user id, then movie id, then timestamp).
    ///
    /// The order matters: training shuffles these with a seeded RNG, and a
    /// deterministic base order is what makes the shuffle reproducible.
    pub fn triples(&self) -> Vec<(UserId, MovieId, f32)> {
        let mut user_ids: Vec<UserId> = self.by_user.keys().copied().collect();
        user_ids.sort_unstable();

        let mut triples = Vec::with_capacity(self.total);
        for user_id in user_ids {
            let mut ratings = self.by_user[&user_id].clone();
            ratings.sort_unstable_by_key(|r| (r.movie_id, r.timestamp));
            triples.extend(
                ratings
                    .into_iter()
                    .map(|r| (r.user_id, r.movie_id, r.rating)),
            );
        }
        triples
    }

    /// Compute per-movie aggregate statistics.
    ///
    /// Popularity rewards both a high average and a large audience:
    /// `avg_rating * ln(rating_count + 1)`.
    pub fn compute_movie_stats(&mut self) {
        self.movie_stats = self
            .by_movie
            .par_iter()
            .map(|(&movie_id, ratings)| {
                let rating_count = ratings.len() as u32;
                let avg_rating = if rating_count > 0 {
                    let total: f32 = ratings.iter().map(|r| r.rating).sum();
                    total / rating_count as f32
                } else {
                    0.0
                };
                let popularity_score = avg_rating * (rating_count as f32 + 1.0).ln();
                (
                    movie_id,
                    MovieStats {
                        avg_rating,
                        rating_count,
                        popularity_score,
                    },
                )
            })
            .collect();
    }

    /// Validate every rating against the catalog and the rating scale
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        for ratings in self.by_user.values() {
            for rating in ratings {
                if !catalog.contains(rating.movie_id) {
                    return Err(DataLoadError::MissingReference {
                        entity: "Movie".to_string(),
                        id: rating.movie_id,
                    });
                }
                if rating.rating < RATING_MIN || rating.rating > RATING_MAX {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.rating.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
