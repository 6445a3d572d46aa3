//! Content Similarity Engine
//!
//! Ranks movies by feature-space closeness to a set of seed movies, with
//! no dependency on rating history (so it also covers catalog cold-start).
//!
//! ## Algorithm
//! 1. Tokenize every catalog entry into namespaced feature tokens
//!    (genres always; director/cast/plot keywords when IMDb metadata is
//!    loaded)
//! 2. Weight tokens with smoothed TF-IDF and L2-normalize, so cosine
//!    similarity is a sparse dot product
//! 3. Per query, score every non-seed movie by its maximum similarity to
//!    any of the seeds, sort descending, tie-break by ascending movie id

use crate::error::{EngineError, Result};
use crate::vector::SparseVector;
use crate::ScoredMovie;
use data_loader::{Catalog, MovieId};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Immutable content-similarity index over one catalog snapshot.
///
/// Vector dimensionality is fixed at build time; rebuilding is the only
/// way to pick up catalog changes. Queries never mutate engine state, so
/// any number may run concurrently.
#[derive(Debug)]
pub struct ContentEngine {
    /// One normalized vector per catalog movie, ascending movie id
    vectors: Vec<(MovieId, SparseVector)>,
    index_of: HashMap<MovieId, usize>,
    vocabulary_size: usize,
}

impl ContentEngine {
    /// Build the engine from a catalog.
    ///
    /// Token document frequencies come from the full catalog, so IDF
    /// down-weights ubiquitous tokens (e.g. the Drama genre) relative to
    /// rare ones (a particular director).
    pub fn build(catalog: &Catalog) -> Self {
        // Tokenize in catalog (ascending id) order
        let docs: Vec<(MovieId, Vec<String>)> = catalog
            .iter()
            .map(|movie| (movie.id, tokenize(catalog, movie.id)))
            .collect();

        // Document frequencies over the whole catalog
        let mut document_frequency: HashMap<&str, u32> = HashMap::new();
        for (_, tokens) in &docs {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        // Fixed vocabulary: lexicographic token order makes dimension
        // assignment independent of hash iteration order
        let mut vocabulary: Vec<&str> = document_frequency.keys().copied().collect();
        vocabulary.sort_unstable();
        let dimension_of: HashMap<&str, u32> = vocabulary
            .iter()
            .enumerate()
            .map(|(dim, token)| (*token, dim as u32))
            .collect();

        let doc_count = docs.len() as f32;
        let idf: HashMap<&str, f32> = document_frequency
            .iter()
            .map(|(token, df)| {
                // Smoothed IDF; never zero, never negative
                let weight = ((1.0 + doc_count) / (1.0 + *df as f32)).ln() + 1.0;
                (*token, weight)
            })
            .collect();

        let vectors: Vec<(MovieId, SparseVector)> = docs
            .par_iter()
            .map(|(movie_id, tokens)| {
                let mut tf: HashMap<&str, f32> = HashMap::new();
                for token in tokens {
                    *tf.entry(token.as_str()).or_insert(0.0) += 1.0;
                }
                let entries: Vec<(u32, f32)> = tf
                    .into_iter()
                    .map(|(token, count)| (dimension_of[token], count * idf[token]))
                    .collect();
                let mut vector = SparseVector::from_entries(entries);
                vector.l2_normalize();
                (*movie_id, vector)
            })
            .collect();

        let index_of = vectors
            .iter()
            .enumerate()
            .map(|(idx, (movie_id, _))| (*movie_id, idx))
            .collect();

        debug!(
            movies = vectors.len(),
            vocabulary = vocabulary.len(),
            "Built content similarity engine"
        );

        Self {
            vectors,
            index_of,
            vocabulary_size: vocabulary.len(),
        }
    }

    /// Cosine similarity between two catalog movies, in [-1, 1].
    /// Symmetric by construction. None if either id is not indexed.
    pub fn similarity(&self, a: MovieId, b: MovieId) -> Option<f32> {
        let va = &self.vectors[*self.index_of.get(&a)?].1;
        let vb = &self.vectors[*self.index_of.get(&b)?].1;
        Some(va.dot(vb))
    }

    /// Rank every non-seed movie against the seeds.
    ///
    /// Per-candidate score is the **maximum** similarity across the seeds:
    /// a movie strongly similar to just one favorite is still a strong
    /// recommendation, where a mean would dilute it. Results are sorted by
    /// score descending, then ascending movie id, and contain every
    /// non-seed catalog movie; the caller truncates.
    #[instrument(skip(self, seeds), fields(seed_count = seeds.len()))]
    pub fn rank_for_seeds(&self, seeds: &[MovieId]) -> Result<Vec<ScoredMovie>> {
        if seeds.is_empty() {
            return Err(EngineError::invalid_input("no seed movies supplied"));
        }
        let seed_vectors: Vec<&SparseVector> = seeds
            .iter()
            .map(|seed| {
                self.index_of
                    .get(seed)
                    .map(|&idx| &self.vectors[idx].1)
                    .ok_or_else(|| {
                        EngineError::invalid_input(format!("seed movie {seed} is not indexed"))
                    })
            })
            .collect::<Result<_>>()?;

        let mut scored: Vec<ScoredMovie> = self
            .vectors
            .par_iter()
            .filter(|(movie_id, _)| !seeds.contains(movie_id))
            .map(|(movie_id, vector)| {
                let score = seed_vectors
                    .iter()
                    .map(|seed| seed.dot(vector))
                    .fold(f32::MIN, f32::max);
                ScoredMovie {
                    movie_id: *movie_id,
                    score,
                }
            })
            .collect();

        scored.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.movie_id.cmp(&b.movie_id))
        });

        debug!(candidates = scored.len(), "Ranked content candidates");
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }
}

/// Collect the feature tokens for one movie.
///
/// Tokens are namespaced so a genre called "Crime" and a plot keyword
/// "crime" stay distinct dimensions.
fn tokenize(catalog: &Catalog, movie_id: MovieId) -> Vec<String> {
    let mut tokens = Vec::new();
    if let Some(movie) = catalog.movie(movie_id) {
        for genre in &movie.genres {
            tokens.push(format!("genre:{}", genre.to_lowercase()));
        }
    }
    if let Some(details) = catalog.details(movie_id) {
        if let Some(director) = &details.director {
            tokens.push(format!("director:{}", director.to_lowercase()));
        }
        for actor in &details.title_cast {
            tokens.push(format!("cast:{}", actor.to_lowercase()));
        }
        for keyword in &details.plot_keywords {
            tokens.push(format!("keyword:{}", keyword.to_lowercase()));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MovieDetails, MovieRecord};

    fn movie(id: MovieId, title: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            year: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn create_test_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_movie(movie(1, "Toy Story (1995)", &["Animation", "Children", "Comedy"]));
        catalog.insert_movie(movie(2, "Jumanji (1995)", &["Adventure", "Children", "Fantasy"]));
        catalog.insert_movie(movie(3, "Heat (1995)", &["Action", "Crime", "Thriller"]));
        catalog.insert_movie(movie(4, "Antz (1998)", &["Animation", "Children", "Comedy"]));
        catalog.insert_movie(movie(5, "Casino (1995)", &["Crime", "Drama"]));
        catalog.insert_movie(movie(6, "Undocumented (2000)", &[]));
        catalog
    }

    #[test]
    fn test_similarity_symmetric() {
        let engine = ContentEngine::build(&create_test_catalog());
        for a in 1..=6 {
            for b in 1..=6 {
                assert_eq!(
                    engine.similarity(a, b),
                    engine.similarity(b, a),
                    "similarity({a}, {b}) not symmetric"
                );
            }
        }
    }

    #[test]
    fn test_identical_genre_sets_have_top_similarity() {
        let engine = ContentEngine::build(&create_test_catalog());
        // Movies 1 and 4 carry identical genre token sets
        let same = engine.similarity(1, 4).unwrap();
        assert!((same - 1.0).abs() < 1e-5);

        // And are more similar than a disjoint pair
        let disjoint = engine.similarity(1, 3).unwrap();
        assert!(same > disjoint);
        assert_eq!(disjoint, 0.0);
    }

    #[test]
    fn test_empty_token_movie_scores_zero() {
        let engine = ContentEngine::build(&create_test_catalog());
        assert_eq!(engine.similarity(6, 1), Some(0.0));
    }

    #[test]
    fn test_rank_excludes_seeds_and_sorts() {
        let engine = ContentEngine::build(&create_test_catalog());
        let ranked = engine.rank_for_seeds(&[1, 2, 3]).unwrap();

        let ids: Vec<MovieId> = ranked.iter().map(|s| s.movie_id).collect();
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&3));
        assert_eq!(ids.len(), 3);

        // Scores descend
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // Movie 4 mirrors seed 1 exactly, so it must lead
        assert_eq!(ranked[0].movie_id, 4);
    }

    #[test]
    fn test_rank_ties_break_by_ascending_id() {
        let mut catalog = Catalog::new();
        catalog.insert_movie(movie(1, "Seed (1990)", &["Action"]));
        // Three identical candidates: scores tie exactly
        catalog.insert_movie(movie(30, "C (1990)", &["Action"]));
        catalog.insert_movie(movie(10, "A (1990)", &["Action"]));
        catalog.insert_movie(movie(20, "B (1990)", &["Action"]));

        let engine = ContentEngine::build(&catalog);
        let ranked = engine.rank_for_seeds(&[1]).unwrap();
        let ids: Vec<MovieId> = ranked.iter().map(|s| s.movie_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_rank_rejects_unindexed_seed() {
        let engine = ContentEngine::build(&create_test_catalog());
        assert!(matches!(
            engine.rank_for_seeds(&[1, 2, 99]),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_details_tokens_sharpen_similarity() {
        let mut catalog = create_test_catalog();
        // Give 3 and 5 the same director; they already share the Crime genre
        for id in [3, 5] {
            catalog.insert_details(MovieDetails {
                movie_id: id,
                director: Some("Martin Scorsese".to_string()),
                ..Default::default()
            });
        }
        let without = ContentEngine::build(&create_test_catalog());
        let with = ContentEngine::build(&catalog);
        assert!(with.similarity(3, 5).unwrap() > without.similarity(3, 5).unwrap());
    }

    #[test]
    fn test_deterministic_ranking() {
        let catalog = create_test_catalog();
        let engine = ContentEngine::build(&catalog);
        let first = engine.rank_for_seeds(&[1, 2, 3]).unwrap();
        let second = engine.rank_for_seeds(&[1, 2, 3]).unwrap();
        assert_eq!(
            first.iter().map(|s| s.movie_id).collect::<Vec<_>>(),
            second.iter().map(|s| s.movie_id).collect::<Vec<_>>()
        );
    }
}
