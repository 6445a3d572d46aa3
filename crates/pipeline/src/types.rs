//! Types flowing through the post-ranking filter pipeline.

use data_loader::MovieId;
use std::collections::HashSet;

/// A ranked candidate after title enrichment: what the filters operate on
/// and what the ranker truncates into the final result.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
}

impl RankedCandidate {
    pub fn new(movie_id: MovieId, title: impl Into<String>, score: f32) -> Self {
        Self {
            movie_id,
            title: title.into(),
            score,
        }
    }
}

/// Per-request context the filters consult: which movies were supplied as
/// seeds, by id and by title.
///
/// Titles matter separately from ids because the catalog can hold the same
/// title under several ids; excluding by id alone could leak a seed title
/// back into the output.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub seed_ids: HashSet<MovieId>,
    pub seed_titles: HashSet<String>,
}

impl RequestContext {
    pub fn new(
        seed_ids: impl IntoIterator<Item = MovieId>,
        seed_titles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            seed_ids: seed_ids.into_iter().collect(),
            seed_titles: seed_titles.into_iter().collect(),
        }
    }
}
