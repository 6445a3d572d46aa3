//! The movie catalog: canonical registry plus title resolution.

use crate::types::{MovieDetails, MovieId, MovieRecord};
use std::collections::{BTreeMap, HashMap};

/// Canonical movie registry with title <-> id resolution.
///
/// The catalog is built once at load time and never mutated afterwards;
/// any number of readers may query it concurrently.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Primary store, ordered by movie id so title listings are stable
    movies: BTreeMap<MovieId, MovieRecord>,
    /// IMDb metadata, present for a subset of movies
    details: HashMap<MovieId, MovieDetails>,

    // Title indices. Duplicate titles are possible in the dataset; every
    // index maps a title form to the smallest movie id carrying it, so
    // resolution is deterministic rather than insertion-order dependent.
    exact_index: HashMap<String, MovieId>,
    folded_index: HashMap<String, MovieId>,
    base_index: HashMap<String, MovieId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a movie and index its title forms
    pub fn insert_movie(&mut self, movie: MovieRecord) {
        let id = movie.id;
        index_title(&mut self.exact_index, movie.title.clone(), id);
        index_title(&mut self.folded_index, movie.title.to_lowercase(), id);
        index_title(
            &mut self.base_index,
            strip_year_suffix(&movie.title).to_lowercase(),
            id,
        );
        self.movies.insert(id, movie);
    }

    /// Attach IMDb metadata to a movie. Rows for unknown movies are kept
    /// too; validation decides whether that is acceptable.
    pub fn insert_details(&mut self, details: MovieDetails) {
        self.details.insert(details.movie_id, details);
    }

    /// Get a movie by id
    pub fn movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.movies.get(&id)
    }

    /// Get IMDb metadata for a movie, if any was loaded
    pub fn details(&self, id: MovieId) -> Option<&MovieDetails> {
        self.details.get(&id)
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.movies.contains_key(&id)
    }

    /// Resolve a title to a movie id.
    ///
    /// Matching is tried strictest-first:
    /// 1. exact title ("Toy Story (1995)")
    /// 2. case-insensitive title
    /// 3. case-insensitive with the "(Year)" suffix stripped from both
    ///    sides ("toy story" finds "Toy Story (1995)")
    ///
    /// When several movies share a title form, the smallest movie id wins;
    /// the tie-break is fixed, not an artifact of load order.
    pub fn resolve(&self, title: &str) -> Option<MovieId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        if let Some(&id) = self.exact_index.get(title) {
            return Some(id);
        }
        let folded = title.to_lowercase();
        if let Some(&id) = self.folded_index.get(&folded) {
            return Some(id);
        }
        let base = strip_year_suffix(&folded);
        self.base_index.get(base).copied()
    }

    /// All titles in ascending movie-id order. The ordering is stable
    /// across runs, so callers can use positions for input selection.
    pub fn titles_ordered(&self) -> Vec<&str> {
        self.movies.values().map(|m| m.title.as_str()).collect()
    }

    /// Iterate over all movies in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> {
        self.movies.values()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

fn index_title(index: &mut HashMap<String, MovieId>, key: String, id: MovieId) {
    let entry = index.entry(key).or_insert(id);
    if id < *entry {
        *entry = id;
    }
}

/// Strip a trailing "(YYYY)" year suffix, if present
fn strip_year_suffix(title: &str) -> &str {
    let trimmed = title.trim_end();
    if let Some(start) = trimmed.rfind('(')
        && trimmed.ends_with(')')
    {
        let inner = trimmed[start + 1..trimmed.len() - 1].trim();
        if inner.len() == 4 && inner.chars().all(|c| c.is_ascii_digit()) {
            return trimmed[..start].trim_end();
        }
    }
    trimmed
}
