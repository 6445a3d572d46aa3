//! Core domain types for the movie and rating datasets.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie (stable key from movies.csv)
pub type MovieId = u32;

/// Lowest rating a user can give
pub const RATING_MIN: f32 = 0.5;

/// Highest rating a user can give
pub const RATING_MAX: f32 = 5.0;

// =============================================================================
// Movie-related Types
// =============================================================================

/// A movie as registered in the catalog. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    /// Full title, usually carrying the year suffix: "Toy Story (1995)".
    /// Unique in practice, but the dataset does not guarantee it.
    pub title: String,
    /// Year extracted from the title suffix, when present
    pub year: Option<u16>,
    /// Genre tokens from the pipe-delimited genres column.
    /// `(no genres listed)` loads as an empty list.
    pub genres: Vec<String>,
}

impl MovieRecord {
    /// Whether this movie shares at least one genre token with `other`
    pub fn shares_genre(&self, other: &MovieRecord) -> bool {
        self.genres.iter().any(|g| other.genres.contains(g))
    }
}

/// Optional descriptive metadata from the IMDb table, keyed by movie id.
///
/// All fields are best-effort: the source columns are free text and
/// frequently empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieDetails {
    pub movie_id: MovieId,
    /// Billed cast, pipe-delimited in the source
    pub title_cast: Vec<String>,
    pub director: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    /// Production budget reduced to a plain amount. The source column is
    /// currency-formatted text ("$21,347,000", "GBP12,000,000"), so the
    /// parser keeps only the digit run.
    pub budget: Option<u64>,
    /// Plot keywords, pipe-delimited in the source
    pub plot_keywords: Vec<String>,
}

// =============================================================================
// Rating Types
// =============================================================================

/// A single rating observation from a user for a movie.
///
/// Read-only at serving time; only the offline training phase consumes
/// these in bulk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value in half-steps from [`RATING_MIN`] to [`RATING_MAX`]
    pub rating: f32,
    /// Unix timestamp (seconds) when the rating was made
    pub timestamp: i64,
}

/// Precomputed statistics for a movie, built once at load time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: f32,
    pub rating_count: u32,
    /// Popularity score derived from rating count and average
    pub popularity_score: f32,
}
