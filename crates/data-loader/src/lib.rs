//! # Data Loader Crate
//!
//! Loads and indexes the movie/rating datasets the recommendation engines
//! are built from.
//!
//! ## Main Components
//!
//! - **types**: core domain types (MovieRecord, RatingEvent, MovieStats)
//! - **parser**: CSV parsing for movies.csv, ratings.csv, imdb_data.csv
//! - **catalog**: canonical movie registry with title resolution
//! - **rating_store**: sparse user-movie rating observations
//! - **context**: explicit one-shot loading into an immutable [`DataContext`]
//! - **error**: typed load errors
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataContext;
//! use std::path::Path;
//!
//! let context = DataContext::load(Path::new("resources/data"))?;
//!
//! let id = context.catalog.resolve("Toy Story (1995)").unwrap();
//! let movie = context.catalog.movie(id).unwrap();
//! println!("{} has {} ratings", movie.title, context.ratings.movie_ratings(id).len());
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod parser;
pub mod rating_store;
pub mod types;

// Re-export commonly used types for convenience
pub use catalog::Catalog;
pub use context::DataContext;
pub use error::{DataLoadError, Result};
pub use rating_store::RatingStore;
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    MovieDetails,
    MovieRecord,
    MovieStats,
    RatingEvent,
    // Rating scale bounds
    RATING_MAX,
    RATING_MIN,
};
