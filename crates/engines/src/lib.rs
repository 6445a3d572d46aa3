//! # Engines Crate
//!
//! The two ranking models behind the recommender.
//!
//! ## Components
//!
//! ### Content Similarity Engine
//! TF-IDF vectors over genre (and, when available, director/cast/keyword)
//! tokens, L2-normalized so cosine similarity is a sparse dot product.
//! Works for any catalog movie regardless of rating history.
//!
//! ### Collaborative Factor Model
//! Bias-aware low-rank factorization of the sparse rating matrix, trained
//! offline by SGD over observed triples only. Serves anonymous three-seed
//! queries by treating the seeds' item-factor vectors as virtual
//! preference directions.
//!
//! Both engines share the same query conventions: per-candidate scores
//! aggregate over the seeds by maximum, seeds are excluded, and ties break
//! on ascending movie id so results are deterministic for a fixed
//! snapshot.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engines::{CancelToken, ContentEngine, FactorModel, TrainConfig};
//!
//! let content = ContentEngine::build(&context.catalog);
//! let ranked = content.rank_for_seeds(&[1, 2, 6])?;
//!
//! let model = FactorModel::train(&context.ratings, &TrainConfig::default(), &CancelToken::new())?;
//! let ranked = model.rank_for_seeds(&[1, 2, 6])?;
//! ```

pub mod content;
pub mod error;
pub mod factors;
pub mod vector;

use data_loader::MovieId;

// Re-export commonly used types
pub use content::ContentEngine;
pub use error::{EngineError, Result};
pub use factors::{holdout_split, CancelToken, FactorModel, TrainConfig, Triple};
pub use vector::{cosine, SparseVector};

/// One ranked candidate produced by either engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    /// Aggregate similarity to the seed set (higher is better)
    pub score: f32,
}
