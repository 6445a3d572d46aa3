//! Error types shared by both recommendation engines.

use data_loader::MovieId;
use thiserror::Error;

/// Typed failures raised by the engines and propagated, unmodified, to the
/// caller. The ranker may enrich a variant (e.g. attach the title to an
/// [`EngineError::UnratedSeed`]) but never collapses them into a generic
/// message.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A seed title could not be resolved against the catalog
    #[error("unknown movie title: {title:?}")]
    UnknownTitle { title: String },

    /// A seed movie exists in the catalog but has no rating history, so it
    /// has no position in latent-factor space
    #[error("movie {movie_id} has no rating history")]
    UnratedSeed { movie_id: MovieId },

    /// The request itself is malformed (wrong seed count, duplicate or
    /// empty titles, non-positive top_n)
    #[error("invalid request: {reason}")]
    InvalidInput { reason: String },

    /// The collaborative model has not been trained/loaded yet. Retryable
    /// once training completes.
    #[error("collaborative model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// Training produced non-finite values or was handed degenerate input.
    /// Fatal to that training run only; a previously installed snapshot
    /// keeps serving.
    #[error("model computation failed: {reason}")]
    Computation { reason: String },

    /// Training was cancelled between epochs
    #[error("training was cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
        }
    }

    pub fn computation(reason: impl Into<String>) -> Self {
        Self::Computation {
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
