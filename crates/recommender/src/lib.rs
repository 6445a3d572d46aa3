//! # Recommender Crate
//!
//! The serving façade over the loaded data and the two engines.
//!
//! ## Components
//!
//! - **request**: validated [`RecommendationRequest`] and [`EngineKind`]
//! - **snapshot**: [`ModelHandle`], the atomically swappable slot the
//!   collaborative model is served from
//! - **ranker**: [`Recommender`], exposing `content_model` /
//!   `collab_model` and the shared `recommend` path
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataContext;
//! use recommender::Recommender;
//! use std::{path::Path, sync::Arc};
//!
//! let data = Arc::new(DataContext::load(Path::new("resources/data"))?);
//! let recommender = Recommender::new(data);
//!
//! let favorites = vec![
//!     "Toy Story (1995)".to_string(),
//!     "Jumanji (1995)".to_string(),
//!     "Heat (1995)".to_string(),
//! ];
//! let picks = recommender.content_model(&favorites, 10)?;
//! ```

pub mod ranker;
pub mod request;
pub mod snapshot;

// Re-export commonly used types
pub use ranker::Recommender;
pub use request::{EngineKind, RecommendationRequest, SEED_COUNT};
pub use snapshot::ModelHandle;

// The engine error taxonomy is the boundary contract; re-export it so
// callers need only this crate
pub use engines::{CancelToken, EngineError, Result, TrainConfig};
