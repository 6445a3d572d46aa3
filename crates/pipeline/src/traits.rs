//! Core traits for the filtering pipeline.

use crate::types::{RankedCandidate, RequestContext};
use anyhow::Result;

/// A composable filter over ranked candidates.
///
/// Filters take ownership of the candidate list and return a (usually
/// smaller) list, preserving the incoming rank order. `Send + Sync` so a
/// pipeline can be shared across concurrent requests.
pub trait Filter: Send + Sync {
    /// Name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - ranked candidates, best first (takes ownership)
    /// * `context` - the request's seed ids and titles
    fn apply(
        &self,
        candidates: Vec<RankedCandidate>,
        context: &RequestContext,
    ) -> Result<Vec<RankedCandidate>>;
}
