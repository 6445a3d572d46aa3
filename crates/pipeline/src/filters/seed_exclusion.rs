//! Filter that keeps seed movies out of the result.
//!
//! Runs first in the pipeline, before duplicate collapsing.

use crate::traits::Filter;
use crate::types::{RankedCandidate, RequestContext};
use anyhow::Result;

/// Removes candidates that match a seed by id **or** by title.
///
/// The title check covers duplicate catalog entries: a different id
/// carrying the same title as a seed must not reach the output either.
pub struct SeedExclusionFilter;

impl Filter for SeedExclusionFilter {
    fn name(&self) -> &str {
        "SeedExclusionFilter"
    }

    fn apply(
        &self,
        candidates: Vec<RankedCandidate>,
        context: &RequestContext,
    ) -> Result<Vec<RankedCandidate>> {
        let filtered = candidates
            .into_iter()
            .filter(|candidate| {
                !context.seed_ids.contains(&candidate.movie_id)
                    && !context.seed_titles.contains(&candidate.title)
            })
            .collect();
        Ok(filtered)
    }
}
