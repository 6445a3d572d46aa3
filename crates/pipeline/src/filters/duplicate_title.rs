//! Filter that collapses duplicate titles.

use crate::traits::Filter;
use crate::types::{RankedCandidate, RequestContext};
use anyhow::Result;
use std::collections::HashSet;

/// Keeps only the first (highest-ranked) candidate for each title.
///
/// Titles are not guaranteed unique in the catalog; once a title has been
/// emitted, later candidates carrying it are dropped.
pub struct DuplicateTitleFilter;

impl Filter for DuplicateTitleFilter {
    fn name(&self) -> &str {
        "DuplicateTitleFilter"
    }

    fn apply(
        &self,
        candidates: Vec<RankedCandidate>,
        _context: &RequestContext,
    ) -> Result<Vec<RankedCandidate>> {
        let mut seen: HashSet<String> = HashSet::new();
        let filtered = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.title.clone()))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_occurrence() {
        let candidates = vec![
            RankedCandidate::new(10, "Hamlet (1996)", 0.9),
            RankedCandidate::new(11, "Othello (1995)", 0.8),
            RankedCandidate::new(12, "Hamlet (1996)", 0.7),
        ];

        let filtered = DuplicateTitleFilter
            .apply(candidates, &RequestContext::default())
            .unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].movie_id, 10);
        assert_eq!(filtered[1].movie_id, 11);
    }

    #[test]
    fn test_distinct_titles_untouched() {
        let candidates = vec![
            RankedCandidate::new(1, "A (2000)", 0.9),
            RankedCandidate::new(2, "B (2001)", 0.8),
        ];
        let filtered = DuplicateTitleFilter
            .apply(candidates.clone(), &RequestContext::default())
            .unwrap();
        assert_eq!(filtered, candidates);
    }
}
