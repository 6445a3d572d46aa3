//! Request validation for the serving boundary.

use engines::{EngineError, Result};
use std::fmt;

/// Number of seed titles every request must carry
pub const SEED_COUNT: usize = 3;

/// Which ranking model a request should be answered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Content,
    Collaborative,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Content => write!(f, "content"),
            EngineKind::Collaborative => write!(f, "collaborative"),
        }
    }
}

/// A validated recommendation request: three distinct, non-empty seed
/// titles and a positive result count.
///
/// Construction is the only validation point; a `RecommendationRequest`
/// that exists is well-formed. Malformed input is an
/// [`EngineError::InvalidInput`], never a silent empty result.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    seeds: [String; SEED_COUNT],
    top_n: usize,
}

impl RecommendationRequest {
    pub fn new(movie_list: &[String], top_n: usize) -> Result<Self> {
        if movie_list.len() != SEED_COUNT {
            return Err(EngineError::invalid_input(format!(
                "expected exactly {SEED_COUNT} seed titles, got {}",
                movie_list.len()
            )));
        }

        let seeds: Vec<String> = movie_list.iter().map(|t| t.trim().to_string()).collect();
        if seeds.iter().any(|t| t.is_empty()) {
            return Err(EngineError::invalid_input("seed titles must be non-empty"));
        }

        // Case-insensitive duplicate check: "heat" and "Heat" are the same
        // favorite typed twice
        for i in 0..seeds.len() {
            for j in (i + 1)..seeds.len() {
                if seeds[i].eq_ignore_ascii_case(&seeds[j]) {
                    return Err(EngineError::invalid_input(format!(
                        "duplicate seed title: {:?}",
                        seeds[i]
                    )));
                }
            }
        }

        if top_n == 0 {
            return Err(EngineError::invalid_input("top_n must be positive"));
        }

        let seeds: [String; SEED_COUNT] = seeds
            .try_into()
            .map_err(|_| EngineError::invalid_input("expected exactly 3 seed titles"))?;
        Ok(Self { seeds, top_n })
    }

    pub fn seeds(&self) -> &[String; SEED_COUNT] {
        &self.seeds
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }
}
