//! Built-in filters for the recommendation pipeline.

mod duplicate_title;
mod seed_exclusion;

pub use duplicate_title::DuplicateTitleFilter;
pub use seed_exclusion::SeedExclusionFilter;
