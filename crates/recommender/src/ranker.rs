//! # Recommendation Ranker
//!
//! The façade the UI shell calls. For either engine the flow is the same:
//!
//! 1. Validate the request (three distinct titles, positive top_n)
//! 2. Resolve seed titles against the catalog
//! 3. Ask the chosen engine for a full ranking of candidates
//! 4. Enrich with titles and run the filter pipeline
//!    (seed exclusion, duplicate-title collapse)
//! 5. Truncate to top_n and return titles
//!
//! Everything here is a pure function over immutable snapshots; requests
//! never mutate shared state, so any number may run concurrently.

use crate::request::{EngineKind, RecommendationRequest};
use crate::snapshot::ModelHandle;
use data_loader::{DataContext, MovieId};
use engines::{CancelToken, ContentEngine, EngineError, FactorModel, Result, ScoredMovie, TrainConfig};
use pipeline::filters::{DuplicateTitleFilter, SeedExclusionFilter};
use pipeline::{FilterPipeline, RankedCandidate, RequestContext};
use std::sync::Arc;
use tracing::{info, instrument};

/// Orchestrates both engines behind one request contract.
///
/// Guarantees for every successful call:
/// - no output title equals a seed title
/// - output length ≤ top_n (shorter only if the catalog runs out of
///   eligible candidates)
/// - no duplicate titles
/// - deterministic order for a fixed model snapshot and fixed input
pub struct Recommender {
    data: Arc<DataContext>,
    content: ContentEngine,
    collab: ModelHandle,
    filters: FilterPipeline,
}

impl Recommender {
    /// Build the content engine from the loaded data and set up an empty
    /// collaborative slot (train or load a model to fill it).
    pub fn new(data: Arc<DataContext>) -> Self {
        let content = ContentEngine::build(&data.catalog);
        let filters = FilterPipeline::new()
            .add_filter(SeedExclusionFilter)
            .add_filter(DuplicateTitleFilter);
        Self {
            data,
            content,
            collab: ModelHandle::empty(),
            filters,
        }
    }

    /// Serving boundary: content-based recommendations.
    ///
    /// `movie_list` must hold exactly three distinct titles.
    pub fn content_model(&self, movie_list: &[String], top_n: usize) -> Result<Vec<String>> {
        let request = RecommendationRequest::new(movie_list, top_n)?;
        self.recommend(&request, EngineKind::Content)
    }

    /// Serving boundary: collaborative recommendations.
    ///
    /// Fails with [`EngineError::ModelUnavailable`] until a model has been
    /// trained or loaded.
    pub fn collab_model(&self, movie_list: &[String], top_n: usize) -> Result<Vec<String>> {
        let request = RecommendationRequest::new(movie_list, top_n)?;
        self.recommend(&request, EngineKind::Collaborative)
    }

    /// Answer a validated request with the chosen engine
    #[instrument(skip(self, request), fields(top_n = request.top_n(), engine = %engine))]
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
        engine: EngineKind,
    ) -> Result<Vec<String>> {
        let seed_ids = self.resolve_seeds(request)?;

        let ranked = match engine {
            EngineKind::Content => self.content.rank_for_seeds(&seed_ids)?,
            EngineKind::Collaborative => {
                let model = self.collab.current()?;
                model
                    .rank_for_seeds(&seed_ids)
                    .map_err(|e| self.name_unrated_seed(e))?
            }
        };

        let candidates = self.enrich_with_titles(&ranked);
        let context = RequestContext::new(
            seed_ids.iter().copied(),
            seed_ids
                .iter()
                .filter_map(|&id| self.data.catalog.movie(id))
                .map(|m| m.title.clone()),
        );

        let filtered = self
            .filters
            .apply(candidates, &context)
            .map_err(|e| EngineError::computation(format!("filter pipeline failed: {e}")))?;

        let titles: Vec<String> = filtered
            .into_iter()
            .take(request.top_n())
            .map(|c| c.title)
            .collect();

        info!(
            results = titles.len(),
            requested = request.top_n(),
            "Produced recommendations"
        );
        Ok(titles)
    }

    /// Train a fresh collaborative model and atomically install it.
    ///
    /// On any training failure (divergence, cancellation) the previously
    /// installed snapshot — if any — keeps serving untouched.
    pub fn train_collaborative(&self, config: &TrainConfig, cancel: &CancelToken) -> Result<()> {
        let model = FactorModel::train(&self.data.ratings, config, cancel)?;
        self.collab.install(model);
        Ok(())
    }

    /// Install an already-built model (e.g. loaded from a cache file)
    pub fn install_collaborative(&self, model: FactorModel) {
        self.collab.install(model);
    }

    /// The currently served collaborative snapshot
    pub fn collaborative(&self) -> Result<Arc<FactorModel>> {
        self.collab.current()
    }

    /// The content engine (exposed for inspection and tests)
    pub fn content_engine(&self) -> &ContentEngine {
        &self.content
    }

    pub fn data(&self) -> &DataContext {
        &self.data
    }

    /// Resolve the three seed titles to movie ids.
    ///
    /// Distinct titles that resolve to the same movie (e.g. "Heat" and
    /// "Heat (1995)") are rejected: the engines would silently treat them
    /// as one seed.
    fn resolve_seeds(&self, request: &RecommendationRequest) -> Result<Vec<MovieId>> {
        let seed_ids: Vec<MovieId> = request
            .seeds()
            .iter()
            .map(|title| {
                self.data
                    .catalog
                    .resolve(title)
                    .ok_or_else(|| EngineError::UnknownTitle {
                        title: title.clone(),
                    })
            })
            .collect::<Result<_>>()?;

        for i in 0..seed_ids.len() {
            for j in (i + 1)..seed_ids.len() {
                if seed_ids[i] == seed_ids[j] {
                    return Err(EngineError::invalid_input(format!(
                        "seed titles {:?} and {:?} resolve to the same movie",
                        request.seeds()[i],
                        request.seeds()[j]
                    )));
                }
            }
        }
        Ok(seed_ids)
    }

    /// Map engine output to title-bearing candidates, in rank order
    fn enrich_with_titles(&self, ranked: &[ScoredMovie]) -> Vec<RankedCandidate> {
        ranked
            .iter()
            .filter_map(|scored| {
                self.data
                    .catalog
                    .movie(scored.movie_id)
                    .map(|movie| {
                        RankedCandidate::new(scored.movie_id, movie.title.clone(), scored.score)
                    })
            })
            .collect()
    }

    /// A seed without rating history surfaces to the caller as an unknown
    /// title, carrying the catalog title instead of a bare id
    fn name_unrated_seed(&self, err: EngineError) -> EngineError {
        match err {
            EngineError::UnratedSeed { movie_id } => match self.data.catalog.movie(movie_id) {
                Some(movie) => EngineError::UnknownTitle {
                    title: movie.title.clone(),
                },
                None => EngineError::UnratedSeed { movie_id },
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, MovieRecord, RatingEvent, RatingStore};

    fn movie(id: MovieId, title: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            year: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn create_test_recommender() -> Recommender {
        let mut catalog = Catalog::new();
        catalog.insert_movie(movie(1, "Seed One (1995)", &["Animation", "Comedy"]));
        catalog.insert_movie(movie(2, "Seed Two (1995)", &["Adventure", "Fantasy"]));
        catalog.insert_movie(movie(3, "Seed Three (1995)", &["Action", "Crime"]));
        catalog.insert_movie(movie(4, "Candidate A (1996)", &["Animation", "Comedy"]));
        catalog.insert_movie(movie(5, "Candidate B (1997)", &["Action", "Crime"]));
        catalog.insert_movie(movie(6, "Candidate C (1998)", &["Drama"]));
        // Duplicate of a seed title under a different id
        catalog.insert_movie(movie(7, "Seed One (1995)", &["Animation", "Comedy"]));

        let mut store = RatingStore::new();
        for (user, movie_id, rating) in [
            (1, 1, 5.0),
            (1, 4, 5.0),
            (1, 5, 1.0),
            (2, 1, 4.5),
            (2, 2, 4.0),
            (2, 4, 4.5),
            (3, 3, 5.0),
            (3, 5, 4.5),
            (3, 6, 2.0),
        ] {
            store.insert_rating(RatingEvent {
                user_id: user,
                movie_id,
                rating,
                timestamp: 978_300_760,
            });
        }

        let data = DataContext::from_parts(catalog, store).unwrap();
        Recommender::new(Arc::new(data))
    }

    fn seeds() -> Vec<String> {
        vec![
            "Seed One (1995)".to_string(),
            "Seed Two (1995)".to_string(),
            "Seed Three (1995)".to_string(),
        ]
    }

    #[test]
    fn test_content_model_excludes_seed_titles() {
        let recommender = create_test_recommender();
        let result = recommender.content_model(&seeds(), 10).unwrap();

        assert!(!result.is_empty());
        assert!(result.len() <= 10);
        for title in &result {
            assert!(!seeds().contains(title), "seed title {title:?} leaked");
        }
        // Movie 7 duplicates a seed title; it must not appear either
        assert!(!result.contains(&"Seed One (1995)".to_string()));
    }

    #[test]
    fn test_content_model_respects_top_n() {
        let recommender = create_test_recommender();
        let result = recommender.content_model(&seeds(), 2).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_content_model_deterministic() {
        let recommender = create_test_recommender();
        let a = recommender.content_model(&seeds(), 10).unwrap();
        let b = recommender.content_model(&seeds(), 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_title_is_typed_error() {
        let recommender = create_test_recommender();
        let mut list = seeds();
        list[1] = "No Such Film (2099)".to_string();
        match recommender.content_model(&list, 10) {
            Err(EngineError::UnknownTitle { title }) => {
                assert_eq!(title, "No Such Film (2099)");
            }
            other => panic!("expected UnknownTitle, got {other:?}"),
        }
    }

    #[test]
    fn test_same_movie_twice_is_invalid_input() {
        let recommender = create_test_recommender();
        // Distinct strings, same movie after year-tolerant resolution
        let list = vec![
            "Seed One (1995)".to_string(),
            "Seed One".to_string(),
            "Seed Three (1995)".to_string(),
        ];
        assert!(matches!(
            recommender.content_model(&list, 10),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_collab_model_unavailable_before_training() {
        let recommender = create_test_recommender();
        assert!(matches!(
            recommender.collab_model(&seeds(), 10),
            Err(EngineError::ModelUnavailable { .. })
        ));
    }

    #[test]
    fn test_collab_model_after_training() {
        let recommender = create_test_recommender();
        recommender
            .train_collaborative(&TrainConfig::default(), &CancelToken::new())
            .unwrap();

        let result = recommender.collab_model(&seeds(), 10).unwrap();
        assert!(!result.is_empty());
        for title in &result {
            assert!(!seeds().contains(title));
        }
    }

    #[test]
    fn test_collab_model_unrated_seed_reported_by_title() {
        let mut catalog = Catalog::new();
        catalog.insert_movie(movie(1, "Rated (1990)", &["Drama"]));
        catalog.insert_movie(movie(2, "Also Rated (1991)", &["Drama"]));
        catalog.insert_movie(movie(3, "Another Rated (1992)", &["Drama"]));
        catalog.insert_movie(movie(4, "Never Rated (1993)", &["Drama"]));

        let mut store = RatingStore::new();
        for (user, movie_id) in [(1, 1), (1, 2), (2, 2), (2, 3), (3, 1), (3, 3)] {
            store.insert_rating(RatingEvent {
                user_id: user,
                movie_id,
                rating: 4.0,
                timestamp: 978_300_760,
            });
        }
        let recommender =
            Recommender::new(Arc::new(DataContext::from_parts(catalog, store).unwrap()));
        recommender
            .train_collaborative(&TrainConfig::default(), &CancelToken::new())
            .unwrap();

        let list = vec![
            "Rated (1990)".to_string(),
            "Also Rated (1991)".to_string(),
            "Never Rated (1993)".to_string(),
        ];
        match recommender.collab_model(&list, 10) {
            Err(EngineError::UnknownTitle { title }) => {
                assert_eq!(title, "Never Rated (1993)");
            }
            other => panic!("expected UnknownTitle, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_training_keeps_previous_snapshot() {
        let recommender = create_test_recommender();
        recommender
            .train_collaborative(&TrainConfig::default(), &CancelToken::new())
            .unwrap();
        let before = recommender.collaborative().unwrap();

        // A cancelled run must not disturb the installed snapshot
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            recommender.train_collaborative(&TrainConfig::default(), &cancel),
            Err(EngineError::Cancelled)
        ));

        let after = recommender.collaborative().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }
}
