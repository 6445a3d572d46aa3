//! Collaborative Factor Model
//!
//! Low-rank factorization of the sparse rating matrix, with bias terms:
//!
//! `prediction(u, i) = global_bias + user_bias[u] + item_bias[i] + p_u . q_i`
//!
//! ## Training
//! Stochastic gradient descent over the **observed** (user, movie, rating)
//! triples only — unobserved cells never contribute to the loss. The run
//! is deterministic for a fixed seed: factor initialization and the
//! per-epoch shuffle both draw from one seeded RNG. Training stops at the
//! epoch cap or as soon as the epoch MSE stops improving by more than the
//! configured threshold, whichever comes first.
//!
//! ## Serving
//! A trained [`FactorModel`] is immutable. The three seed movies have no
//! user row to reuse (the caller is anonymous), so their item-factor
//! vectors act as virtual preference directions: every other rated movie
//! is scored by its maximum cosine similarity to any seed's vector.

use crate::error::{EngineError, Result};
use crate::vector::cosine;
use crate::ScoredMovie;
use data_loader::{MovieId, RatingStore, UserId, RATING_MAX, RATING_MIN};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One observed rating: (user, movie, rating)
pub type Triple = (UserId, MovieId, f32);

/// Hyperparameters for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Rank of the factorization (latent dimensions per user/item)
    pub factors: usize,
    /// Hard cap on training epochs
    pub epochs: usize,
    /// SGD step size
    pub learning_rate: f32,
    /// L2 regularization strength applied to factors and biases
    pub regularization: f32,
    /// Stop early once an epoch improves MSE by less than this
    pub min_improvement: f64,
    /// RNG seed; a fixed seed makes training reproducible
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            factors: 32,
            epochs: 30,
            learning_rate: 0.01,
            regularization: 0.05,
            min_improvement: 1e-5,
            seed: 42,
        }
    }
}

/// Cooperative cancellation flag for a training run.
///
/// Checked between epochs; cancelling never touches a snapshot that is
/// already being served.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// An immutable trained factorization snapshot.
///
/// Every movie with at least one rating in the training data has an entry
/// in `item_factors`; users likewise. Serializable so a trained snapshot
/// can be cached to disk and reloaded instead of retrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorModel {
    factors: usize,
    global_bias: f32,
    user_bias: HashMap<UserId, f32>,
    item_bias: HashMap<MovieId, f32>,
    user_factors: HashMap<UserId, Vec<f32>>,
    item_factors: HashMap<MovieId, Vec<f32>>,
}

impl FactorModel {
    /// Train a model from a rating store
    pub fn train(
        store: &RatingStore,
        config: &TrainConfig,
        cancel: &CancelToken,
    ) -> Result<Self> {
        Self::train_on_triples(&store.triples(), config, cancel)
    }

    /// Train a model from explicit triples (the holdout-evaluation path
    /// trains on a subset this way).
    #[instrument(skip(triples, config, cancel), fields(observations = triples.len()))]
    pub fn train_on_triples(
        triples: &[Triple],
        config: &TrainConfig,
        cancel: &CancelToken,
    ) -> Result<Self> {
        if triples.is_empty() {
            return Err(EngineError::computation(
                "cannot train on an empty rating set",
            ));
        }
        if config.factors == 0 {
            return Err(EngineError::computation("factor rank must be positive"));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let k = config.factors;
        let lr = config.learning_rate;
        let reg = config.regularization;

        // Index users and items densely; ascending id keeps initialization
        // deterministic
        let mut user_ids: Vec<UserId> = triples.iter().map(|t| t.0).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let mut item_ids: Vec<MovieId> = triples.iter().map(|t| t.1).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let user_index: HashMap<UserId, usize> =
            user_ids.iter().enumerate().map(|(i, &u)| (u, i)).collect();
        let item_index: HashMap<MovieId, usize> =
            item_ids.iter().enumerate().map(|(i, &m)| (m, i)).collect();

        let indexed: Vec<(usize, usize, f32)> = triples
            .iter()
            .map(|&(u, m, r)| (user_index[&u], item_index[&m], r))
            .collect();

        let global_bias =
            (triples.iter().map(|t| t.2 as f64).sum::<f64>() / triples.len() as f64) as f32;

        let mut init = || -> Vec<f32> { (0..k).map(|_| rng.random_range(-0.1..0.1)).collect() };
        let mut p: Vec<Vec<f32>> = (0..user_ids.len()).map(|_| init()).collect();
        let mut q: Vec<Vec<f32>> = (0..item_ids.len()).map(|_| init()).collect();
        let mut bu = vec![0.0f32; user_ids.len()];
        let mut bi = vec![0.0f32; item_ids.len()];

        let mut order: Vec<usize> = (0..indexed.len()).collect();
        let mut prev_mse = f64::INFINITY;

        for epoch in 0..config.epochs {
            if cancel.is_cancelled() {
                info!(epoch, "Training cancelled");
                return Err(EngineError::Cancelled);
            }

            order.shuffle(&mut rng);
            let mut squared_error = 0.0f64;

            for &idx in &order {
                let (u, i, rating) = indexed[idx];
                let prediction =
                    global_bias + bu[u] + bi[i] + dot(&p[u], &q[i]);
                let err = rating - prediction;
                squared_error += (err as f64) * (err as f64);

                bu[u] += lr * (err - reg * bu[u]);
                bi[i] += lr * (err - reg * bi[i]);
                for f in 0..k {
                    let puf = p[u][f];
                    let qif = q[i][f];
                    p[u][f] += lr * (err * qif - reg * puf);
                    q[i][f] += lr * (err * puf - reg * qif);
                }
            }

            let mse = squared_error / indexed.len() as f64;
            if !mse.is_finite() {
                return Err(EngineError::computation(format!(
                    "training diverged at epoch {epoch} (mse = {mse})"
                )));
            }
            debug!(epoch, mse, "Completed training epoch");

            if prev_mse - mse < config.min_improvement {
                info!(epoch, mse, "Converged; stopping early");
                break;
            }
            prev_mse = mse;
        }

        let model = Self {
            factors: k,
            global_bias,
            user_bias: user_ids.iter().zip(bu).map(|(&u, b)| (u, b)).collect(),
            item_bias: item_ids.iter().zip(bi).map(|(&m, b)| (m, b)).collect(),
            user_factors: user_ids.iter().zip(p).map(|(&u, f)| (u, f)).collect(),
            item_factors: item_ids.iter().zip(q).map(|(&m, f)| (m, f)).collect(),
        };
        info!(
            users = model.user_factors.len(),
            items = model.item_factors.len(),
            rank = k,
            "Trained factor model"
        );
        Ok(model)
    }

    /// Rank of the factorization
    pub fn rank(&self) -> usize {
        self.factors
    }

    pub fn user_count(&self) -> usize {
        self.user_factors.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_factors.len()
    }

    /// Whether a movie has a latent position (i.e. had rating history)
    pub fn has_item(&self, movie_id: MovieId) -> bool {
        self.item_factors.contains_key(&movie_id)
    }

    /// Predict the rating a known user would give a known movie, clamped
    /// to the rating scale. None if either side was absent from training.
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> Option<f32> {
        let p = self.user_factors.get(&user_id)?;
        let q = self.item_factors.get(&movie_id)?;
        let raw = self.global_bias
            + self.user_bias.get(&user_id).copied().unwrap_or(0.0)
            + self.item_bias.get(&movie_id).copied().unwrap_or(0.0)
            + dot(p, q);
        Some(raw.clamp(RATING_MIN, RATING_MAX))
    }

    /// Root-mean-square error over a set of observed triples. Pairs whose
    /// user or movie was absent from training fall back to the global
    /// mean, so held-out users still count against the model.
    pub fn rmse(&self, triples: &[Triple]) -> f64 {
        if triples.is_empty() {
            return 0.0;
        }
        let sum: f64 = triples
            .iter()
            .map(|&(u, m, r)| {
                let predicted = self.predict(u, m).unwrap_or(self.global_bias);
                let err = (r - predicted) as f64;
                err * err
            })
            .sum();
        (sum / triples.len() as f64).sqrt()
    }

    /// Rank every rated, non-seed movie by latent-space closeness to the
    /// seeds.
    ///
    /// Each seed's item-factor vector is a virtual preference direction;
    /// the per-candidate score is the **maximum** cosine similarity to any
    /// seed (the same aggregation the content engine uses). Sorted by
    /// score descending, ties broken by ascending movie id.
    #[instrument(skip(self, seeds), fields(seed_count = seeds.len()))]
    pub fn rank_for_seeds(&self, seeds: &[MovieId]) -> Result<Vec<ScoredMovie>> {
        if seeds.is_empty() {
            return Err(EngineError::invalid_input("no seed movies supplied"));
        }
        let seed_vectors: Vec<&Vec<f32>> = seeds
            .iter()
            .map(|&seed| {
                self.item_factors
                    .get(&seed)
                    .ok_or(EngineError::UnratedSeed { movie_id: seed })
            })
            .collect::<Result<_>>()?;

        let mut candidate_ids: Vec<MovieId> = self.item_factors.keys().copied().collect();
        candidate_ids.sort_unstable();

        let mut scored: Vec<ScoredMovie> = candidate_ids
            .par_iter()
            .filter(|&&movie_id| !seeds.contains(&movie_id))
            .map(|&movie_id| {
                let vector = &self.item_factors[&movie_id];
                let score = seed_vectors
                    .iter()
                    .map(|&seed| cosine(seed, vector))
                    .fold(f32::MIN, f32::max);
                ScoredMovie { movie_id, score }
            })
            .collect();

        scored.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.movie_id.cmp(&b.movie_id))
        });

        debug!(candidates = scored.len(), "Ranked collaborative candidates");
        Ok(scored)
    }

    /// Write the snapshot as JSON. The format is a local cache, not a
    /// compatibility contract; the model is always rebuildable from the
    /// datasets.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)
            .map_err(std::io::Error::other)
    }

    /// Load a snapshot previously written by [`FactorModel::save`].
    /// Any failure reports the model as unavailable.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            EngineError::model_unavailable(format!(
                "cannot open model artifact {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
            EngineError::model_unavailable(format!(
                "cannot parse model artifact {}: {e}",
                path.display()
            ))
        })
    }
}

/// Split triples into (train, holdout) deterministically. The holdout
/// fraction is clamped so the training side is never empty.
pub fn holdout_split(
    mut triples: Vec<Triple>,
    holdout_fraction: f32,
    seed: u64,
) -> (Vec<Triple>, Vec<Triple>) {
    if triples.len() < 2 {
        return (triples, Vec::new());
    }
    let mut rng = StdRng::seed_from_u64(seed);
    triples.shuffle(&mut rng);
    let holdout_len = ((triples.len() as f32 * holdout_fraction) as usize).min(triples.len() - 1);
    let train_len = triples.len() - holdout_len;
    let holdout = triples.split_off(train_len);
    (triples, holdout)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
