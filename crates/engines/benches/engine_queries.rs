//! Benchmarks for engine build and query paths
//!
//! Run with: cargo bench --package engines
//!
//! Uses a synthetic catalog/rating set so the benchmarks need no dataset
//! files on disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{Catalog, MovieRecord, RatingEvent, RatingStore};
use engines::{CancelToken, ContentEngine, FactorModel, TrainConfig};

const GENRE_POOL: &[&str] = &[
    "Action", "Adventure", "Animation", "Children", "Comedy", "Crime", "Drama", "Fantasy",
    "Horror", "Romance", "Sci-Fi", "Thriller",
];

fn synthetic_catalog(movies: u32) -> Catalog {
    let mut catalog = Catalog::new();
    for id in 1..=movies {
        // Deterministic pseudo-variety: each movie gets 2-3 genres
        let g1 = GENRE_POOL[(id % 12) as usize];
        let g2 = GENRE_POOL[((id / 3) % 12) as usize];
        let mut genres = vec![g1.to_string()];
        if g2 != g1 {
            genres.push(g2.to_string());
        }
        catalog.insert_movie(MovieRecord {
            id,
            title: format!("Synthetic Movie {id} (1999)"),
            year: Some(1999),
            genres,
        });
    }
    catalog
}

fn synthetic_ratings(users: u32, movies: u32) -> RatingStore {
    let mut store = RatingStore::new();
    for user_id in 1..=users {
        for movie_id in 1..=movies {
            // Every user rates roughly a quarter of the catalog
            if (user_id + movie_id) % 4 != 0 {
                continue;
            }
            let rating = 0.5 + ((user_id * 7 + movie_id * 3) % 10) as f32 * 0.5;
            store.insert_rating(RatingEvent {
                user_id,
                movie_id,
                rating,
                timestamp: 978_300_760,
            });
        }
    }
    store
}

fn bench_content_build(c: &mut Criterion) {
    let catalog = synthetic_catalog(2000);
    c.bench_function("content_engine_build", |b| {
        b.iter(|| ContentEngine::build(black_box(&catalog)))
    });
}

fn bench_content_rank(c: &mut Criterion) {
    let catalog = synthetic_catalog(2000);
    let engine = ContentEngine::build(&catalog);
    c.bench_function("content_rank_for_seeds", |b| {
        b.iter(|| engine.rank_for_seeds(black_box(&[1, 2, 3])).unwrap())
    });
}

fn bench_factor_training(c: &mut Criterion) {
    let store = synthetic_ratings(200, 500);
    let config = TrainConfig {
        epochs: 5,
        ..TrainConfig::default()
    };
    c.bench_function("factor_model_train_5_epochs", |b| {
        b.iter(|| {
            FactorModel::train(black_box(&store), black_box(&config), &CancelToken::new()).unwrap()
        })
    });
}

fn bench_factor_rank(c: &mut Criterion) {
    let store = synthetic_ratings(200, 500);
    let model = FactorModel::train(&store, &TrainConfig::default(), &CancelToken::new()).unwrap();
    c.bench_function("factor_rank_for_seeds", |b| {
        b.iter(|| model.rank_for_seeds(black_box(&[4, 8, 12])).unwrap())
    });
}

criterion_group!(
    benches,
    bench_content_build,
    bench_content_rank,
    bench_factor_training,
    bench_factor_rank
);
criterion_main!(benches);
