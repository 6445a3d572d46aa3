use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::DataContext;
use engines::{holdout_split, CancelToken, EngineError, FactorModel, TrainConfig};
use recommender::{EngineKind, Recommender};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// triple-feature - movie recommendations from your three favorites
#[derive(Parser)]
#[command(name = "triple-feature")]
#[command(about = "Recommends movies from three favorite titles", long_about = None)]
struct Cli {
    /// Path to the dataset directory (movies.csv, ratings.csv, and
    /// optionally imdb_data.csv)
    #[arg(short, long, default_value = "resources/data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    /// Content-based filtering over genre/metadata vectors
    Content,
    /// Collaborative filtering over latent rating factors
    Collab,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Content => EngineKind::Content,
            EngineArg::Collab => EngineKind::Collaborative,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies from three favorite titles
    Recommend {
        /// A favorite movie title; pass exactly three times
        #[arg(long = "movie", required = true)]
        movies: Vec<String>,

        /// Which model answers the request
        #[arg(long, value_enum, default_value = "content")]
        engine: EngineArg,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Load a previously trained collaborative model instead of
        /// training at startup (collab engine only)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Search for movies by title
    Search {
        /// Title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// List catalog titles in their stable selection order
    Titles {
        /// Maximum number of titles to print
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Train the collaborative model and cache it to disk
    Train {
        /// Where to write the trained model
        #[arg(long, default_value = "model.json")]
        output: PathBuf,

        #[command(flatten)]
        hyper: HyperArgs,
    },

    /// Train on a split and report fit/holdout error
    Evaluate {
        /// Fraction of ratings held out for the generalization check
        #[arg(long, default_value = "0.2")]
        holdout: f32,

        #[command(flatten)]
        hyper: HyperArgs,
    },
}

#[derive(clap::Args)]
struct HyperArgs {
    /// Rank of the factorization
    #[arg(long, default_value = "32")]
    factors: usize,

    /// Maximum training epochs
    #[arg(long, default_value = "30")]
    epochs: usize,

    /// SGD learning rate
    #[arg(long, default_value = "0.01")]
    learning_rate: f32,

    /// L2 regularization strength
    #[arg(long, default_value = "0.05")]
    regularization: f32,

    /// RNG seed (fixed seed = reproducible training)
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl From<&HyperArgs> for TrainConfig {
    fn from(args: &HyperArgs) -> Self {
        Self {
            factors: args.factors,
            epochs: args.epochs,
            learning_rate: args.learning_rate,
            regularization: args.regularization,
            seed: args.seed,
            ..TrainConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading datasets from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data = Arc::new(
        DataContext::load(&cli.data_dir).context("Failed to load datasets")?,
    );
    println!("{} Loaded datasets in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Recommend {
            movies,
            engine,
            top_n,
            model,
        } => handle_recommend(data, movies, engine.into(), top_n, model).await,
        Commands::Search { title } => handle_search(&data, &title),
        Commands::Titles { limit } => handle_titles(&data, limit),
        Commands::Train { output, hyper } => handle_train(data, output, (&hyper).into()).await,
        Commands::Evaluate { holdout, hyper } => {
            handle_evaluate(data, holdout, (&hyper).into()).await
        }
    }
}

/// Handle the 'recommend' command
async fn handle_recommend(
    data: Arc<DataContext>,
    movies: Vec<String>,
    engine: EngineKind,
    top_n: usize,
    model_path: Option<PathBuf>,
) -> Result<()> {
    let recommender = Arc::new(Recommender::new(data));

    if engine == EngineKind::Collaborative {
        match model_path {
            Some(path) => {
                let model = match FactorModel::load(&path) {
                    Ok(model) => model,
                    Err(err) => {
                        report_engine_error(&err);
                        std::process::exit(1);
                    }
                };
                println!("{} Loaded model from {}", "✓".green(), path.display());
                recommender.install_collaborative(model);
            }
            None => {
                println!("Training collaborative model...");
                let start = Instant::now();
                let trainer = Arc::clone(&recommender);
                let trained = tokio::task::spawn_blocking(move || {
                    trainer.train_collaborative(&TrainConfig::default(), &CancelToken::new())
                })
                .await
                .context("Training task panicked")?;
                if let Err(err) = trained {
                    report_engine_error(&err);
                    std::process::exit(1);
                }
                println!("{} Trained model in {:?}", "✓".green(), start.elapsed());
            }
        }
    }

    let result = match engine {
        EngineKind::Content => recommender.content_model(&movies, top_n),
        EngineKind::Collaborative => recommender.collab_model(&movies, top_n),
    };

    match result {
        Ok(titles) => {
            println!("{}", "We think you'll like:".bold().blue());
            for (rank, title) in titles.iter().enumerate() {
                println!("{}. {}", (rank + 1).to_string().green(), title);
            }
            Ok(())
        }
        Err(err) => {
            report_engine_error(&err);
            std::process::exit(1);
        }
    }
}

/// Print a kind-specific message for an engine failure. One generic
/// "something went wrong" would hide exactly the detail the user needs.
fn report_engine_error(err: &EngineError) {
    let headline = match err {
        EngineError::UnknownTitle { .. } => "Title not found",
        EngineError::UnratedSeed { .. } => "No rating history for a seed",
        EngineError::InvalidInput { .. } => "Invalid request",
        EngineError::ModelUnavailable { .. } => "Model not ready",
        EngineError::Computation { .. } => "Model computation failed",
        EngineError::Cancelled => "Training cancelled",
    };
    eprintln!("{} {}: {}", "✗".red(), headline.bold(), err);
}

/// Handle the 'search' command
fn handle_search(data: &DataContext, title: &str) -> Result<()> {
    let title_lower = title.to_lowercase();

    // (id, title, exact-match flag, avg rating, rating count)
    let mut matches: Vec<(u32, &str, bool, f32, u32)> = Vec::new();
    for movie in data.catalog.iter() {
        let movie_title_lower = movie.title.to_lowercase();
        if !movie_title_lower.contains(&title_lower) {
            continue;
        }
        let stats = data.ratings.stats(movie.id);
        matches.push((
            movie.id,
            &movie.title,
            movie_title_lower == title_lower,
            stats.map(|s| s.avg_rating).unwrap_or(0.0),
            stats.map(|s| s.rating_count).unwrap_or(0),
        ));
    }

    // Exact matches first, then by average rating
    matches.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| b.3.partial_cmp(&a.3).unwrap_or(std::cmp::Ordering::Equal))
    });

    println!("{}", format!("Search results for '{title}':").bold().blue());
    for (id, movie_title, _, avg_rating, rating_count) in matches.iter().take(20) {
        let genres = data
            .catalog
            .movie(*id)
            .map(|m| m.genres.join(", "))
            .unwrap_or_default();
        println!("{id}: {movie_title} [{genres}] avg {avg_rating:.2} ({rating_count} ratings)");
    }
    Ok(())
}

/// Handle the 'titles' command
fn handle_titles(data: &DataContext, limit: usize) -> Result<()> {
    println!("{}", "Catalog titles:".bold().blue());
    for title in data.catalog.titles_ordered().iter().take(limit) {
        println!("  {title}");
    }
    Ok(())
}

/// Handle the 'train' command
async fn handle_train(data: Arc<DataContext>, output: PathBuf, config: TrainConfig) -> Result<()> {
    println!(
        "Training on {} ratings ({} users, {} movies)...",
        data.ratings.len(),
        data.ratings.user_count(),
        data.ratings.movie_count()
    );
    let start = Instant::now();
    let trained = tokio::task::spawn_blocking(move || {
        FactorModel::train(&data.ratings, &config, &CancelToken::new())
    })
    .await
    .context("Training task panicked")?;

    let model = match trained {
        Ok(model) => model,
        Err(err) => {
            report_engine_error(&err);
            std::process::exit(1);
        }
    };
    println!(
        "{} Trained rank-{} model in {:?}",
        "✓".green(),
        model.rank(),
        start.elapsed()
    );

    model
        .save(&output)
        .with_context(|| format!("Failed to write model to {}", output.display()))?;
    println!("{} Saved model to {}", "✓".green(), output.display());
    Ok(())
}

/// Handle the 'evaluate' command
async fn handle_evaluate(data: Arc<DataContext>, holdout: f32, config: TrainConfig) -> Result<()> {
    let triples = data.ratings.triples();
    let (train, held_out) = holdout_split(triples, holdout, config.seed);
    println!(
        "Evaluating: {} training ratings, {} held out",
        train.len(),
        held_out.len()
    );

    let start = Instant::now();
    let eval_train = train.clone();
    let trained = tokio::task::spawn_blocking(move || {
        FactorModel::train_on_triples(&eval_train, &config, &CancelToken::new())
    })
    .await
    .context("Training task panicked")?;

    let model = match trained {
        Ok(model) => model,
        Err(err) => {
            report_engine_error(&err);
            std::process::exit(1);
        }
    };

    println!("{} Trained in {:?}", "✓".green(), start.elapsed());
    println!("Fit RMSE (training split):   {:.4}", model.rmse(&train));
    println!("Holdout RMSE (unseen split): {:.4}", model.rmse(&held_out));
    Ok(())
}
