use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use movie_graph::{GraphIndex, GraphView, Relation};
use pipeline::{Pagination, Recommendation};
use server::{load_graph, RecommendationService, ServiceConfig};
use similarity::Algorithm;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// ReelRecs - Graph-based Movie Recommendations
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendations from a movie/people/ratings graph", long_about = None)]
struct Cli {
    /// Path to the graph snapshot directory (overrides REEL_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies with one algorithm
    Recommend {
        /// weighted-content, jaccard-index, cosine-similarity or pearson-similarity
        #[arg(long, default_value = "pearson-similarity")]
        algorithm: Algorithm,

        /// Seed movie id (tmdbId)
        #[arg(long)]
        seed: String,

        /// Requesting user id; required for the collaborative algorithms
        #[arg(long)]
        user: Option<String>,

        /// Page size; invalid values fall back to 6
        #[arg(long)]
        limit: Option<String>,

        /// Page offset; invalid values fall back to 0
        #[arg(long)]
        skip: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a movie with its genres, cast and directors
    Movie {
        /// Movie id (tmdbId)
        #[arg(long)]
        id: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Requesting user; a random rated user per request if omitted
        #[arg(long)]
        user: Option<String>,

        /// Seed movie; the first movie in the snapshot if omitted
        #[arg(long)]
        seed: Option<String>,
    },
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

    let mut config = ServiceConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Load the snapshot (this may take a moment)
    eprintln!("Loading graph snapshot from {}...", config.data_dir.display());
    let start = Instant::now();
    let graph = load_graph(&config.data_dir).context("Failed to load graph snapshot")?;
    eprintln!("{} Loaded snapshot in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            algorithm,
            seed,
            user,
            limit,
            skip,
            json,
        } => {
            let pagination = Pagination::from_raw(limit.as_deref(), skip.as_deref());
            handle_recommend(graph, &config, algorithm, &seed, user.as_deref(), pagination, json)
                .await?
        }
        Commands::Movie { id } => handle_movie(&graph, &id)?,
        Commands::Benchmark {
            requests,
            concurrent,
            user,
            seed,
        } => handle_benchmark(graph, &config, requests, concurrent, user, seed).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    graph: Arc<GraphIndex>,
    config: &ServiceConfig,
    algorithm: Algorithm,
    seed: &str,
    user: Option<&str>,
    pagination: Pagination,
    json: bool,
) -> Result<()> {
    let service = RecommendationService::with_graph(graph, config);
    let recommendations = service.recommend(algorithm, seed, user, pagination).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(algorithm, &recommendations, pagination);
    }
    Ok(())
}

/// Handle the 'movie' command
fn handle_movie(graph: &GraphIndex, id: &str) -> Result<()> {
    let movie = graph
        .movie(id)
        .ok_or_else(|| anyhow!("Movie {} not found", id))?;

    println!("{}", format!("{} [{}]", movie.title, movie.tmdb_id).bold().blue());
    if let Some(released) = movie.released {
        println!("{}Released: {}", "• ".green(), released);
    }
    if let Some(runtime) = movie.runtime {
        println!("{}Runtime: {} min", "• ".green(), runtime);
    }
    if let Some(rating) = movie.imdb_rating {
        println!("{}IMDb rating: {:.1}", "• ".green(), rating);
    }
    if !movie.languages.is_empty() {
        println!("{}Languages: {}", "• ".green(), movie.languages.join(", "));
    }

    for (label, relation) in [
        ("Genres", Relation::InGenre),
        ("Cast", Relation::ActedIn),
        ("Directors", Relation::Directed),
    ] {
        let names: Vec<&str> = graph
            .linked(id, relation)
            .iter()
            .map(|entity| graph.entity_name(relation, entity).unwrap_or(entity))
            .collect();
        println!("{}{}: {}", "• ".cyan(), label, names.join(", "));
    }

    let ratings = graph.ratings_of(id);
    if !ratings.is_empty() {
        let avg = ratings.iter().map(|r| r.rating).sum::<f32>() / ratings.len() as f32;
        println!(
            "{}Rated {:.2} on average by {} users",
            "• ".cyan(),
            avg,
            ratings.len()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    graph: Arc<GraphIndex>,
    config: &ServiceConfig,
    requests: usize,
    concurrent: usize,
    user: Option<String>,
    seed: Option<String>,
) -> Result<()> {
    let seed = match seed {
        Some(seed) => seed,
        None => graph
            .movie_ids()
            .first()
            .map(|id| id.to_string())
            .ok_or_else(|| anyhow!("Snapshot contains no movies"))?,
    };
    let users: Vec<String> = match user {
        Some(user) => vec![user],
        None => graph.user_ids().into_iter().cloned().collect(),
    };
    if users.is_empty() {
        return Err(anyhow!("Snapshot contains no users"));
    }

    let service = RecommendationService::with_graph(graph, config);
    let limiter = Arc::new(tokio::sync::Semaphore::new(concurrent.max(1)));

    // Spread requests over all four algorithms and random users
    let overall = Instant::now();
    let mut handles = vec![];
    for i in 0..requests {
        let algorithm = Algorithm::ALL[i % Algorithm::ALL.len()];
        let user = users[rand::random::<u32>() as usize % users.len()].clone();
        let service = service.clone();
        let seed = seed.clone();
        let limiter = limiter.clone();
        let handle = tokio::spawn(async move {
            let _slot = limiter.acquire_owned().await?;
            let start = Instant::now();
            service
                .recommend(algorithm, &seed, Some(&user), Pagination::default())
                .await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = overall.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(
    algorithm: Algorithm,
    recommendations: &[Recommendation],
    pagination: Pagination,
) {
    println!(
        "{}",
        format!("{} recommendations:", algorithm).bold().blue()
    );
    if recommendations.is_empty() {
        println!("  (none)");
        return;
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let rank = pagination.skip() + i + 1;
        let year = rec
            .movie
            .get("year")
            .map(|year| year.to_string())
            .unwrap_or_else(|| "????".to_string());
        let favorite = if rec.favorite { " ♥".red().to_string() } else { String::new() };
        println!(
            "{}. {} ({}) [{}] - Score: {:.3}{}",
            rank.to_string().green(),
            rec.title().unwrap_or("?"),
            year,
            rec.movie_id().unwrap_or("?"),
            rec.score,
            favorite
        );
    }
}
