//! Simple test harness for the recommendation service.
//!
//! Loads the snapshot named by `REEL_DATA_DIR` and runs every algorithm
//! for one seed movie and requesting user.
//!
//! Usage: `server [SEED_MOVIE_ID] [USER_ID]`

use anyhow::{Context, Result};
use tracing::info;

use pipeline::Pagination;
use server::{RecommendationService, ServiceConfig, load_graph};
use similarity::Algorithm;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,similarity=debug,pipeline=debug")
        .init();

    info!("Starting ReelGraph service test harness");

    let config = ServiceConfig::from_env()?;
    info!("Loading graph snapshot from {}", config.data_dir.display());
    let graph = load_graph(&config.data_dir)?;

    let mut args = std::env::args().skip(1);
    let seed_id = match args.next() {
        Some(id) => id,
        None => graph
            .movie_ids()
            .first()
            .map(|id| id.to_string())
            .context("Snapshot contains no movies")?,
    };
    let user_id = args.next();

    let service = RecommendationService::with_graph(graph, &config);

    for algorithm in Algorithm::ALL {
        info!(
            "Running {} for seed {} (user: {})",
            algorithm,
            seed_id,
            user_id.as_deref().unwrap_or("none")
        );
        let recommendations = service
            .recommend(algorithm, &seed_id, user_id.as_deref(), Pagination::default())
            .await?;

        info!("Received {} recommendations:", recommendations.len());
        for (i, rec) in recommendations.iter().enumerate() {
            info!(
                "{}. {} [{}] - Score: {:.3}{}",
                i + 1,
                rec.title().unwrap_or("?"),
                rec.movie_id().unwrap_or("?"),
                rec.score,
                if rec.favorite { " *" } else { "" }
            );
        }
    }

    Ok(())
}
