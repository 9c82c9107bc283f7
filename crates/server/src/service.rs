//! # Recommendation Service
//!
//! The four recommendation operations exposed to callers. Each request:
//! 1. Returns early with an empty list if a collaborative algorithm has no requester
//! 2. Opens one graph session
//! 3. Fetches the requester's favorites (one batched traversal)
//! 4. Runs the algorithm's traversal with seed, user, paging and favorites bound
//! 5. Releases the session and normalizes the rows
//!
//! Failures are not retried here; a failed traversal surfaces as
//! [`RecommendationError::BackendUnavailable`].

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info, instrument};

use movie_graph::{GraphIndex, GraphValue, MovieId};
use pipeline::{Normalizer, OverflowPolicy, Pagination, Recommendation};
use similarity::{Algorithm, SimilarityEngine};

use crate::config::ServiceConfig;
use crate::error::RecommendationResult;
use crate::store::{GraphSession, GraphStore, InMemoryGraphStore, TraversalParams, TraversalQuery};

/// Main entry point for recommendation requests
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn GraphStore>,
    normalizer: Normalizer,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            normalizer: Normalizer::default(),
        }
    }

    /// Policy for integers outside ±(2^53 - 1) (default: render as strings)
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.normalizer = Normalizer::new(policy);
        self
    }

    /// Build the in-memory store and service described by `config`
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let graph = load_graph(&config.data_dir)?;
        Ok(Self::with_graph(graph, config))
    }

    /// Serve an already loaded graph with the limits from `config`
    pub fn with_graph(graph: Arc<GraphIndex>, config: &ServiceConfig) -> Self {
        let engine = SimilarityEngine::new()
            .with_min_co_rated(config.min_co_rated)
            .with_mean_basis(config.pearson_mean);
        let store = InMemoryGraphStore::new(graph)
            .with_engine(engine)
            .with_max_sessions(config.max_sessions)
            .with_session_timeout(config.session_timeout());
        Self::new(Arc::new(store)).with_overflow_policy(config.integer_overflow)
    }

    /// Movies sharing genres, cast and directors with `seed_id`
    pub async fn weighted_content(
        &self,
        seed_id: &str,
        user_id: Option<&str>,
        pagination: Pagination,
    ) -> RecommendationResult<Vec<Recommendation>> {
        self.recommend(Algorithm::WeightedContent, seed_id, user_id, pagination)
            .await
    }

    /// Movies ranked by Jaccard overlap of genre, cast and director names
    pub async fn jaccard_index(
        &self,
        seed_id: &str,
        user_id: Option<&str>,
        pagination: Pagination,
    ) -> RecommendationResult<Vec<Recommendation>> {
        self.recommend(Algorithm::JaccardIndex, seed_id, user_id, pagination)
            .await
    }

    /// Top unseen movies of the requester's cosine-similar neighbors
    pub async fn cosine_similarity(
        &self,
        seed_id: &str,
        user_id: Option<&str>,
        pagination: Pagination,
    ) -> RecommendationResult<Vec<Recommendation>> {
        self.recommend(Algorithm::CosineSimilarity, seed_id, user_id, pagination)
            .await
    }

    /// Top unseen movies of the requester's Pearson-correlated neighbors
    pub async fn pearson_similarity(
        &self,
        seed_id: &str,
        user_id: Option<&str>,
        pagination: Pagination,
    ) -> RecommendationResult<Vec<Recommendation>> {
        self.recommend(Algorithm::PearsonSimilarity, seed_id, user_id, pagination)
            .await
    }

    /// "Similar movies" with the default algorithm
    pub async fn similar_movies(
        &self,
        seed_id: &str,
        user_id: Option<&str>,
        pagination: Pagination,
    ) -> RecommendationResult<Vec<Recommendation>> {
        self.recommend(Algorithm::default(), seed_id, user_id, pagination)
            .await
    }

    #[instrument(skip(self), fields(algorithm = %algorithm))]
    pub async fn recommend(
        &self,
        algorithm: Algorithm,
        seed_id: &str,
        user_id: Option<&str>,
        pagination: Pagination,
    ) -> RecommendationResult<Vec<Recommendation>> {
        let start = Instant::now();
        let user_id = user_id.map(str::trim).filter(|id| !id.is_empty());

        if algorithm.requires_user() && user_id.is_none() {
            debug!("{} needs a requesting user, returning no results", algorithm);
            return Ok(Vec::new());
        }

        let rows = {
            let mut session = self.store.session().await?;
            let favorites = fetch_favorites(session.as_mut(), seed_id, user_id).await?;
            debug!("Fetched {} favorites", favorites.len());

            let params = TraversalParams::new(seed_id)
                .with_user(user_id)
                .with_pagination(pagination)
                .with_favorites(favorites);
            session
                .run_traversal(TraversalQuery::Recommend(algorithm), &params)
                .await?
        };

        let recommendations = rows
            .iter()
            .map(|row| self.normalizer.recommendation(row))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "{} returned {} recommendations for seed {} in {:.2?}",
            algorithm,
            recommendations.len(),
            seed_id,
            start.elapsed()
        );
        Ok(recommendations)
    }
}

async fn fetch_favorites(
    session: &mut dyn GraphSession,
    seed_id: &str,
    user_id: Option<&str>,
) -> RecommendationResult<Vec<MovieId>> {
    if user_id.is_none() {
        return Ok(Vec::new());
    }
    let params = TraversalParams::new(seed_id).with_user(user_id);
    let rows = session
        .run_traversal(TraversalQuery::Favorites, &params)
        .await?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("movieId").and_then(GraphValue::as_str))
        .map(str::to_string)
        .collect())
}

/// Load a snapshot directory, logging its size
pub fn load_graph(data_dir: &Path) -> anyhow::Result<Arc<GraphIndex>> {
    let start = Instant::now();
    let graph = GraphIndex::load_from_dir(data_dir)
        .with_context(|| format!("Failed to load graph snapshot from {}", data_dir.display()))?;
    let counts = graph.counts();
    info!(
        "Loaded {} movies, {} people, {} users, {} ratings in {:.2?}",
        counts.movies,
        counts.people,
        counts.users,
        counts.ratings,
        start.elapsed()
    );
    Ok(Arc::new(graph))
}
