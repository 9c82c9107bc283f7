//! # Graph Store Adapter
//!
//! The contract the recommendation service runs its traversals through,
//! and an in-memory implementation backed by a loaded [`GraphIndex`].
//!
//! A request opens one [`GraphSession`], runs its traversals on it in
//! sequence, and drops it. Sessions are drawn from a bounded pool; the pool
//! slot is owned by the session value, so it is returned on every exit
//! path, including traversal failures and cancelled requests.
//!
//! Scoring runs on the blocking pool and cannot be interrupted. When a
//! request is cancelled mid-traversal the session is dropped at once, but
//! its slot stays taken until the scoring work finishes, so `max_sessions`
//! also bounds the work still in flight.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use movie_graph::{GraphIndex, GraphView, MovieId, Row, UserId};
use pipeline::{Pagination, RequestContext, StagePipeline};
use similarity::{Algorithm, Seed, SimilarityEngine, SimilarityError};

pub const DEFAULT_MAX_SESSIONS: usize = 16;
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Movie {0} not found")]
    SeedNotFound(MovieId),

    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("Traversal {query} failed: {reason}")]
    Traversal { query: String, reason: String },
}

impl From<SimilarityError> for StoreError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::SeedNotFound(id) => StoreError::SeedNotFound(id),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The fixed traversals the service knows how to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalQuery {
    /// `(user)-[:FAVORITE]->(movie)`: one row per favorite, column `movieId`
    Favorites,
    /// One algorithm, ranked, annotated and paged: columns `movie`, `score`, `favorite`
    Recommend(Algorithm),
}

impl fmt::Display for TraversalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalQuery::Favorites => write!(f, "favorites"),
            TraversalQuery::Recommend(algorithm) => write!(f, "{algorithm}"),
        }
    }
}

/// Parameters bound into a traversal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalParams {
    pub seed_id: MovieId,
    pub user_id: Option<UserId>,
    pub pagination: Pagination,
    /// Prefetched favorites of `user_id`
    pub favorites: Vec<MovieId>,
}

impl TraversalParams {
    pub fn new(seed_id: impl Into<MovieId>) -> Self {
        Self {
            seed_id: seed_id.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: Option<&str>) -> Self {
        self.user_id = user_id.map(str::to_string);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_favorites(mut self, favorites: Vec<MovieId>) -> Self {
        self.favorites = favorites;
        self
    }
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a read-only session, waiting for a free slot if the pool is exhausted
    async fn session(&self) -> StoreResult<Box<dyn GraphSession>>;
}

#[async_trait]
pub trait GraphSession: Send {
    async fn run_traversal(
        &mut self,
        query: TraversalQuery,
        params: &TraversalParams,
    ) -> StoreResult<Vec<Row>>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Serves traversals from a [`GraphIndex`] held in memory.
///
/// Scoring runs on the blocking thread pool so a long traversal never
/// stalls the async workers.
#[derive(Clone)]
pub struct InMemoryGraphStore {
    graph: Arc<GraphIndex>,
    engine: Arc<SimilarityEngine>,
    pipeline: Arc<StagePipeline>,
    sessions: Arc<Semaphore>,
    session_timeout: Duration,
}

impl InMemoryGraphStore {
    pub fn new(graph: Arc<GraphIndex>) -> Self {
        Self {
            graph,
            engine: Arc::new(SimilarityEngine::new()),
            pipeline: Arc::new(StagePipeline::recommendation()),
            sessions: Arc::new(Semaphore::new(DEFAULT_MAX_SESSIONS)),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    pub fn with_engine(mut self, engine: SimilarityEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Size of the session pool (default: 16)
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.sessions = Arc::new(Semaphore::new(max_sessions.max(1)));
        self
    }

    /// How long `session()` waits for a free slot (default: 5s)
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn graph(&self) -> &Arc<GraphIndex> {
        &self.graph
    }

    /// Free slots in the session pool
    pub fn available_sessions(&self) -> usize {
        self.sessions.available_permits()
    }

    /// Stop handing out sessions; open sessions finish normally
    pub fn close(&self) {
        self.sessions.close();
    }
}

impl InMemoryGraphStore {
    async fn open_session(&self) -> StoreResult<InMemorySession> {
        let permit = tokio::time::timeout(self.session_timeout, self.sessions.clone().acquire_owned())
            .await
            .map_err(|_| {
                warn!("Timed out after {:?} waiting for a graph session", self.session_timeout);
                StoreError::Unavailable("timed out waiting for a graph session".to_string())
            })?
            .map_err(|_| StoreError::Unavailable("session pool closed".to_string()))?;

        debug!(
            "Opened graph session ({} slots free)",
            self.sessions.available_permits()
        );
        Ok(InMemorySession {
            graph: self.graph.clone(),
            engine: self.engine.clone(),
            pipeline: self.pipeline.clone(),
            permit: Arc::new(permit),
        })
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn session(&self) -> StoreResult<Box<dyn GraphSession>> {
        Ok(Box::new(self.open_session().await?))
    }
}

/// A session on the in-memory store. Its pool slot is held until the
/// session and any blocking work it started are both gone.
pub struct InMemorySession {
    graph: Arc<GraphIndex>,
    engine: Arc<SimilarityEngine>,
    pipeline: Arc<StagePipeline>,
    permit: Arc<OwnedSemaphorePermit>,
}

impl InMemorySession {
    /// Run CPU-bound work on the blocking pool, holding this session's slot
    async fn run_blocking<T, F>(&self, query: &TraversalQuery, work: F) -> StoreResult<T>
    where
        F: FnOnce() -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self.permit.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        })
        .await
        .map_err(|e| StoreError::Traversal {
            query: query.to_string(),
            reason: format!("scoring task failed: {e}"),
        })?
    }

    fn favorites(&self, params: &TraversalParams) -> Vec<Row> {
        let Some(user_id) = params.user_id.as_deref() else {
            return Vec::new();
        };
        self.graph
            .favorites_of(user_id)
            .iter()
            .map(|movie_id| Row::new().with("movieId", movie_id.as_str()))
            .collect()
    }

    async fn recommend(
        &self,
        algorithm: Algorithm,
        params: &TraversalParams,
    ) -> StoreResult<Vec<Row>> {
        let graph = self.graph.clone();
        let engine = self.engine.clone();
        let pipeline = self.pipeline.clone();
        let params = params.clone();
        let query = TraversalQuery::Recommend(algorithm);

        self.run_blocking(&query, move || -> StoreResult<Vec<Row>> {
            let seed = Seed::movie(params.seed_id.as_str()).with_user(params.user_id.as_deref());
            let context = RequestContext::new(params.pagination)
                .with_user(params.user_id.as_deref())
                .with_favorites(params.favorites);

            let candidates = engine.score(algorithm, graph.as_ref(), &seed)?;
            let page = pipeline
                .apply(candidates, &context)
                .map_err(|e| StoreError::Traversal {
                    query: query.to_string(),
                    reason: format!("{e:#}"),
                })?;

            page.into_iter()
                .map(|candidate| {
                    let movie = graph.movie(&candidate.movie_id).ok_or_else(|| {
                        StoreError::Traversal {
                            query: query.to_string(),
                            reason: format!("candidate {} has no movie node", candidate.movie_id),
                        }
                    })?;
                    Ok(Row::new()
                        .with("movie", movie.to_node())
                        .with("score", candidate.score)
                        .with("favorite", candidate.favorite))
                })
                .collect()
        })
        .await
    }
}

#[async_trait]
impl GraphSession for InMemorySession {
    async fn run_traversal(
        &mut self,
        query: TraversalQuery,
        params: &TraversalParams,
    ) -> StoreResult<Vec<Row>> {
        debug!("Running traversal {} for seed {}", query, params.seed_id);
        match query {
            TraversalQuery::Favorites => Ok(self.favorites(params)),
            TraversalQuery::Recommend(algorithm) => self.recommend(algorithm, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_graph::{GraphValue, Movie, Relation};

    fn build_test_store() -> InMemoryGraphStore {
        let mut graph = GraphIndex::new();
        graph.insert_movie(Movie::new("603", "The Matrix"));
        graph.insert_movie(Movie::new("604", "The Matrix Reloaded"));
        graph.link(Relation::InGenre, "Action", "603");
        graph.link(Relation::InGenre, "Action", "604");
        graph.insert_user("42");
        graph.insert_favorite("42", "604");
        InMemoryGraphStore::new(Arc::new(graph)).with_max_sessions(2)
    }

    #[tokio::test]
    async fn test_session_releases_slot_on_drop() {
        let store = build_test_store();
        assert_eq!(store.available_sessions(), 2);

        let session = store.session().await.unwrap();
        assert_eq!(store.available_sessions(), 1);

        drop(session);
        assert_eq!(store.available_sessions(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_request_holds_slot_until_work_finishes() {
        let store = build_test_store();
        let session = store.open_session().await.unwrap();

        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let request = tokio::spawn(async move {
            let query = TraversalQuery::Recommend(Algorithm::WeightedContent);
            session
                .run_blocking(&query, move || {
                    let _ = started_tx.send(());
                    let _ = release_rx.recv();
                    Ok(())
                })
                .await
        });

        started_rx.await.unwrap();
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());

        // The session is gone but the scoring work still owns the slot
        assert_eq!(store.available_sessions(), 1);

        release_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.available_sessions() < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_session_times_out_when_exhausted() {
        let store = build_test_store()
            .with_max_sessions(1)
            .with_session_timeout(Duration::from_millis(20));

        let _held = store.session().await.unwrap();
        let err = store.session().await.err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let store = build_test_store();
        store.close();
        assert!(matches!(
            store.session().await.err().unwrap(),
            StoreError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_favorites_traversal() {
        let store = build_test_store();
        let mut session = store.session().await.unwrap();

        let params = TraversalParams::new("603").with_user(Some("42"));
        let rows = session
            .run_traversal(TraversalQuery::Favorites, &params)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("movieId"), Some(&GraphValue::from("604")));

        let anonymous = TraversalParams::new("603");
        let rows = session
            .run_traversal(TraversalQuery::Favorites, &anonymous)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_traversal_rows() {
        let store = build_test_store();
        let mut session = store.session().await.unwrap();

        let params = TraversalParams::new("603")
            .with_user(Some("42"))
            .with_favorites(vec!["604".to_string()]);
        let rows = session
            .run_traversal(TraversalQuery::Recommend(Algorithm::WeightedContent), &params)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("score"), Some(&GraphValue::Float(5.0)));
        assert_eq!(rows[0].get("favorite"), Some(&GraphValue::Boolean(true)));
        match rows[0].get("movie") {
            Some(GraphValue::Node(node)) => {
                assert_eq!(node.properties["tmdbId"], GraphValue::from("604"));
            }
            other => panic!("unexpected movie column {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recommend_unknown_seed() {
        let store = build_test_store();
        let mut session = store.session().await.unwrap();

        let err = session
            .run_traversal(
                TraversalQuery::Recommend(Algorithm::JaccardIndex),
                &TraversalParams::new("nope"),
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::SeedNotFound("nope".to_string()));
    }
}
