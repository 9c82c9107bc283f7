//! Errors surfaced to callers of the recommendation service.
//!
//! An empty result is not an error: collaborative algorithms without a
//! requester, or without qualifying neighbors, return an empty list.

use movie_graph::MovieId;
use pipeline::NormalizeError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    /// The seed movie does not exist; a client-side "no such item"
    #[error("No such movie: {0}")]
    NotFound(MovieId),

    /// The graph store could not open a session or run a traversal
    #[error("Graph backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Failed to normalize result: {0}")]
    Normalize(#[from] NormalizeError),
}

impl RecommendationError {
    /// Whether the same request may succeed if sent again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecommendationError::BackendUnavailable(_))
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RecommendationError::NotFound(_))
    }
}

impl From<StoreError> for RecommendationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SeedNotFound(id) => RecommendationError::NotFound(id),
            other => RecommendationError::BackendUnavailable(other.to_string()),
        }
    }
}

pub type RecommendationResult<T> = std::result::Result<T, RecommendationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err = RecommendationError::from(StoreError::SeedNotFound("603".to_string()));
        assert_eq!(err, RecommendationError::NotFound("603".to_string()));
        assert!(err.is_client_error());
        assert!(!err.is_retryable());

        let err = RecommendationError::from(StoreError::Traversal {
            query: "jaccard-index".to_string(),
            reason: "boom".to_string(),
        });
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Graph backend unavailable: Traversal jaccard-index failed: boom"
        );
    }

    #[test]
    fn test_normalize_error_is_not_retryable() {
        let err = RecommendationError::from(NormalizeError::MissingColumn("score".to_string()));
        assert!(!err.is_retryable());
        assert!(!err.is_client_error());
    }
}
