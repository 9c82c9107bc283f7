//! # Similarity Crate
//!
//! The recommendation algorithms, each a traversal + aggregation pipeline
//! over the [`movie_graph::GraphView`] adjacency interface.
//!
//! ## Components
//!
//! ### Content-based (seed = movie)
//! - **WeightedContent**: 5 × shared genres + 3 × shared actors + 4 × shared directors
//! - **JaccardIndex**: shared entities over the union of genre/cast/director names
//!
//! ### Collaborative (seed = requesting user)
//! - **CosineSimilarity**: cosine of co-rated rating vectors
//! - **PearsonSimilarity**: Pearson correlation of co-rated ratings
//!
//! Both collaborative sources only trust neighbors with more than 10
//! co-rated movies, and recommend each neighbor's top-rated movie the
//! requester hasn't rated.
//!
//! The formulas themselves live in [`scoring`] as plain functions.
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{Algorithm, Seed, SimilarityEngine};
//!
//! let engine = SimilarityEngine::new();
//! let seed = Seed::movie("603").with_user(Some("42"));
//! let candidates = engine.score(Algorithm::WeightedContent, &graph, &seed)?;
//! ```
//!
//! Candidates come back unranked, in traversal order; ranking, favorites
//! and pagination are applied by the `pipeline` crate.

pub mod collaborative;
pub mod content;
pub mod engine;
pub mod scoring;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use collaborative::{CosineSimilarity, MeanBasis, PearsonSimilarity, DEFAULT_MIN_CO_RATED};
pub use content::{JaccardIndex, WeightedContent};
pub use engine::SimilarityEngine;
pub use scoring::ContentWeights;
pub use traits::SimilaritySource;
pub use types::{Algorithm, Candidate, CandidateMetadata, Seed, SimilarityError};

#[cfg(test)]
mod tests {
    use super::*;
    use movie_graph::{GraphIndex, Movie, Relation};

    fn create_test_index() -> GraphIndex {
        let mut index = GraphIndex::new();
        index.insert_movie(Movie::new("1", "Test Movie"));
        index.insert_movie(Movie::new("2", "Other Movie"));
        index.link(Relation::InGenre, "Action", "1");
        index.link(Relation::InGenre, "Action", "2");
        index
    }

    #[test]
    fn test_engine_dispatch() {
        let engine = SimilarityEngine::new();
        for algorithm in Algorithm::ALL {
            assert!(!engine.source(algorithm).name().is_empty());
        }
    }

    #[test]
    fn test_engine_scores_content() {
        let index = create_test_index();
        let engine = SimilarityEngine::new();
        let candidates = engine
            .score(Algorithm::WeightedContent, &index, &Seed::movie("1"))
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].movie_id, "2");
        assert_eq!(candidates[0].score, 5.0);
        assert!(!candidates[0].favorite);
    }

    #[test]
    fn test_engine_collaborative_without_user() {
        let index = create_test_index();
        let engine = SimilarityEngine::new();
        for algorithm in [Algorithm::CosineSimilarity, Algorithm::PearsonSimilarity] {
            let candidates = engine.score(algorithm, &index, &Seed::movie("1")).unwrap();
            assert!(candidates.is_empty());
        }
    }

    #[test]
    fn test_candidate_creation() {
        let candidate = Candidate::new(
            "603",
            0.85,
            CandidateMetadata::Overlap {
                intersection: 1,
                union: 2,
            },
        );
        assert_eq!(candidate.movie_id, "603");
        assert_eq!(candidate.score, 0.85);
        assert!(!candidate.favorite);
    }
}
