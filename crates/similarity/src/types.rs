//! Shared types for the similarity algorithms.

use movie_graph::{MovieId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors a similarity traversal can report.
///
/// Unmet preconditions (no requesting user, no qualifying neighbors) are
/// not errors; they produce an empty candidate list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("Movie {0} not found")]
    SeedNotFound(MovieId),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;

/// The four fixed recommendation traversals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    WeightedContent,
    JaccardIndex,
    CosineSimilarity,
    PearsonSimilarity,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::WeightedContent,
        Algorithm::JaccardIndex,
        Algorithm::CosineSimilarity,
        Algorithm::PearsonSimilarity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::WeightedContent => "weighted-content",
            Algorithm::JaccardIndex => "jaccard-index",
            Algorithm::CosineSimilarity => "cosine-similarity",
            Algorithm::PearsonSimilarity => "pearson-similarity",
        }
    }

    /// Collaborative algorithms score neighbors of the requesting user and
    /// return nothing without one.
    pub fn requires_user(&self) -> bool {
        matches!(self, Algorithm::CosineSimilarity | Algorithm::PearsonSimilarity)
    }
}

/// "Similar movies" without an explicit algorithm uses Pearson
impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::PearsonSimilarity
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted-content" | "weighted" => Ok(Algorithm::WeightedContent),
            "jaccard-index" | "jaccard" => Ok(Algorithm::JaccardIndex),
            "cosine-similarity" | "cosine-similarity-content" | "cosine" => {
                Ok(Algorithm::CosineSimilarity)
            }
            "pearson-similarity" | "pearson-similarity-content" | "pearson" => {
                Ok(Algorithm::PearsonSimilarity)
            }
            other => Err(format!("unknown algorithm: {}", other)),
        }
    }
}

/// What a request is anchored to.
///
/// Content algorithms read `seed_id` as a movie id. Collaborative
/// algorithms ignore it and score around `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub seed_id: MovieId,
    pub user_id: Option<UserId>,
}

impl Seed {
    pub fn movie(seed_id: impl Into<MovieId>) -> Self {
        Self {
            seed_id: seed_id.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<&str>) -> Self {
        // Blank ids count as absent
        self.user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        self
    }
}

/// Why a candidate was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateMetadata {
    /// Distinct shared genres, actors and directors with the seed movie
    SharedContent {
        genres: usize,
        actors: usize,
        directors: usize,
    },
    /// Jaccard terms
    Overlap { intersection: usize, union: usize },
    /// The neighbor whose top unseen movie this is
    Neighbor { user_id: UserId, co_rated: usize },
}

/// A scored recommendation before ranking and pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub movie_id: MovieId,
    pub score: f64,
    pub favorite: bool,
    pub metadata: CandidateMetadata,
}

impl Candidate {
    pub fn new(movie_id: impl Into<MovieId>, score: f64, metadata: CandidateMetadata) -> Self {
        Self {
            movie_id: movie_id.into(),
            score,
            favorite: false,
            metadata,
        }
    }
}
