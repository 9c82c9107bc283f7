//! User-user collaborative filtering: recommend what similar raters loved.
//!
//! ## Algorithm
//! 1. Walk requester -> RATED -> movie <- RATED <- other user, collecting
//!    (requester rating, neighbor rating) pairs per neighbor
//! 2. Keep neighbors with strictly more than `min_co_rated` co-rated movies
//! 3. Score each neighbor (cosine or Pearson), in parallel with Rayon
//! 4. For every scored neighbor, emit the neighbor's highest-rated movie the
//!    requester has not rated, carrying the neighbor's score
//!
//! Without a requesting user, or for a user with no qualifying neighbors,
//! the result is empty rather than an error.

use crate::scoring;
use crate::traits::SimilaritySource;
use crate::types::{Candidate, CandidateMetadata, Result, Seed};
use movie_graph::{GraphView, Rating, UserId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Neighbors need strictly more co-rated movies than this
pub const DEFAULT_MIN_CO_RATED: usize = 10;

/// Which ratings the requester's mean is taken over in Pearson scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeanBasis {
    /// Only the movies co-rated with the neighbor being scored
    #[default]
    CoRated,
    /// Every movie the requester has rated
    FullHistory,
}

/// Another user who rated some of the same movies as the requester
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    /// (requester rating, neighbor rating) per co-rated movie
    pub pairs: Vec<(f32, f32)>,
}

impl Neighbor {
    pub fn co_rated(&self) -> usize {
        self.pairs.len()
    }
}

/// Collect every user sharing at least one rated movie with `user_id`, in
/// the order they are first reached.
pub fn co_rated_neighbors(graph: &dyn GraphView, user_id: &str) -> Vec<Neighbor> {
    let mut neighbors: Vec<Neighbor> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for mine in graph.ratings_by(user_id) {
        for theirs in graph.ratings_of(&mine.movie_id) {
            if theirs.user_id == user_id {
                continue;
            }
            let position = *positions.entry(theirs.user_id.as_str()).or_insert_with(|| {
                neighbors.push(Neighbor {
                    user_id: theirs.user_id.clone(),
                    pairs: Vec::new(),
                });
                neighbors.len() - 1
            });
            neighbors[position].pairs.push((mine.rating, theirs.rating));
        }
    }
    neighbors
}

/// The neighbor's highest-rated movie that is not in `seen`.
/// Equal ratings resolve to the one listed first.
pub fn top_unseen_movie<'a>(
    graph: &'a dyn GraphView,
    neighbor_id: &str,
    seen: &HashSet<&str>,
) -> Option<&'a Rating> {
    graph
        .ratings_by(neighbor_id)
        .iter()
        .filter(|rating| !seen.contains(rating.movie_id.as_str()))
        .fold(None, |best: Option<&Rating>, rating| match best {
            Some(current) if current.rating >= rating.rating => Some(current),
            _ => Some(rating),
        })
}

/// Shared neighbor pipeline for both collaborative sources
fn recommend_from_neighbors<F>(
    graph: &dyn GraphView,
    seed: &Seed,
    min_co_rated: usize,
    score: F,
) -> Vec<Candidate>
where
    F: Fn(&Neighbor) -> Option<f64> + Sync,
{
    let Some(user_id) = seed.user_id.as_deref() else {
        debug!("No requesting user, returning no candidates");
        return Vec::new();
    };
    if !graph.has_user(user_id) {
        debug!("Unknown user {}, returning no candidates", user_id);
        return Vec::new();
    }

    let neighbors: Vec<Neighbor> = co_rated_neighbors(graph, user_id)
        .into_iter()
        .filter(|neighbor| neighbor.co_rated() > min_co_rated)
        .collect();
    debug!(
        "User {} has {} neighbors with more than {} co-rated movies",
        user_id,
        neighbors.len(),
        min_co_rated
    );

    // Order-preserving parallel map
    let scores: Vec<Option<f64>> = neighbors
        .par_iter()
        .map(|neighbor| score(neighbor))
        .collect();

    let seen: HashSet<&str> = graph
        .ratings_by(user_id)
        .iter()
        .map(|rating| rating.movie_id.as_str())
        .collect();

    neighbors
        .iter()
        .zip(scores)
        .filter_map(|(neighbor, score)| {
            let score = score?;
            let movie = top_unseen_movie(graph, &neighbor.user_id, &seen)?;
            Some(Candidate::new(
                movie.movie_id.clone(),
                score,
                CandidateMetadata::Neighbor {
                    user_id: neighbor.user_id.clone(),
                    co_rated: neighbor.co_rated(),
                },
            ))
        })
        .collect()
}

// =============================================================================
// Cosine
// =============================================================================

/// Neighbors scored by the cosine of co-rated rating vectors
#[derive(Debug, Clone)]
pub struct CosineSimilarity {
    min_co_rated: usize,
}

impl CosineSimilarity {
    pub fn new() -> Self {
        Self {
            min_co_rated: DEFAULT_MIN_CO_RATED,
        }
    }

    /// Configure the co-rated threshold; neighbors need strictly more (default: 10)
    pub fn with_min_co_rated(mut self, min: usize) -> Self {
        self.min_co_rated = min;
        self
    }
}

impl Default for CosineSimilarity {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilaritySource for CosineSimilarity {
    fn name(&self) -> &str {
        "CosineSimilarity"
    }

    #[instrument(skip(self, graph), fields(user = ?seed.user_id))]
    fn candidates(&self, graph: &dyn GraphView, seed: &Seed) -> Result<Vec<Candidate>> {
        let candidates = recommend_from_neighbors(graph, seed, self.min_co_rated, |neighbor| {
            scoring::cosine_score(&neighbor.pairs)
        });
        debug!("Cosine similarity produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

// =============================================================================
// Pearson
// =============================================================================

/// Neighbors scored by Pearson correlation of co-rated ratings
#[derive(Debug, Clone)]
pub struct PearsonSimilarity {
    min_co_rated: usize,
    mean_basis: MeanBasis,
}

impl PearsonSimilarity {
    pub fn new() -> Self {
        Self {
            min_co_rated: DEFAULT_MIN_CO_RATED,
            mean_basis: MeanBasis::default(),
        }
    }

    /// Configure the co-rated threshold; neighbors need strictly more (default: 10)
    pub fn with_min_co_rated(mut self, min: usize) -> Self {
        self.min_co_rated = min;
        self
    }

    /// Configure which ratings the requester's mean covers (default: co-rated)
    pub fn with_mean_basis(mut self, basis: MeanBasis) -> Self {
        self.mean_basis = basis;
        self
    }
}

impl Default for PearsonSimilarity {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilaritySource for PearsonSimilarity {
    fn name(&self) -> &str {
        "PearsonSimilarity"
    }

    #[instrument(skip(self, graph), fields(user = ?seed.user_id))]
    fn candidates(&self, graph: &dyn GraphView, seed: &Seed) -> Result<Vec<Candidate>> {
        let full_history_mean = match (self.mean_basis, seed.user_id.as_deref()) {
            (MeanBasis::FullHistory, Some(user_id)) => {
                scoring::mean(graph.ratings_by(user_id).iter().map(|r| r.rating as f64))
            }
            _ => None,
        };

        let candidates = recommend_from_neighbors(graph, seed, self.min_co_rated, |neighbor| {
            let requester_mean = match self.mean_basis {
                MeanBasis::CoRated => scoring::mean(neighbor.pairs.iter().map(|&(r1, _)| r1 as f64))?,
                MeanBasis::FullHistory => full_history_mean?,
            };
            // The neighbor's mean always covers their whole rating history
            let neighbor_mean = scoring::mean(
                graph
                    .ratings_by(&neighbor.user_id)
                    .iter()
                    .map(|r| r.rating as f64),
            )?;
            scoring::pearson_score(&neighbor.pairs, requester_mean, neighbor_mean)
        });
        debug!("Pearson similarity produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_graph::{GraphIndex, Movie};

    fn rate(index: &mut GraphIndex, user: &str, movie: &str, rating: f32) {
        if index.get_movie(movie).is_none() {
            index.insert_movie(Movie::new(movie, format!("Movie {}", movie)));
        }
        index.insert_rating(Rating {
            user_id: user.to_string(),
            movie_id: movie.to_string(),
            rating,
            timestamp: 0,
        });
    }

    fn base_rating(i: usize) -> f32 {
        (i % 5) as f32 + 1.0
    }

    /// u1 rates m1..m12.
    /// u2 agrees with u1 on m1..m11 (11 co-rated) and loves x1.
    /// u3 agrees with u1 on m1..m10 only (10 co-rated) and loves y1.
    /// u4 disagrees with u1 on m1..m11 and loves z1 then x2 equally.
    /// u5 rated exactly what u1 rated, so has nothing unseen to offer.
    fn create_test_index() -> GraphIndex {
        let mut index = GraphIndex::new();
        for i in 1..=12 {
            rate(&mut index, "u1", &format!("m{}", i), base_rating(i));
        }
        for i in 1..=11 {
            rate(&mut index, "u2", &format!("m{}", i), base_rating(i));
        }
        rate(&mut index, "u2", "x1", 5.0);
        rate(&mut index, "u2", "x2", 4.0);

        for i in 1..=10 {
            rate(&mut index, "u3", &format!("m{}", i), base_rating(i));
        }
        rate(&mut index, "u3", "y1", 5.0);

        for i in 1..=11 {
            rate(&mut index, "u4", &format!("m{}", i), 6.0 - base_rating(i));
        }
        rate(&mut index, "u4", "z1", 5.0);
        rate(&mut index, "u4", "x2", 5.0);

        for i in 1..=12 {
            rate(&mut index, "u5", &format!("m{}", i), base_rating(i));
        }
        index
    }

    fn seed(user: Option<&str>) -> Seed {
        Seed::movie("ignored").with_user(user)
    }

    fn neighbor_of(candidate: &Candidate) -> &str {
        match &candidate.metadata {
            CandidateMetadata::Neighbor { user_id, .. } => user_id.as_str(),
            other => panic!("unexpected metadata {:?}", other),
        }
    }

    #[test]
    fn test_co_rated_neighbors() {
        let index = create_test_index();
        let neighbors = co_rated_neighbors(&index, "u1");
        let counts: Vec<(&str, usize)> = neighbors
            .iter()
            .map(|n| (n.user_id.as_str(), n.co_rated()))
            .collect();
        assert_eq!(counts, vec![("u2", 11), ("u3", 10), ("u4", 11), ("u5", 12)]);
    }

    #[test]
    fn test_top_unseen_movie_tie_break() {
        let index = create_test_index();
        let seen: HashSet<&str> = index.get_user_ratings("u1").iter().map(|r| r.movie_id.as_str()).collect();

        assert_eq!(top_unseen_movie(&index, "u2", &seen).unwrap().movie_id, "x1");
        // z1 and x2 are both rated 5.0; z1 was rated first
        assert_eq!(top_unseen_movie(&index, "u4", &seen).unwrap().movie_id, "z1");
        assert!(top_unseen_movie(&index, "u5", &seen).is_none());
    }

    #[test]
    fn test_cosine_requires_user() {
        let index = create_test_index();
        assert!(CosineSimilarity::new().candidates(&index, &seed(None)).unwrap().is_empty());
        assert!(CosineSimilarity::new().candidates(&index, &seed(Some("ghost"))).unwrap().is_empty());
    }

    #[test]
    fn test_cosine_threshold_is_strict() {
        let index = create_test_index();
        let candidates = CosineSimilarity::new().candidates(&index, &seed(Some("u1"))).unwrap();

        let neighbors: Vec<&str> = candidates.iter().map(neighbor_of).collect();
        assert_eq!(neighbors, vec!["u2", "u4"]);
        assert!(candidates.iter().all(|c| c.movie_id != "y1"));

        // Identical co-rated vectors
        assert_eq!(candidates[0].movie_id, "x1");
        assert!((candidates[0].score - 1.0).abs() < 1e-9);
        assert!(candidates[1].score < candidates[0].score);
    }

    #[test]
    fn test_lower_threshold_admits_neighbor() {
        let index = create_test_index();
        let candidates = CosineSimilarity::new()
            .with_min_co_rated(9)
            .candidates(&index, &seed(Some("u1")))
            .unwrap();
        assert!(candidates.iter().any(|c| c.movie_id == "y1"));
    }

    #[test]
    fn test_pearson_signs() {
        let index = create_test_index();
        let candidates = PearsonSimilarity::new().candidates(&index, &seed(Some("u1"))).unwrap();

        let by_neighbor: HashMap<&str, f64> = candidates
            .iter()
            .map(|c| (neighbor_of(c), c.score))
            .collect();
        assert_eq!(by_neighbor.len(), 2);
        assert!(by_neighbor["u2"] > 0.0);
        assert!(by_neighbor["u4"] < 0.0);
        assert!(!by_neighbor.contains_key("u3"));
    }

    #[test]
    fn test_pearson_requires_user() {
        let index = create_test_index();
        assert!(PearsonSimilarity::new().candidates(&index, &seed(None)).unwrap().is_empty());
    }

    #[test]
    fn test_pearson_full_history_mean() {
        let index = create_test_index();
        let co_rated = PearsonSimilarity::new().candidates(&index, &seed(Some("u1"))).unwrap();
        let full = PearsonSimilarity::new()
            .with_mean_basis(MeanBasis::FullHistory)
            .candidates(&index, &seed(Some("u1")))
            .unwrap();

        assert_eq!(co_rated.len(), full.len());
        // u1's full history includes m12, so its mean differs from the co-rated mean
        assert_ne!(co_rated[0].score, full[0].score);
    }

    #[test]
    fn test_pearson_zero_variance_neighbor_excluded() {
        let mut index = GraphIndex::new();
        for i in 1..=11 {
            rate(&mut index, "u1", &format!("m{}", i), base_rating(i));
            rate(&mut index, "flat", &format!("m{}", i), 3.0);
        }
        rate(&mut index, "flat", "extra", 3.0);

        let candidates = PearsonSimilarity::new().candidates(&index, &seed(Some("u1"))).unwrap();
        assert!(candidates.is_empty());
    }
}
