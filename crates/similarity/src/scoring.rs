//! Scoring formulas, free of any graph access.
//!
//! Each traversal gathers counts or rating pairs and hands them to one of
//! these functions. Every formula that divides returns `None` instead of a
//! non-finite score; callers drop the candidate in that case.

use std::collections::HashSet;
use std::hash::Hash;

/// Distinct intermediate entities a candidate shares with the seed movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SharedCounts {
    pub genres: usize,
    pub actors: usize,
    pub directors: usize,
}

impl SharedCounts {
    pub fn is_empty(&self) -> bool {
        self.genres == 0 && self.actors == 0 && self.directors == 0
    }
}

/// Per-relation weights for weighted content scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentWeights {
    pub genre: u32,
    pub actor: u32,
    pub director: u32,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            genre: 5,
            actor: 3,
            director: 4,
        }
    }
}

/// weights.genre × genres + weights.actor × actors + weights.director × directors
pub fn weighted_content_score(shared: SharedCounts, weights: ContentWeights) -> u64 {
    weights.genre as u64 * shared.genres as u64
        + weights.actor as u64 * shared.actors as u64
        + weights.director as u64 * shared.directors as u64
}

/// Size of `set1 ∪ set2` computed as |set1| + |set2 \ set1|
pub fn union_size<T: Eq + Hash>(set1: &HashSet<T>, set2: &HashSet<T>) -> usize {
    set1.len() + set2.iter().filter(|item| !set1.contains(*item)).count()
}

/// intersection / union, capped at 1.0. `None` when the union is empty.
pub fn jaccard_score(intersection: usize, union: usize) -> Option<f64> {
    if union == 0 {
        return None;
    }
    Some((intersection as f64 / union as f64).min(1.0))
}

/// Euclidean norm of a rating vector
pub fn norm(values: impl Iterator<Item = f64>) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt()
}

/// Cosine similarity of two co-rated vectors given as (requester, neighbor) pairs.
/// `None` when either vector has zero length.
pub fn cosine_score(pairs: &[(f32, f32)]) -> Option<f64> {
    let dot: f64 = pairs.iter().map(|&(x, y)| x as f64 * y as f64).sum();
    let x_len = norm(pairs.iter().map(|&(x, _)| x as f64));
    let y_len = norm(pairs.iter().map(|&(_, y)| y as f64));

    let denom = x_len * y_len;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(dot / denom)
}

/// Arithmetic mean, `None` for an empty input
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Pearson correlation of co-rated (requester, neighbor) pairs around the
/// given means. `None` when the denominator is zero.
pub fn pearson_score(pairs: &[(f32, f32)], mean1: f64, mean2: f64) -> Option<f64> {
    let mut nom = 0.0;
    let mut sq1 = 0.0;
    let mut sq2 = 0.0;
    for &(r1, r2) in pairs {
        let d1 = r1 as f64 - mean1;
        let d2 = r2 as f64 - mean2;
        nom += d1 * d2;
        sq1 += d1 * d1;
        sq2 += d2 * d2;
    }

    let denom = (sq1 * sq2).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(nom / denom)
}
