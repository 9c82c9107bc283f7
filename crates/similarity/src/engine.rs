//! Dispatch from an [`Algorithm`] descriptor to its configured source.

use crate::collaborative::{CosineSimilarity, MeanBasis, PearsonSimilarity};
use crate::content::{JaccardIndex, WeightedContent};
use crate::scoring::ContentWeights;
use crate::traits::SimilaritySource;
use crate::types::{Algorithm, Candidate, Result, Seed};
use movie_graph::GraphView;
use std::time::Instant;
use tracing::{debug, instrument};

/// Holds one configured source per algorithm.
///
/// The engine has no per-request state, so a single instance can be shared
/// across threads and requests.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    weighted: WeightedContent,
    jaccard: JaccardIndex,
    cosine: CosineSimilarity,
    pearson: PearsonSimilarity,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Co-rated threshold for both collaborative algorithms (default: 10, strict)
    pub fn with_min_co_rated(mut self, min: usize) -> Self {
        self.cosine = self.cosine.with_min_co_rated(min);
        self.pearson = self.pearson.with_min_co_rated(min);
        self
    }

    pub fn with_mean_basis(mut self, basis: MeanBasis) -> Self {
        self.pearson = self.pearson.with_mean_basis(basis);
        self
    }

    pub fn with_content_weights(mut self, weights: ContentWeights) -> Self {
        self.weighted = self.weighted.with_weights(weights);
        self
    }

    pub fn source(&self, algorithm: Algorithm) -> &dyn SimilaritySource {
        match algorithm {
            Algorithm::WeightedContent => &self.weighted,
            Algorithm::JaccardIndex => &self.jaccard,
            Algorithm::CosineSimilarity => &self.cosine,
            Algorithm::PearsonSimilarity => &self.pearson,
        }
    }

    /// Run one algorithm and return its candidates in traversal order
    #[instrument(skip(self, graph), fields(algorithm = %algorithm))]
    pub fn score(
        &self,
        algorithm: Algorithm,
        graph: &dyn GraphView,
        seed: &Seed,
    ) -> Result<Vec<Candidate>> {
        let start = Instant::now();
        let source = self.source(algorithm);
        let candidates = source.candidates(graph, seed)?;
        debug!(
            "{} scored {} candidates in {:.2?}",
            source.name(),
            candidates.len(),
            start.elapsed()
        );
        Ok(candidates)
    }
}
