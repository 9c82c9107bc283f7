//! The StagePipeline runs stages in sequence.
//!
//! This module provides the StagePipeline struct that chains stages
//! together using the builder pattern.

use crate::context::RequestContext;
use crate::stages::{DedupByMovie, FavoritesAnnotator, Paginate, RankByScore};
use crate::traits::Stage;
use anyhow::Result;
use similarity::Candidate;
use tracing::debug;

/// Chains multiple stages together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = StagePipeline::new()
///     .add_stage(RankByScore)
///     .add_stage(DedupByMovie)
///     .add_stage(FavoritesAnnotator)
///     .add_stage(Paginate);
///
/// let page = pipeline.apply(candidates, &context)?;
/// ```
pub struct StagePipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl StagePipeline {
    /// Create a new empty StagePipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The stages every recommendation goes through: rank, dedup by movie,
    /// annotate favorites, then cut the requested page.
    pub fn recommendation() -> Self {
        Self::new()
            .add_stage(RankByScore)
            .add_stage(DedupByMovie)
            .add_stage(FavoritesAnnotator)
            .add_stage(Paginate)
    }

    /// Add a stage to the pipeline (builder pattern).
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Apply all stages in order, stopping at the first failure.
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &RequestContext,
    ) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for stage in &self.stages {
            debug!(
                "Applying stage: {} (input count: {})",
                stage.name(),
                current.len()
            );
            current = stage.apply(current, context)?;
            debug!(
                "Stage applied: {} (output count: {})",
                stage.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Pagination;
    use similarity::CandidateMetadata;

    fn candidate(id: &str, score: f64) -> Candidate {
        Candidate::new(
            id,
            score,
            CandidateMetadata::Overlap {
                intersection: 1,
                union: 1,
            },
        )
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = StagePipeline::new();
        let context = RequestContext::default();

        let candidates = vec![candidate("1", 0.2), candidate("2", 0.8)];

        let output = pipeline.apply(candidates.clone(), &context).unwrap();
        assert_eq!(output, candidates);
    }

    #[test]
    fn test_recommendation_stage_order() {
        let pipeline = StagePipeline::recommendation();
        assert_eq!(
            pipeline.stage_names(),
            vec!["RankByScore", "DedupByMovie", "FavoritesAnnotator", "Paginate"]
        );
    }

    #[test]
    fn test_recommendation_pipeline() {
        let context = RequestContext::new(Pagination::new(2, 0))
            .with_user(Some("42"))
            .with_favorites(vec!["c".to_string()]);

        let candidates = vec![
            candidate("a", 0.1),
            candidate("c", 0.9),
            candidate("b", 0.5),
            candidate("c", 0.4),
        ];

        let page = StagePipeline::recommendation()
            .apply(candidates, &context)
            .unwrap();
        let ids: Vec<&str> = page.iter().map(|c| c.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert!(page[0].favorite);
        assert!(!page[1].favorite);
    }
}
