//! Order candidates by score, highest first.

use crate::context::RequestContext;
use crate::traits::Stage;
use anyhow::Result;
use similarity::Candidate;

/// Stable descending sort by score.
///
/// Equal scores keep the order the traversal produced them in; no
/// secondary key is applied.
pub struct RankByScore;

impl Stage for RankByScore {
    fn name(&self) -> &str {
        "RankByScore"
    }

    fn apply(
        &self,
        mut candidates: Vec<Candidate>,
        _context: &RequestContext,
    ) -> Result<Vec<Candidate>> {
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(candidates)
    }
}
