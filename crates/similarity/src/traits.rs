//! The trait every similarity traversal implements.

use crate::types::{Candidate, Result, Seed};
use movie_graph::GraphView;

/// A traversal + aggregation pipeline that turns a seed into scored candidates.
///
/// Candidates are returned in traversal order, unranked and unpaginated.
/// That order is the tie-break for equal scores, so implementations must
/// produce it deterministically from the graph's edge order.
pub trait SimilaritySource: Send + Sync {
    /// Returns the name of this source (for logging/debugging)
    fn name(&self) -> &str;

    fn candidates(&self, graph: &dyn GraphView, seed: &Seed) -> Result<Vec<Candidate>>;
}
