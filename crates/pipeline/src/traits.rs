//! Core traits for the post-scoring pipeline.
//!
//! This module defines the Stage trait that lets ranking, annotation and
//! pagination steps be composed in any order.

use crate::context::RequestContext;
use anyhow::Result;
use similarity::Candidate;

/// One step applied to the scored candidates of a request.
///
/// ## Design Note
/// - `Send + Sync` allows a pipeline to be shared across request tasks
/// - Stages take ownership of the Vec<Candidate> and return the new Vec,
///   so reordering and truncation need no cloning
pub trait Stage: Send + Sync {
    /// Returns the name of this stage (for logging/debugging)
    fn name(&self) -> &str;

    fn apply(&self, candidates: Vec<Candidate>, context: &RequestContext)
    -> Result<Vec<Candidate>>;
}
