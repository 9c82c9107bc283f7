//! Collapse repeated movies to one candidate.
//!
//! Collaborative sources emit one movie per neighbor, so the same movie can
//! arrive several times. Run after ranking: the first occurrence is the
//! best-scored one and is the one kept. Scores are not summed across
//! occurrences.

use crate::context::RequestContext;
use crate::traits::Stage;
use anyhow::Result;
use similarity::Candidate;
use std::collections::HashSet;

pub struct DedupByMovie;

impl Stage for DedupByMovie {
    fn name(&self) -> &str {
        "DedupByMovie"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &RequestContext,
    ) -> Result<Vec<Candidate>> {
        let mut seen = HashSet::with_capacity(candidates.len());
        let deduped: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.movie_id.clone()))
            .collect();
        Ok(deduped)
    }
}
