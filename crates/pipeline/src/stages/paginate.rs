//! Trim ranked candidates to the requested window.

use crate::context::RequestContext;
use crate::traits::Stage;
use anyhow::Result;
use similarity::Candidate;

pub struct Paginate;

impl Stage for Paginate {
    fn name(&self) -> &str {
        "Paginate"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &RequestContext,
    ) -> Result<Vec<Candidate>> {
        Ok(context.pagination.slice(candidates))
    }
}
