//! Flag candidates that are in the requester's favorites.

use crate::context::RequestContext;
use crate::traits::Stage;
use anyhow::Result;
use similarity::Candidate;

/// Stamps `favorite` on every candidate from the favorites set prefetched
/// into the request context. Without a requester every flag is false.
pub struct FavoritesAnnotator;

impl Stage for FavoritesAnnotator {
    fn name(&self) -> &str {
        "FavoritesAnnotator"
    }

    fn apply(
        &self,
        mut candidates: Vec<Candidate>,
        context: &RequestContext,
    ) -> Result<Vec<Candidate>> {
        for candidate in &mut candidates {
            candidate.favorite = context.is_favorite(&candidate.movie_id);
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similarity::CandidateMetadata;

    fn candidates() -> Vec<Candidate> {
        ["603", "604", "605"]
            .into_iter()
            .map(|id| {
                Candidate::new(
                    id,
                    1.0,
                    CandidateMetadata::SharedContent {
                        genres: 1,
                        actors: 0,
                        directors: 0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_annotates_favorites() {
        let context = RequestContext::default()
            .with_user(Some("42"))
            .with_favorites(vec!["604".to_string(), "999".to_string()]);

        let annotated = FavoritesAnnotator.apply(candidates(), &context).unwrap();
        let flags: Vec<bool> = annotated.iter().map(|c| c.favorite).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_no_user_means_no_favorites() {
        let context = RequestContext::default().with_favorites(vec!["604".to_string()]);

        let mut input = candidates();
        input[1].favorite = true;
        let annotated = FavoritesAnnotator.apply(input, &context).unwrap();
        assert!(annotated.iter().all(|c| !c.favorite));
    }
}
