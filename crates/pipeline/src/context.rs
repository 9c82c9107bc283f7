//! Per-request state shared by every stage.

use crate::pagination::Pagination;
use movie_graph::{MovieId, UserId};
use std::collections::HashSet;

/// Everything a stage may need to know about the request being served.
///
/// The favorites set is fetched once, before scoring, and then only read.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<UserId>,
    pub favorites: HashSet<MovieId>,
    pub pagination: Pagination,
}

impl RequestContext {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }

    /// Blank ids count as no requester
    pub fn with_user(mut self, user_id: Option<&str>) -> Self {
        self.user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_favorites(mut self, favorites: impl IntoIterator<Item = MovieId>) -> Self {
        self.favorites = favorites.into_iter().collect();
        self
    }

    /// Whether `movie_id` should be flagged as a favorite for this request
    pub fn is_favorite(&self, movie_id: &str) -> bool {
        self.user_id.is_some() && self.favorites.contains(movie_id)
    }
}
