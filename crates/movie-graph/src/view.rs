//! The adjacency interface traversals are written against.
//!
//! Similarity algorithms only ever need to follow typed edges from a node
//! and read a few properties, so that is all [`GraphView`] exposes. The
//! in-memory [`GraphIndex`] implements it; any other backend that can
//! answer these lookups can drive the same algorithms.

use crate::types::{GraphIndex, Movie, MovieId, Rating, Relation};

/// Read-only access to the movie graph.
///
/// Slices are returned in the backend's natural edge order. Algorithms rely
/// on that order for tie-breaking, so implementations must keep it stable
/// for a given snapshot.
pub trait GraphView: Send + Sync {
    /// Look up a movie by its catalog id
    fn movie(&self, id: &str) -> Option<&Movie>;

    /// Whether a user node exists
    fn has_user(&self, id: &str) -> bool;

    /// Distinct entity ids linked to `movie_id` through `relation`
    fn linked(&self, movie_id: &str, relation: Relation) -> &[String];

    /// Movies linked to `entity` through `relation`
    fn movies_linked_to(&self, relation: Relation, entity: &str) -> &[MovieId];

    /// Display name of an intermediate entity (genre name or person name)
    fn entity_name<'a>(&'a self, relation: Relation, entity: &'a str) -> Option<&'a str>;

    /// RATED edges leaving a user
    fn ratings_by(&self, user_id: &str) -> &[Rating];

    /// RATED edges arriving at a movie
    fn ratings_of(&self, movie_id: &str) -> &[Rating];

    /// FAVORITE edges leaving a user
    fn favorites_of(&self, user_id: &str) -> &[MovieId];
}

impl GraphView for GraphIndex {
    fn movie(&self, id: &str) -> Option<&Movie> {
        self.get_movie(id)
    }

    fn has_user(&self, id: &str) -> bool {
        GraphIndex::has_user(self, id)
    }

    fn linked(&self, movie_id: &str, relation: Relation) -> &[String] {
        self.get_links(movie_id, relation)
    }

    fn movies_linked_to(&self, relation: Relation, entity: &str) -> &[MovieId] {
        self.get_linked_movies(relation, entity)
    }

    fn entity_name<'a>(&'a self, relation: Relation, entity: &'a str) -> Option<&'a str> {
        if relation.is_person() {
            self.get_person(entity).map(|person| person.name.as_str())
        } else if self.has_genre(entity) {
            Some(entity)
        } else {
            None
        }
    }

    fn ratings_by(&self, user_id: &str) -> &[Rating] {
        self.get_user_ratings(user_id)
    }

    fn ratings_of(&self, movie_id: &str) -> &[Rating] {
        self.get_movie_ratings(movie_id)
    }

    fn favorites_of(&self, user_id: &str) -> &[MovieId] {
        self.get_favorites(user_id)
    }
}
