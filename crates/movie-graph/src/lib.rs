//! # Movie Graph Crate
//!
//! The property graph the recommendation algorithms read from: movies,
//! genres, people and users, connected by IN_GENRE, ACTED_IN, DIRECTED,
//! RATED and FAVORITE edges.
//!
//! ## Main Components
//!
//! - **types**: Nodes, edges and the in-memory [`GraphIndex`]
//! - **view**: The [`GraphView`] adjacency interface traversals run against
//! - **parser**: Parse `::`-separated snapshot files
//! - **index**: Build and validate a [`GraphIndex`] from a snapshot directory
//! - **value**: Graph-native values ([`GraphValue`], [`Row`]) returned by traversals
//! - **error**: Error types for snapshot loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use movie_graph::{GraphIndex, GraphView, Relation};
//! use std::path::Path;
//!
//! let graph = GraphIndex::load_from_dir(Path::new("data/recommendations"))?;
//! let matrix = graph.movie("603").unwrap();
//! let genres = graph.linked("603", Relation::InGenre);
//! println!("{} is in {} genres", matrix.title, genres.len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;
pub mod value;
pub mod view;

pub use error::{GraphError, Result};
pub use types::{
    EntityKey, GraphCounts, GraphIndex, Movie, MovieId, Person, PersonId, Rating, Relation,
    UserId,
};
pub use value::{GraphValue, Node, Relationship, Row};
pub use view::GraphView;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_index_creation() {
        let index = GraphIndex::new();
        assert_eq!(index.counts(), GraphCounts::default());
    }

    #[test]
    fn test_link_is_bidirectional() {
        let mut index = GraphIndex::new();
        index.insert_movie(Movie::new("603", "The Matrix"));
        index.insert_person(Person {
            id: "p1".to_string(),
            name: "Keanu Reeves".to_string(),
        });

        assert!(index.link(Relation::ActedIn, "p1", "603"));
        // Second role in the same movie is the same edge
        assert!(!index.link(Relation::ActedIn, "p1", "603"));

        assert_eq!(index.linked("603", Relation::ActedIn).len(), 1);
        assert_eq!(index.movies_linked_to(Relation::ActedIn, "p1").len(), 1);
        assert_eq!(index.entity_name(Relation::ActedIn, "p1"), Some("Keanu Reeves"));
    }

    #[test]
    fn test_genre_names() {
        let mut index = GraphIndex::new();
        index.insert_movie(Movie::new("603", "The Matrix"));
        index.link(Relation::InGenre, "Action", "603");

        assert!(index.has_genre("Action"));
        assert_eq!(index.entity_name(Relation::InGenre, "Action"), Some("Action"));
        assert_eq!(index.entity_name(Relation::InGenre, "Western"), None);
    }

    #[test]
    fn test_empty_queries() {
        let index = GraphIndex::new();

        // Querying non-existent data should return None or empty slices
        assert!(index.movie("999").is_none());
        assert!(!GraphView::has_user(&index, "nobody"));
        assert!(index.ratings_by("nobody").is_empty());
        assert!(index.ratings_of("999").is_empty());
        assert!(index.linked("999", Relation::InGenre).is_empty());
        assert!(index.favorites_of("nobody").is_empty());
    }

    #[test]
    fn test_insert_rating() {
        let mut index = GraphIndex::new();
        index.insert_movie(Movie::new("603", "The Matrix"));
        index.insert_rating(Rating {
            user_id: "u1".to_string(),
            movie_id: "603".to_string(),
            rating: 5.0,
            timestamp: 978300760,
        });

        assert!(index.has_user("u1"));
        assert_eq!(index.get_user_ratings("u1")[0].rating, 5.0);
        assert_eq!(index.get_movie_ratings("603").len(), 1);
    }
}
