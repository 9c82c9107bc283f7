//! Core domain types for the movie property graph.
//!
//! The graph has four node kinds (Movie, Person, Genre, User) and five edge
//! kinds (IN_GENRE, ACTED_IN, DIRECTED, RATED, FAVORITE). Nodes are stored in
//! HashMaps keyed by their external id; edges are stored as adjacency lists
//! in both directions so traversals never scan the whole graph.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// External catalog identifier of a movie (the tmdb id, kept as a string)
pub type MovieId = String;

/// Identifier of a user who rates and favorites movies
pub type UserId = String;

/// Identifier of a person (actor or director)
pub type PersonId = String;

// =============================================================================
// Nodes
// =============================================================================

/// A movie node and its scalar properties.
///
/// Genre, cast and director links are not stored here; they live in the
/// adjacency lists of [`GraphIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub tmdb_id: MovieId,
    pub title: String,
    pub released: Option<NaiveDate>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    /// Budget and revenue are raw 64-bit integers and can exceed 2^53
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub imdb_rating: Option<f32>,
    pub languages: Vec<String>,
}

impl Movie {
    /// Creates a movie with only an id and a title
    pub fn new(tmdb_id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            tmdb_id: tmdb_id.into(),
            title: title.into(),
            released: None,
            runtime: None,
            budget: None,
            revenue: None,
            imdb_rating: None,
            languages: Vec::new(),
        }
    }

    /// Release year, derived from the release date
    pub fn year(&self) -> Option<i32> {
        self.released.map(|date| date.year())
    }
}

/// A person who acts in or directs movies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

/// A single RATED edge from a user to a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 1.0 to 5.0
    pub rating: f32,
    /// Unix timestamp when the rating was made
    pub timestamp: i64,
}

// =============================================================================
// Edges between movies and their attributes
// =============================================================================

/// Relations that connect a movie to an intermediate entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Movie -> Genre
    InGenre,
    /// Person -> Movie
    ActedIn,
    /// Person -> Movie
    Directed,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::InGenre, Relation::ActedIn, Relation::Directed];

    /// Edge label as it appears in snapshot files
    pub fn label(&self) -> &'static str {
        match self {
            Relation::InGenre => "IN_GENRE",
            Relation::ActedIn => "ACTED_IN",
            Relation::Directed => "DIRECTED",
        }
    }

    /// Whether the intermediate entity of this relation is a person
    pub fn is_person(&self) -> bool {
        !matches!(self, Relation::InGenre)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An intermediate entity a movie is connected to.
///
/// Genres are keyed by name and people by id, so a person who both acts in
/// and directs movies is one entity regardless of the relation used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Genre(String),
    Person(PersonId),
}

impl EntityKey {
    pub fn for_relation(relation: Relation, id: &str) -> Self {
        if relation.is_person() {
            EntityKey::Person(id.to_string())
        } else {
            EntityKey::Genre(id.to_string())
        }
    }
}

/// Per-movie adjacency: the distinct entities linked through each relation,
/// in the order the links were first inserted.
#[derive(Debug, Clone, Default)]
pub(crate) struct MovieLinks {
    pub(crate) genres: Vec<String>,
    pub(crate) actors: Vec<PersonId>,
    pub(crate) directors: Vec<PersonId>,
}

impl MovieLinks {
    pub(crate) fn get(&self, relation: Relation) -> &[String] {
        match relation {
            Relation::InGenre => &self.genres,
            Relation::ActedIn => &self.actors,
            Relation::Directed => &self.directors,
        }
    }

    fn get_mut(&mut self, relation: Relation) -> &mut Vec<String> {
        match relation {
            Relation::InGenre => &mut self.genres,
            Relation::ActedIn => &mut self.actors,
            Relation::Directed => &mut self.directors,
        }
    }
}

// =============================================================================
// GraphIndex - the in-memory property graph
// =============================================================================

/// Counts of the main node and edge kinds, for logging and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphCounts {
    pub movies: usize,
    pub people: usize,
    pub genres: usize,
    pub users: usize,
    pub ratings: usize,
    pub favorites: usize,
}

/// In-memory property graph with adjacency lists in both directions.
///
/// Movies, people and users are looked up in O(1); every edge kind is
/// indexed from both endpoints so the similarity traversals can walk
/// movie -> entity -> movie and user -> movie -> user paths directly.
#[derive(Debug, Default)]
pub struct GraphIndex {
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) people: HashMap<PersonId, Person>,
    pub(crate) genres: HashSet<String>,
    pub(crate) users: HashSet<UserId>,

    /// Movie -> genres / actors / directors
    pub(crate) movie_links: HashMap<MovieId, MovieLinks>,
    /// (relation, entity) -> movies, in link insertion order
    pub(crate) entity_movies: HashMap<(Relation, String), Vec<MovieId>>,

    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    /// FAVORITE edges, user -> movies
    pub(crate) favorites: HashMap<UserId, Vec<MovieId>>,
}

impl GraphIndex {
    /// Creates a new, empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_movie(&self, id: &str) -> Option<&Movie> {
        self.movies.get(id)
    }

    pub fn get_person(&self, id: &str) -> Option<&Person> {
        self.people.get(id)
    }

    pub fn has_genre(&self, name: &str) -> bool {
        self.genres.contains(name)
    }

    pub fn has_user(&self, id: &str) -> bool {
        self.users.contains(id)
    }

    /// Distinct entities linked to a movie through `relation`
    pub fn get_links(&self, movie_id: &str, relation: Relation) -> &[String] {
        self.movie_links
            .get(movie_id)
            .map(|links| links.get(relation))
            .unwrap_or(&[])
    }

    /// Movies linked to an entity through `relation`
    pub fn get_linked_movies(&self, relation: Relation, entity: &str) -> &[MovieId] {
        self.entity_movies
            .get(&(relation, entity.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings made by a user, in insertion order
    pub fn get_user_ratings(&self, user_id: &str) -> &[Rating] {
        self.user_ratings
            .get(user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings received by a movie, in insertion order
    pub fn get_movie_ratings(&self, movie_id: &str) -> &[Rating] {
        self.movie_ratings
            .get(movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_favorites(&self, user_id: &str) -> &[MovieId] {
        self.favorites
            .get(user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All movie ids, sorted for stable output
    pub fn movie_ids(&self) -> Vec<&MovieId> {
        let mut ids: Vec<&MovieId> = self.movies.keys().collect();
        ids.sort();
        ids
    }

    /// All user ids, sorted for stable output
    pub fn user_ids(&self) -> Vec<&UserId> {
        let mut ids: Vec<&UserId> = self.users.iter().collect();
        ids.sort();
        ids
    }

    // Mutators used while loading a snapshot

    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.tmdb_id.clone(), movie);
    }

    pub fn insert_person(&mut self, person: Person) {
        self.people.insert(person.id.clone(), person);
    }

    pub fn insert_user(&mut self, user_id: impl Into<UserId>) {
        self.users.insert(user_id.into());
    }

    /// Insert an edge between a movie and an entity.
    ///
    /// Returns false when the same edge already exists; a person credited
    /// twice for one movie (two roles) stays a single link.
    pub fn link(&mut self, relation: Relation, entity: &str, movie_id: &str) -> bool {
        let links = self.movie_links.entry(movie_id.to_string()).or_default();
        let targets = links.get_mut(relation);
        if targets.iter().any(|existing| existing == entity) {
            return false;
        }
        targets.push(entity.to_string());

        if relation == Relation::InGenre {
            self.genres.insert(entity.to_string());
        }

        self.entity_movies
            .entry((relation, entity.to_string()))
            .or_default()
            .push(movie_id.to_string());
        true
    }

    /// Insert a rating and update both indices
    pub fn insert_rating(&mut self, rating: Rating) {
        self.users.insert(rating.user_id.clone());

        self.movie_ratings
            .entry(rating.movie_id.clone())
            .or_default()
            .push(rating.clone());

        self.user_ratings
            .entry(rating.user_id.clone())
            .or_default()
            .push(rating);
    }

    /// Insert a FAVORITE edge; duplicates are ignored
    pub fn insert_favorite(&mut self, user_id: &str, movie_id: &str) {
        self.users.insert(user_id.to_string());
        let favorites = self.favorites.entry(user_id.to_string()).or_default();
        if !favorites.iter().any(|existing| existing == movie_id) {
            favorites.push(movie_id.to_string());
        }
    }

    pub fn counts(&self) -> GraphCounts {
        GraphCounts {
            movies: self.movies.len(),
            people: self.people.len(),
            genres: self.genres.len(),
            users: self.users.len(),
            ratings: self.user_ratings.values().map(|v| v.len()).sum(),
            favorites: self.favorites.values().map(|v| v.len()).sum(),
        }
    }
}
