//! Building a [`GraphIndex`] from a snapshot directory.
//!
//! Loading happens in three steps:
//! 1. Parse all snapshot files in parallel with Rayon
//! 2. Insert nodes, then edges (edges need their endpoints to exist)
//! 3. Validate references and rating ranges

use crate::error::{GraphError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info};

impl GraphIndex {
    /// Load a graph snapshot from a directory containing `movies.dat`,
    /// `people.dat`, `credits.dat`, `ratings.dat` and optionally `favorites.dat`.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading graph snapshot from {:?}", data_dir);

        let movies_path = data_dir.join("movies.dat");
        let people_path = data_dir.join("people.dat");
        let credits_path = data_dir.join("credits.dat");
        let ratings_path = data_dir.join("ratings.dat");
        let favorites_path = data_dir.join("favorites.dat");

        // Nodes and edges parse independently, so fan out over Rayon's pool
        let ((movies, people), ((credits, ratings), favorites)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&movies_path),
                    || parser::parse_people(&people_path),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || parser::parse_credits(&credits_path),
                            || parser::parse_ratings(&ratings_path),
                        )
                    },
                    || parser::parse_favorites(&favorites_path),
                )
            },
        );

        let movies = movies?;
        let people = people?;
        let credits = credits?;
        let ratings = ratings?;
        let favorites = favorites?;

        debug!(
            "Parsed {} movies, {} people, {} credits, {} ratings, {} favorites",
            movies.len(),
            people.len(),
            credits.len(),
            ratings.len(),
            favorites.len()
        );

        let mut index = GraphIndex::new();

        // Nodes first
        for person in people {
            index.insert_person(person);
        }
        let mut genre_links = Vec::new();
        for record in movies {
            for genre in record.genres {
                genre_links.push((genre, record.movie.tmdb_id.clone()));
            }
            index.insert_movie(record.movie);
        }

        // Then edges, checking that both endpoints exist
        for (genre, movie_id) in genre_links {
            index.link(Relation::InGenre, &genre, &movie_id);
        }
        for credit in credits {
            index.require_movie(&credit.movie_id)?;
            if index.get_person(&credit.person_id).is_none() {
                return Err(GraphError::MissingReference {
                    entity: "Person".to_string(),
                    id: credit.person_id,
                });
            }
            index.link(credit.relation, &credit.person_id, &credit.movie_id);
        }
        for rating in ratings {
            index.require_movie(&rating.movie_id)?;
            index.insert_rating(rating);
        }
        for favorite in favorites {
            index.require_movie(&favorite.movie_id)?;
            index.insert_favorite(&favorite.user_id, &favorite.movie_id);
        }

        index.validate()?;

        let counts = index.counts();
        info!(
            "Graph loaded: {} movies, {} people, {} genres, {} users, {} ratings, {} favorites",
            counts.movies, counts.people, counts.genres, counts.users, counts.ratings, counts.favorites
        );
        Ok(index)
    }

    fn require_movie(&self, movie_id: &str) -> Result<()> {
        if self.movies.contains_key(movie_id) {
            Ok(())
        } else {
            Err(GraphError::MissingReference {
                entity: "Movie".to_string(),
                id: movie_id.to_string(),
            })
        }
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every rating references an existing movie and lies in 1.0 - 5.0
    /// - Every user has at most one rating per movie
    /// - Every favorite references an existing movie
    pub fn validate(&self) -> Result<()> {
        for (user_id, ratings) in &self.user_ratings {
            let mut seen = std::collections::HashSet::with_capacity(ratings.len());
            for rating in ratings {
                self.require_movie(&rating.movie_id)?;
                if !(1.0..=5.0).contains(&rating.rating) {
                    return Err(GraphError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.rating.to_string(),
                    });
                }
                if !seen.insert(rating.movie_id.as_str()) {
                    return Err(GraphError::ValidationError(format!(
                        "user {} rated movie {} more than once",
                        user_id, rating.movie_id
                    )));
                }
            }
        }
        for movie_ids in self.favorites.values() {
            for movie_id in movie_ids {
                self.require_movie(movie_id)?;
            }
        }
        Ok(())
    }
}
