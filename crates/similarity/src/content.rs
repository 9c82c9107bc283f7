//! Content-based similarity: movies that share genres, cast and directors
//! with the seed movie.
//!
//! ## Algorithm
//! 1. Walk seed -> entity -> other movie for every IN_GENRE, ACTED_IN and
//!    DIRECTED link of the seed
//! 2. Aggregate, per other movie, the distinct entities reached
//! 3. Score the aggregate (weighted counts, or Jaccard over entity names)
//!
//! Candidates are kept in the order they were first reached, genres first,
//! then actors, then directors.

use crate::scoring::{self, ContentWeights, SharedCounts};
use crate::traits::SimilaritySource;
use crate::types::{Candidate, CandidateMetadata, Result, Seed, SimilarityError};
use movie_graph::{EntityKey, GraphView, MovieId, Relation};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

fn require_seed(graph: &dyn GraphView, seed: &Seed) -> Result<()> {
    match graph.movie(&seed.seed_id) {
        Some(_) => Ok(()),
        None => Err(SimilarityError::SeedNotFound(seed.seed_id.clone())),
    }
}

/// Movies reached from the seed, each with an accumulator, in first-reached order
struct Reached<T> {
    order: Vec<MovieId>,
    by_movie: HashMap<MovieId, T>,
}

impl<T: Default> Reached<T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            by_movie: HashMap::new(),
        }
    }

    fn entry(&mut self, movie_id: &str) -> &mut T {
        if !self.by_movie.contains_key(movie_id) {
            self.order.push(movie_id.to_string());
        }
        self.by_movie.entry(movie_id.to_string()).or_default()
    }

    fn into_ordered(self) -> impl Iterator<Item = (MovieId, T)> {
        let Reached {
            order,
            mut by_movie,
        } = self;
        order.into_iter().filter_map(move |movie_id| {
            let value = by_movie.remove(&movie_id)?;
            Some((movie_id, value))
        })
    }
}

// =============================================================================
// Weighted content
// =============================================================================

/// Scores candidates by 5 × shared genres + 3 × shared actors + 4 × shared directors
#[derive(Debug, Clone, Default)]
pub struct WeightedContent {
    weights: ContentWeights,
}

impl WeightedContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure per-relation weights (default: genre 5, actor 3, director 4)
    pub fn with_weights(mut self, weights: ContentWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Count distinct shared entities per relation. An actor links the two
    /// movies only through ACTED_IN on both sides, and likewise for the
    /// other relations.
    fn shared_counts(&self, graph: &dyn GraphView, seed_id: &str) -> Reached<SharedCounts> {
        let mut reached: Reached<SharedCounts> = Reached::new();

        for relation in Relation::ALL {
            for entity in graph.linked(seed_id, relation) {
                for other in graph.movies_linked_to(relation, entity) {
                    if other == seed_id {
                        continue;
                    }
                    let counts = reached.entry(other);
                    match relation {
                        Relation::InGenre => counts.genres += 1,
                        Relation::ActedIn => counts.actors += 1,
                        Relation::Directed => counts.directors += 1,
                    }
                }
            }
        }
        reached
    }
}

impl SimilaritySource for WeightedContent {
    fn name(&self) -> &str {
        "WeightedContent"
    }

    #[instrument(skip(self, graph), fields(seed = %seed.seed_id))]
    fn candidates(&self, graph: &dyn GraphView, seed: &Seed) -> Result<Vec<Candidate>> {
        require_seed(graph, seed)?;

        let candidates: Vec<Candidate> = self
            .shared_counts(graph, &seed.seed_id)
            .into_ordered()
            .filter(|(_, shared)| !shared.is_empty())
            .map(|(movie_id, shared)| {
                let score = scoring::weighted_content_score(shared, self.weights);
                Candidate::new(
                    movie_id,
                    score as f64,
                    CandidateMetadata::SharedContent {
                        genres: shared.genres,
                        actors: shared.actors,
                        directors: shared.directors,
                    },
                )
            })
            .collect();

        debug!("Weighted content produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

// =============================================================================
// Jaccard index
// =============================================================================

/// Scores candidates by |shared entities| / |names(seed) ∪ names(candidate)|
#[derive(Debug, Clone, Default)]
pub struct JaccardIndex;

impl JaccardIndex {
    pub fn new() -> Self {
        Self
    }

    /// Distinct names of every genre, actor and director linked to a movie
    fn entity_names(graph: &dyn GraphView, movie_id: &str) -> HashSet<String> {
        let mut names = HashSet::new();
        for relation in Relation::ALL {
            for entity in graph.linked(movie_id, relation) {
                let name = graph.entity_name(relation, entity).unwrap_or(entity);
                names.insert(name.to_string());
            }
        }
        names
    }

    /// Relations that reach the same kind of entity as `relation`.
    /// A person connects two movies whether they acted in or directed either.
    fn same_entity_kind(relation: Relation) -> &'static [Relation] {
        if relation.is_person() {
            &[Relation::ActedIn, Relation::Directed]
        } else {
            &[Relation::InGenre]
        }
    }

    fn shared_entities(graph: &dyn GraphView, seed_id: &str) -> Reached<HashSet<EntityKey>> {
        let mut reached: Reached<HashSet<EntityKey>> = Reached::new();

        for relation in Relation::ALL {
            for entity in graph.linked(seed_id, relation) {
                let key = EntityKey::for_relation(relation, entity);
                for &back in Self::same_entity_kind(relation) {
                    for other in graph.movies_linked_to(back, entity) {
                        if other == seed_id {
                            continue;
                        }
                        reached.entry(other).insert(key.clone());
                    }
                }
            }
        }
        reached
    }
}

impl SimilaritySource for JaccardIndex {
    fn name(&self) -> &str {
        "JaccardIndex"
    }

    #[instrument(skip(self, graph), fields(seed = %seed.seed_id))]
    fn candidates(&self, graph: &dyn GraphView, seed: &Seed) -> Result<Vec<Candidate>> {
        require_seed(graph, seed)?;

        let set1 = Self::entity_names(graph, &seed.seed_id);
        let candidates: Vec<Candidate> = Self::shared_entities(graph, &seed.seed_id)
            .into_ordered()
            .filter_map(|(movie_id, shared)| {
                let set2 = Self::entity_names(graph, &movie_id);
                let intersection = shared.len();
                let union = scoring::union_size(&set1, &set2);
                let score = scoring::jaccard_score(intersection, union)?;
                Some(Candidate::new(
                    movie_id,
                    score,
                    CandidateMetadata::Overlap {
                        intersection,
                        union,
                    },
                ))
            })
            .collect();

        debug!("Jaccard index produced {} candidates", candidates.len());
        Ok(candidates)
    }
}
