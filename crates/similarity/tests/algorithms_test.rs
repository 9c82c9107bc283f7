//! Integration tests for the similarity algorithms.
//!
//! These build a small catalog with known overlaps and rating histories and
//! check the scoring properties end to end through `SimilarityEngine`.

use movie_graph::{GraphIndex, Movie, Person, Rating, Relation};
use similarity::{Algorithm, CandidateMetadata, Seed, SimilarityEngine, SimilarityError};

fn rate(index: &mut GraphIndex, user: &str, movie: &str, rating: f32) {
    index.insert_rating(Rating {
        user_id: user.to_string(),
        movie_id: movie.to_string(),
        rating,
        timestamp: 1_000_000,
    });
}

fn create_catalog() -> GraphIndex {
    let mut index = GraphIndex::new();

    for (id, title) in [
        ("m", "The Seed"),
        ("n", "Close Sibling"),
        ("o", "Distant Cousin"),
        ("twin", "Identical Twin"),
        ("loner", "Loner"),
    ] {
        index.insert_movie(Movie::new(id, title));
    }
    for (id, name) in [
        ("a1", "Keanu Reeves"),
        ("a2", "Carrie-Anne Moss"),
        ("d1", "Lana Wachowski"),
        ("d2", "Someone Else"),
    ] {
        index.insert_person(Person {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    // Seed: 2 genres, 2 actors, 1 director
    for genre in ["Action", "Sci-Fi"] {
        index.link(Relation::InGenre, genre, "m");
        index.link(Relation::InGenre, genre, "twin");
    }
    for actor in ["a1", "a2"] {
        index.link(Relation::ActedIn, actor, "m");
        index.link(Relation::ActedIn, actor, "twin");
    }
    index.link(Relation::Directed, "d1", "m");
    index.link(Relation::Directed, "d1", "twin");

    // n: 2 genres + 1 actor shared, different director
    index.link(Relation::InGenre, "Action", "n");
    index.link(Relation::InGenre, "Sci-Fi", "n");
    index.link(Relation::ActedIn, "a1", "n");
    index.link(Relation::Directed, "d2", "n");

    // o: shares only the director
    index.link(Relation::Directed, "d1", "o");
    index.link(Relation::InGenre, "Drama", "o");

    index.link(Relation::InGenre, "Documentary", "loner");
    index
}

/// Requester "u1" rates r0..r11. "ten" shares exactly 10 of them, "eleven"
/// shares 11. Each neighbor has one extra movie the requester has not seen.
fn create_raters() -> GraphIndex {
    let mut index = create_catalog();
    for i in 0..12 {
        index.insert_movie(Movie::new(format!("r{i}"), format!("Rated {i}")));
    }
    index.insert_movie(Movie::new("only-ten", "Ten's Pick"));
    index.insert_movie(Movie::new("only-eleven", "Eleven's Pick"));

    for i in 0..12 {
        rate(&mut index, "u1", &format!("r{i}"), ((i % 5) + 1) as f32);
    }
    for i in 0..10 {
        rate(&mut index, "ten", &format!("r{i}"), ((i % 5) + 1) as f32);
    }
    rate(&mut index, "ten", "only-ten", 5.0);
    for i in 0..11 {
        rate(&mut index, "eleven", &format!("r{i}"), ((i % 5) + 1) as f32);
    }
    rate(&mut index, "eleven", "only-eleven", 5.0);
    index
}

fn ranked(mut scores: Vec<f64>) -> Vec<f64> {
    scores.sort_by(|a, b| b.total_cmp(a));
    scores
}

#[test]
fn test_weighted_content_scenario() {
    let index = create_catalog();
    let engine = SimilarityEngine::new();

    let candidates = engine
        .score(Algorithm::WeightedContent, &index, &Seed::movie("m"))
        .unwrap();

    let n = candidates.iter().find(|c| c.movie_id == "n").unwrap();
    assert_eq!(n.score, 13.0);
    assert_eq!(
        n.metadata,
        CandidateMetadata::SharedContent {
            genres: 2,
            actors: 1,
            directors: 0
        }
    );

    let o = candidates.iter().find(|c| c.movie_id == "o").unwrap();
    assert_eq!(o.score, 4.0);

    // twin: 5×2 + 3×2 + 4×1
    let twin = candidates.iter().find(|c| c.movie_id == "twin").unwrap();
    assert_eq!(twin.score, 20.0);

    assert!(candidates.iter().all(|c| c.movie_id != "m"));
    assert!(candidates.iter().all(|c| c.movie_id != "loner"));
}

#[test]
fn test_weighted_content_scores_are_non_negative_integers() {
    let index = create_catalog();
    let engine = SimilarityEngine::new();

    for movie in ["m", "n", "o", "twin", "loner"] {
        let candidates = engine
            .score(Algorithm::WeightedContent, &index, &Seed::movie(movie))
            .unwrap();
        for candidate in &candidates {
            assert!(candidate.score >= 0.0);
            assert_eq!(candidate.score.fract(), 0.0);
        }
    }
}

#[test]
fn test_jaccard_scores_within_unit_interval() {
    let index = create_catalog();
    let engine = SimilarityEngine::new();

    for movie in ["m", "n", "o", "twin", "loner"] {
        let candidates = engine
            .score(Algorithm::JaccardIndex, &index, &Seed::movie(movie))
            .unwrap();
        for candidate in &candidates {
            assert!((0.0..=1.0).contains(&candidate.score), "{candidate:?}");
        }
    }
}

#[test]
fn test_jaccard_identical_movie_scores_one() {
    let index = create_catalog();
    let engine = SimilarityEngine::new();

    let candidates = engine
        .score(Algorithm::JaccardIndex, &index, &Seed::movie("m"))
        .unwrap();
    let twin = candidates.iter().find(|c| c.movie_id == "twin").unwrap();
    assert_eq!(twin.score, 1.0);

    // n shares Action, Sci-Fi, Keanu Reeves out of
    // {Action, Sci-Fi, Keanu Reeves, Carrie-Anne Moss, Lana Wachowski, Someone Else}
    let n = candidates.iter().find(|c| c.movie_id == "n").unwrap();
    assert!((n.score - 0.5).abs() < 1e-9);

    let ranked_scores = ranked(candidates.iter().map(|c| c.score).collect());
    assert_eq!(ranked_scores[0], 1.0);
}

#[test]
fn test_content_unknown_seed_is_not_found() {
    let index = create_catalog();
    let engine = SimilarityEngine::new();

    for algorithm in [Algorithm::WeightedContent, Algorithm::JaccardIndex] {
        let result = engine.score(algorithm, &index, &Seed::movie("missing"));
        assert_eq!(
            result.unwrap_err(),
            SimilarityError::SeedNotFound("missing".to_string())
        );
    }
}

#[test]
fn test_collaborative_requires_user() {
    let index = create_raters();
    let engine = SimilarityEngine::new();

    for algorithm in [Algorithm::CosineSimilarity, Algorithm::PearsonSimilarity] {
        let without_user = engine.score(algorithm, &index, &Seed::movie("m")).unwrap();
        assert!(without_user.is_empty());

        let blank_user = Seed::movie("m").with_user(Some("   "));
        assert!(engine.score(algorithm, &index, &blank_user).unwrap().is_empty());

        let unknown_user = Seed::movie("m").with_user(Some("nobody"));
        assert!(engine.score(algorithm, &index, &unknown_user).unwrap().is_empty());
    }
}

#[test]
fn test_co_rated_threshold_is_strict() {
    let index = create_raters();
    let engine = SimilarityEngine::new();
    let seed = Seed::movie("m").with_user(Some("u1"));

    for algorithm in [Algorithm::CosineSimilarity, Algorithm::PearsonSimilarity] {
        let candidates = engine.score(algorithm, &index, &seed).unwrap();

        assert_eq!(candidates.len(), 1, "{algorithm}");
        assert_eq!(candidates[0].movie_id, "only-eleven");
        match &candidates[0].metadata {
            CandidateMetadata::Neighbor { user_id, co_rated } => {
                assert_eq!(user_id, "eleven");
                assert_eq!(*co_rated, 11);
            }
            other => panic!("unexpected metadata {other:?}"),
        }
        assert!(candidates.iter().all(|c| c.movie_id != "only-ten"));
    }
}

#[test]
fn test_identical_raters_score_one() {
    let index = create_raters();
    let engine = SimilarityEngine::new();
    let seed = Seed::movie("m").with_user(Some("u1"));

    // "eleven" rated the co-rated movies exactly like u1
    for algorithm in [Algorithm::CosineSimilarity, Algorithm::PearsonSimilarity] {
        let candidates = engine.score(algorithm, &index, &seed).unwrap();
        assert!((candidates[0].score - 1.0).abs() < 0.2, "{algorithm}");
    }

    let cosine = engine
        .score(Algorithm::CosineSimilarity, &index, &seed)
        .unwrap();
    assert!((cosine[0].score - 1.0).abs() < 1e-9);
}

#[test]
fn test_lower_threshold_admits_ten() {
    let index = create_raters();
    let engine = SimilarityEngine::new().with_min_co_rated(9);
    let seed = Seed::movie("m").with_user(Some("u1"));

    let candidates = engine
        .score(Algorithm::CosineSimilarity, &index, &seed)
        .unwrap();
    let movies: Vec<&str> = candidates.iter().map(|c| c.movie_id.as_str()).collect();
    assert_eq!(movies, vec!["only-ten", "only-eleven"]);
}

#[test]
fn test_scores_are_deterministic() {
    let index = create_raters();
    let engine = SimilarityEngine::new();
    let seed = Seed::movie("m").with_user(Some("u1"));

    for algorithm in Algorithm::ALL {
        let first = engine.score(algorithm, &index, &seed).unwrap();
        let second = engine.score(algorithm, &index, &seed).unwrap();
        assert_eq!(first, second);
    }
}
