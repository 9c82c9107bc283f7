//! Parser for graph snapshot files.
//!
//! Every file is `::`-separated, one record per line:
//! - movies.dat: tmdbId::title::released::runtime::budget::revenue::imdbRating::genres::languages
//! - people.dat: personId::name
//! - credits.dat: personId::tmdbId::ACTED_IN|DIRECTED
//! - ratings.dat: userId::tmdbId::rating::timestamp
//! - favorites.dat: userId::tmdbId
//!
//! Empty numeric fields mean "unknown". Multi-valued fields (genres,
//! languages) are pipe-separated.

use crate::error::{GraphError, Result};
use crate::types::*;
use chrono::NaiveDate;
use std::path::Path;
use std::str::FromStr;

/// A credit line: which person is linked to which movie, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub person_id: PersonId,
    pub movie_id: MovieId,
    pub relation: Relation,
}

/// A favorites line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub user_id: UserId,
    pub movie_id: MovieId,
}

/// A movie together with the genre names listed on its line
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub movie: Movie,
    pub genres: Vec<String>,
}

/// Read a file into non-empty, trimmed lines paired with 1-based line numbers
fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    if !path.exists() {
        return Err(GraphError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;

    Ok(content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Split a line by "::" and check the field count
fn split_fields<'a>(line: &'a str, expected: usize, file: &str, line_no: usize) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = line.split("::").map(str::trim).collect();
    if parts.len() != expected {
        return Err(GraphError::FieldCountMismatch {
            file: file.to_string(),
            expected,
            found: parts.len(),
            line: line_no,
        });
    }
    Ok(parts)
}

/// Parse a required field, reporting the file and line on failure
fn parse_field<T>(value: &str, name: &str, file: &str, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| GraphError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: format!("Invalid {}: {}", name, e),
    })
}

/// Parse an optional field; an empty string is `None`
fn parse_optional<T>(value: &str, name: &str, file: &str, line_no: usize) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return Ok(None);
    }
    parse_field(value, name, file, line_no).map(Some)
}

fn require_non_empty<'a>(value: &'a str, name: &str, file: &str, line_no: usize) -> Result<&'a str> {
    if value.is_empty() {
        return Err(GraphError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Missing {}", name),
        });
    }
    Ok(value)
}

/// Split a pipe-separated list, dropping empty entries
fn parse_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a release date in `YYYY-MM-DD` form
fn parse_date(value: &str, file: &str, line_no: usize) -> Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| GraphError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid released date {:?}: {}", value, e),
        })
}

/// Parse a relation label from credits.dat
pub fn parse_relation(s: &str) -> Result<Relation> {
    match s {
        "ACTED_IN" => Ok(Relation::ActedIn),
        "DIRECTED" => Ok(Relation::Directed),
        "IN_GENRE" => Ok(Relation::InGenre),
        _ => Err(GraphError::InvalidValue {
            field: "relation".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse the movies.dat file
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let file = file_name(path);
    let mut movies = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let parts = split_fields(&line, 9, &file, line_no)?;

        let mut movie = Movie::new(
            require_non_empty(parts[0], "tmdbId", &file, line_no)?,
            require_non_empty(parts[1], "title", &file, line_no)?,
        );
        movie.released = parse_date(parts[2], &file, line_no)?;
        movie.runtime = parse_optional(parts[3], "runtime", &file, line_no)?;
        movie.budget = parse_optional(parts[4], "budget", &file, line_no)?;
        movie.revenue = parse_optional(parts[5], "revenue", &file, line_no)?;
        movie.imdb_rating = parse_optional(parts[6], "imdbRating", &file, line_no)?;
        movie.languages = parse_list(parts[8]);

        movies.push(MovieRecord {
            movie,
            genres: parse_list(parts[7]),
        });
    }
    Ok(movies)
}

/// Parse the people.dat file
pub fn parse_people(path: &Path) -> Result<Vec<Person>> {
    let file = file_name(path);
    let mut people = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let parts = split_fields(&line, 2, &file, line_no)?;
        people.push(Person {
            id: require_non_empty(parts[0], "personId", &file, line_no)?.to_string(),
            name: require_non_empty(parts[1], "name", &file, line_no)?.to_string(),
        });
    }
    Ok(people)
}

/// Parse the credits.dat file
pub fn parse_credits(path: &Path) -> Result<Vec<Credit>> {
    let file = file_name(path);
    let mut credits = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let parts = split_fields(&line, 3, &file, line_no)?;
        let relation = parse_relation(parts[2])?;
        if !relation.is_person() {
            return Err(GraphError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("{} is not a credit relation", relation),
            });
        }
        credits.push(Credit {
            person_id: require_non_empty(parts[0], "personId", &file, line_no)?.to_string(),
            movie_id: require_non_empty(parts[1], "tmdbId", &file, line_no)?.to_string(),
            relation,
        });
    }
    Ok(credits)
}

/// Parse the ratings.dat file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = file_name(path);
    let mut ratings = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let parts = split_fields(&line, 4, &file, line_no)?;
        ratings.push(Rating {
            user_id: require_non_empty(parts[0], "userId", &file, line_no)?.to_string(),
            movie_id: require_non_empty(parts[1], "tmdbId", &file, line_no)?.to_string(),
            rating: parse_field(parts[2], "rating", &file, line_no)?,
            timestamp: parse_field(parts[3], "timestamp", &file, line_no)?,
        });
    }
    Ok(ratings)
}

/// Parse the favorites.dat file. The file is optional; a missing file means
/// no user has favorites.
pub fn parse_favorites(path: &Path) -> Result<Vec<Favorite>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = file_name(path);
    let mut favorites = Vec::new();

    for (line_no, line) in read_lines(path)? {
        let parts = split_fields(&line, 2, &file, line_no)?;
        favorites.push(Favorite {
            user_id: require_non_empty(parts[0], "userId", &file, line_no)?.to_string(),
            movie_id: require_non_empty(parts[1], "tmdbId", &file, line_no)?.to_string(),
        });
    }
    Ok(favorites)
}
