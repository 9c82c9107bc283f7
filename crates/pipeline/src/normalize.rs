//! Graph-native values to JSON-safe values.
//!
//! Graph integers are 64-bit, but a JSON number consumed by a double-based
//! client is only exact up to 2^53 - 1. Integers inside that range become
//! numbers; outside it the [`OverflowPolicy`] decides between a decimal
//! string and an error. Temporal values become ISO-8601 strings and nested
//! node/relationship records flatten to their property maps.

use movie_graph::{GraphValue, Row};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Largest integer a double represents exactly
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Integer {value} at {path} is outside the safely representable range")]
    IntegerOverflow { path: String, value: i64 },

    #[error("Row is missing column '{0}'")]
    MissingColumn(String),

    #[error("Column '{column}' has unexpected type: expected {expected}")]
    UnexpectedType {
        column: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

/// What to do with integers outside ±(2^53 - 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Emit the exact decimal text
    #[default]
    String,
    /// Fail the row
    Error,
}

/// One recommendation as handed to callers: the movie's own properties at
/// the top level, plus `score` and `favorite`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub movie: Map<String, Value>,
    pub score: f64,
    pub favorite: bool,
}

impl Recommendation {
    pub fn movie_id(&self) -> Option<&str> {
        self.movie.get("tmdbId").and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.movie.get("title").and_then(Value::as_str)
    }
}

/// Converts rows produced by a traversal
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: OverflowPolicy,
}

impl Normalizer {
    pub fn new(policy: OverflowPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Convert a single value; `path` names its location for error reports
    pub fn value(&self, value: &GraphValue, path: &str) -> Result<Value> {
        let normalized = match value {
            GraphValue::Null => Value::Null,
            GraphValue::Boolean(b) => Value::Bool(*b),
            GraphValue::Integer(i) => self.integer(*i, path)?,
            // NaN and infinities have no JSON form
            GraphValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            GraphValue::String(s) => Value::String(s.clone()),
            GraphValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            GraphValue::DateTime(datetime) => Value::String(datetime.to_rfc3339()),
            GraphValue::List(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.value(item, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>>>()?,
            ),
            GraphValue::Map(map) => Value::Object(self.properties(map.iter(), path)?),
            GraphValue::Node(node) => Value::Object(self.properties(node.properties.iter(), path)?),
            GraphValue::Relationship(rel) => {
                Value::Object(self.properties(rel.properties.iter(), path)?)
            }
        };
        Ok(normalized)
    }

    /// Every column of a row as a JSON object
    pub fn row(&self, row: &Row) -> Result<Map<String, Value>> {
        self.properties(row.columns(), "")
    }

    /// A `{movie, score, favorite}` row as a [`Recommendation`]
    pub fn recommendation(&self, row: &Row) -> Result<Recommendation> {
        let movie = match self.value(column(row, "movie")?, "movie")? {
            Value::Object(map) => map,
            _ => return Err(unexpected("movie", "node")),
        };
        let score = column(row, "score")?
            .as_f64()
            .ok_or_else(|| unexpected("score", "number"))?;
        let favorite = match row.get("favorite") {
            None | Some(GraphValue::Null) => false,
            Some(value) => value.as_bool().ok_or_else(|| unexpected("favorite", "boolean"))?,
        };

        Ok(Recommendation {
            movie,
            score,
            favorite,
        })
    }

    fn integer(&self, value: i64, path: &str) -> Result<Value> {
        if (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
            return Ok(Value::Number(value.into()));
        }
        match self.policy {
            OverflowPolicy::String => Ok(Value::String(value.to_string())),
            OverflowPolicy::Error => Err(NormalizeError::IntegerOverflow {
                path: path.to_string(),
                value,
            }),
        }
    }

    fn properties<'a>(
        &self,
        entries: impl Iterator<Item = (&'a String, &'a GraphValue)>,
        path: &str,
    ) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        for (key, value) in entries {
            let child = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            map.insert(key.clone(), self.value(value, &child)?);
        }
        Ok(map)
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Result<&'a GraphValue> {
    row.get(name)
        .ok_or_else(|| NormalizeError::MissingColumn(name.to_string()))
}

fn unexpected(column: &str, expected: &'static str) -> NormalizeError {
    NormalizeError::UnexpectedType {
        column: column.to_string(),
        expected,
    }
}
