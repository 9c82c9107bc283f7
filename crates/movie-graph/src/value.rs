//! Graph-native values as they come back from a traversal.
//!
//! Rows produced by a graph store are made of these values: 64-bit
//! integers that may not fit a JSON number, calendar types, and nested
//! node/relationship records. Turning them into plain serializable data is
//! the job of the result normalizer, not of this module.

use crate::types::Movie;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::BTreeMap;

/// A property value stored on a node, a relationship, or a row column
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Null,
    Boolean(bool),
    /// Full 64-bit integer; may be outside the range a JSON number can hold exactly
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    List(Vec<GraphValue>),
    Map(BTreeMap<String, GraphValue>),
    Node(Node),
    Relationship(Relationship),
}

/// A node record: labels plus its property map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, GraphValue>,
}

/// A relationship record: type plus its property map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    pub rel_type: String,
    pub properties: BTreeMap<String, GraphValue>,
}

impl From<bool> for GraphValue {
    fn from(value: bool) -> Self {
        GraphValue::Boolean(value)
    }
}

impl From<i64> for GraphValue {
    fn from(value: i64) -> Self {
        GraphValue::Integer(value)
    }
}

impl From<f64> for GraphValue {
    fn from(value: f64) -> Self {
        GraphValue::Float(value)
    }
}

impl From<&str> for GraphValue {
    fn from(value: &str) -> Self {
        GraphValue::String(value.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(value: String) -> Self {
        GraphValue::String(value)
    }
}

impl From<NaiveDate> for GraphValue {
    fn from(value: NaiveDate) -> Self {
        GraphValue::Date(value)
    }
}

impl<T: Into<GraphValue>> From<Option<T>> for GraphValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(GraphValue::Null)
    }
}

impl<T: Into<GraphValue>> From<Vec<T>> for GraphValue {
    fn from(values: Vec<T>) -> Self {
        GraphValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl GraphValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GraphValue::Float(f) => Some(*f),
            GraphValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GraphValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl Node {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            labels: vec![label.into()],
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter; `Null` values are skipped like absent properties
    pub fn with(mut self, key: impl Into<String>, value: impl Into<GraphValue>) -> Self {
        let value = value.into();
        if value != GraphValue::Null {
            self.properties.insert(key.into(), value);
        }
        self
    }
}

impl Movie {
    /// The movie as a `:Movie` node record
    pub fn to_node(&self) -> Node {
        Node::new("Movie")
            .with("tmdbId", self.tmdb_id.as_str())
            .with("title", self.title.as_str())
            .with("year", self.year().map(i64::from))
            .with("released", self.released)
            .with("runtime", self.runtime.map(i64::from))
            .with("budget", self.budget)
            .with("revenue", self.revenue)
            .with("imdbRating", self.imdb_rating.map(f64::from))
            .with("languages", self.languages.clone())
    }
}

/// One result row, keyed by column name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: BTreeMap<String, GraphValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<GraphValue>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&String, &GraphValue)> {
        self.columns.iter()
    }
}

impl From<Node> for GraphValue {
    fn from(node: Node) -> Self {
        GraphValue::Node(node)
    }
}
