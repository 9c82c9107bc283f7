//! Offset/limit windows over a ranked result list.
//!
//! Callers hand in whatever they received (query-string text, possibly
//! negative integers). Anything that is not a usable value falls back to
//! the default instead of failing the request.

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_LIMIT: usize = 6;
pub const DEFAULT_SKIP: usize = 0;

/// A validated `[skip, skip + limit)` window. `limit` is always > 0.
///
/// Deserialization goes through the same coercion as [`Pagination::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPagination")]
pub struct Pagination {
    limit: usize,
    skip: usize,
}

impl Pagination {
    /// Coerce raw integers: non-positive limits and negative skips use the defaults
    pub fn new(limit: i64, skip: i64) -> Self {
        Self {
            limit: coerce_limit(Some(limit)),
            skip: coerce_skip(Some(skip)),
        }
    }

    /// Coerce raw text such as query-string parameters
    pub fn from_raw(limit: Option<&str>, skip: Option<&str>) -> Self {
        Self {
            limit: coerce_limit(limit.and_then(|raw| parse_integer("limit", raw))),
            skip: coerce_skip(skip.and_then(|raw| parse_integer("skip", raw))),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    /// First index past the window, saturating on huge offsets
    pub fn end(&self) -> usize {
        self.skip.saturating_add(self.limit)
    }

    /// Keep only the window; empty when `skip` is past the end
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}

/// Unvalidated wire form of [`Pagination`]
#[derive(Debug, Deserialize)]
struct RawPagination {
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    skip: Option<i64>,
}

impl From<RawPagination> for Pagination {
    fn from(raw: RawPagination) -> Self {
        Self {
            limit: coerce_limit(raw.limit),
            skip: coerce_skip(raw.skip),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: DEFAULT_SKIP,
        }
    }
}

fn parse_integer(param: &str, raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring non-numeric {} {:?}", param, raw);
            None
        }
    }
}

fn coerce_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(value) if value > 0 => usize::try_from(value).unwrap_or(usize::MAX),
        Some(value) => {
            warn!("Ignoring non-positive limit {}", value);
            DEFAULT_LIMIT
        }
        None => DEFAULT_LIMIT,
    }
}

fn coerce_skip(skip: Option<i64>) -> usize {
    match skip {
        Some(value) if value >= 0 => usize::try_from(value).unwrap_or(usize::MAX),
        Some(value) => {
            warn!("Ignoring negative skip {}", value);
            DEFAULT_SKIP
        }
        None => DEFAULT_SKIP,
    }
}
