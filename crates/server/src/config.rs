//! Service configuration loaded from `REEL_*` environment variables.
//!
//! A `.env` file in the working directory is read first if present.

use std::path::PathBuf;
use std::time::Duration;

use pipeline::OverflowPolicy;
use serde::Deserialize;
use similarity::{DEFAULT_MIN_CO_RATED, MeanBasis};

use crate::store::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TIMEOUT};

pub const ENV_PREFIX: &str = "REEL_";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Snapshot directory with movies.dat, people.dat, credits.dat, ratings.dat
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Graph sessions open at once
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// How long a request waits for a graph session
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// Neighbors need strictly more co-rated movies than this
    #[serde(default = "default_min_co_rated")]
    pub min_co_rated: usize,

    /// Requester mean used by Pearson scoring
    #[serde(default)]
    pub pearson_mean: MeanBasis,

    /// `string` or `error` for integers outside ±(2^53 - 1)
    #[serde(default)]
    pub integer_overflow: OverflowPolicy,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/recommendations")
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_session_timeout_ms() -> u64 {
    DEFAULT_SESSION_TIMEOUT.as_millis() as u64
}

fn default_min_co_rated() -> usize {
    DEFAULT_MIN_CO_RATED
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_sessions: default_max_sessions(),
            session_timeout_ms: default_session_timeout_ms(),
            min_co_rated: default_min_co_rated(),
            pearson_mean: MeanBasis::default(),
            integer_overflow: OverflowPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<ServiceConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, ServiceConfig>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }
}
