//! Server crate for the ReelGraph recommendation service.
//!
//! This crate contains the graph store adapter, the service exposing the
//! four recommendation operations, and their configuration.

pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use error::{RecommendationError, RecommendationResult};
pub use service::{RecommendationService, load_graph};
pub use store::{
    GraphSession, GraphStore, InMemoryGraphStore, StoreError, TraversalParams, TraversalQuery,
};
