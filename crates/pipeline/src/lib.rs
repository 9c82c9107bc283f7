//! Pipeline for ranking, annotating and paging scored candidates.
//!
//! This crate provides:
//! - Stage trait and implementations for post-scoring steps
//! - StagePipeline for composing stages
//! - Pagination with permissive coercion of caller input
//! - Normalizer for turning graph rows into JSON-safe recommendations
//!
//! ## Architecture
//! The pipeline processes candidates in stages:
//! 1. RankByScore orders candidates by score, keeping traversal order on ties
//! 2. DedupByMovie keeps the best occurrence of each movie
//! 3. FavoritesAnnotator flags the requester's favorites
//! 4. Paginate cuts the `[skip, skip + limit)` window
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{Pagination, RequestContext, StagePipeline};
//!
//! let context = RequestContext::new(Pagination::from_raw(Some("3"), None))
//!     .with_user(Some("42"))
//!     .with_favorites(favorites);
//!
//! let page = StagePipeline::recommendation().apply(candidates, &context)?;
//! ```

pub mod context;
pub mod normalize;
pub mod pagination;
pub mod stage_pipeline;
pub mod stages;
pub mod traits;

// Re-export main types
pub use context::RequestContext;
pub use normalize::{NormalizeError, Normalizer, OverflowPolicy, Recommendation};
pub use pagination::{DEFAULT_LIMIT, DEFAULT_SKIP, Pagination};
pub use stage_pipeline::StagePipeline;
pub use traits::Stage;
