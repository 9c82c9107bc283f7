//! Post-scoring stages.

mod dedup;
mod favorites;
mod paginate;
mod rank;

pub use dedup::DedupByMovie;
pub use favorites::FavoritesAnnotator;
pub use paginate::Paginate;
pub use rank::RankByScore;
