pub mod auth;
pub mod lists;
pub mod providers;
pub mod ranking;
pub mod search;
pub mod trending;

pub use providers::{CatalogProvider, TmdbProvider};
pub use ranking::{rank, RankConfig, ScoredItem};
