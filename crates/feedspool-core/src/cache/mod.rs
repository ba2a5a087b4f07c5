//! Persisted per-feed fetch state.
//!
//! One record per feed url: the conditional-fetch validator tokens from
//! the last successful fetch plus the last-rendered body for every entry
//! seen in it. Rebuilt fully each run and written back atomically.

mod model;
mod repository;

pub use model::CacheRecord;
pub use repository::CacheRepository;
