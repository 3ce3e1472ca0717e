//! Personalization engine for a media catalog browser.
//!
//! Maintains a per-user taste profile (a hand-weighted linear model over
//! categorical attributes: genres, languages, countries, director, cast)
//! and ranks unseen catalog items with a two-stage pipeline:
//!
//! 1. Cheap preliminary scoring over bulk discovery rows culls the pool
//! 2. Full detail lookups refine and rank only the promising set
//!
//! The profile learns incrementally from watchlist status transitions and
//! can be bulk-built once from an existing library. External collaborators
//! (catalog API, watchlist store, profile persistence) sit behind traits.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AttributeWeights, MediaKind, Recommendation, TasteProfile, WatchStatus, WatchlistEntry,
};
pub use services::{
    CatalogService, DiscoverFilters, InMemoryWatchlist, LibraryEntry, ProfileBuilder,
    ProfileStore, ProgressObserver, RecommendationEngine, RecommendationPolicy, TmdbCatalog,
    WatchlistSource,
};
pub use session::Session;
