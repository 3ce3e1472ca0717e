pub mod builder;
pub mod catalog;
pub mod profile;
pub mod recommendations;
pub mod watchlist;

pub use builder::{LibraryEntry, ProfileBuilder, ProgressObserver};
pub use catalog::{CatalogService, DiscoverFilters, TmdbCatalog};
pub use profile::ProfileStore;
pub use recommendations::{RecommendationEngine, RecommendationPolicy};
pub use watchlist::{InMemoryWatchlist, WatchlistSource};
