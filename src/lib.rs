//! CineFind - Movie discovery backed by OMDb and TMDb
//!
//! This library looks movies up on the primary provider (OMDb, keyed by IMDb
//! ID), enriches them with cast, trailers and recommendations from the
//! secondary provider (TMDb), and keeps a local watchlist and subscriber list.

mod catalog;
mod config;
mod gateway;
mod metadata_retrieval;
mod page;
mod rating;
mod resolver;
mod storage;
mod subscribers;
mod watchlist;

// Re-export error types
pub use config::ConfigError;
pub use gateway::GatewayError;
pub use storage::StorageError;
pub use subscribers::SubscribeError;

pub use catalog::{
    CAROUSEL_LIMIT, CAST_LIMIT, Carousel, Catalog, GENRE_LIMIT, RECOMMENDATION_LIMIT,
};
pub use config::{
    Config, HttpConfig, OMDB_API_KEY_ENV, OmdbConfig, StorageConfig, TMDB_API_KEY_ENV,
    TmdbConfig,
};
pub use gateway::HttpGateway;
pub use metadata_retrieval::{
    CastMember, GENRES, Genre, ImageSize, Lookup, MovieDetail, MovieSummary, OmdbClient,
    TmdbClient, TmdbMovie, TrailerRef, format_runtime,
};
pub use page::{Homepage, MoviePage, PageContext, load_homepage, load_movie_page};
pub use rating::{MAX_STARS, StarRating};
pub use resolver::Resolver;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use subscribers::{SUBSCRIBERS_KEY, SubscriberList, Subscription};
pub use watchlist::{SortOrder, Toggled, WATCHLIST_KEY, Watchlist, WatchlistEntry};

use thiserror::Error;

/// Main error type for CineFind operations
#[derive(Debug, Error)]
pub enum CineFindError {
    /// Error while loading or validating configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while setting up the HTTP client
    #[error("HTTP client error: {0}")]
    Gateway(#[from] GatewayError),

    /// Error while reading or writing persisted collections
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error while adding a subscriber
    #[error("Subscription error: {0}")]
    Subscribe(#[from] SubscribeError),
}

/// Opens the file store configured in `config`
///
/// Uses `[storage] data_dir` when set, otherwise the system's standard data
/// directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be determined or created.
pub fn open_store(config: &Config) -> Result<FileStore, StorageError> {
    match &config.storage.data_dir {
        Some(dir) => FileStore::open(dir),
        None => FileStore::open_default(),
    }
}
