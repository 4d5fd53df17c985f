//! Aggregation layer
//!
//! Combines the primary provider's detail record with the secondary
//! provider's enrichment (cast, trailer, recommendations) and builds the
//! listing carousels. Every enrichment first needs the TMDb numeric ID, which
//! is found through the [`Resolver`].

use crate::CineFindError;
use crate::config::Config;
use crate::gateway::HttpGateway;
use crate::metadata_retrieval::{
    CastMember, Genre, ImageSize, Lookup, MovieDetail, MovieSummary, OmdbClient, TmdbClient,
    TmdbMovie, TmdbVideo, TrailerRef,
};
use crate::resolver::Resolver;

/// Cast members shown on a detail page
pub const CAST_LIMIT: usize = 12;
/// Recommendations shown on a detail page
pub const RECOMMENDATION_LIMIT: usize = 10;
/// Movies per homepage carousel
pub const CAROUSEL_LIMIT: usize = 6;
/// Movies per genre page
pub const GENRE_LIMIT: usize = 30;

const TRAILER_TYPE: &str = "Trailer";
const TRAILER_SITE: &str = "YouTube";

/// A resolved listing plus the backdrops available for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carousel {
    /// Cross-referenced movies, in listing order
    pub movies: Vec<MovieSummary>,
    /// Backdrop image URLs of the listed candidates
    pub backdrops: Vec<String>,
}

/// Entry point for everything the presentation layer displays.
#[derive(Debug, Clone)]
pub struct Catalog {
    resolver: Resolver,
}

impl Catalog {
    /// Creates a catalog over an existing resolver
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Builds the gateway, both provider clients and the resolver from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an API key is missing or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, CineFindError> {
        let omdb_key = config.omdb.require_api_key()?;
        let tmdb_key = config.tmdb.require_api_key()?;
        let gateway = HttpGateway::new(&config.http.user_agent, config.http.timeout)?;

        let omdb = OmdbClient::new(gateway.clone(), config.omdb.base_url.clone(), omdb_key);
        let tmdb = TmdbClient::new(
            gateway,
            config.tmdb.base_url.clone(),
            tmdb_key,
            config.tmdb.image_base_url.clone(),
            config.tmdb.language.clone(),
        );

        Ok(Self::new(Resolver::new(omdb, tmdb)))
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Searches the primary provider by title
    pub async fn search(&self, title: &str) -> Lookup<Vec<MovieSummary>> {
        self.resolver.omdb().search(title).await
    }

    /// Fetches the detail record for a movie
    pub async fn movie_detail(&self, external_id: &str) -> Lookup<MovieDetail> {
        self.resolver.find_by_external_id(external_id).await
    }

    /// First [`CAST_LIMIT`] billed cast members; empty if anything along the way fails
    pub async fn cast(&self, external_id: &str) -> Vec<CastMember> {
        match self.resolver.find_secondary_record(external_id).await {
            Some(movie) => self.cast_for(movie.id).await,
            None => Vec::new(),
        }
    }

    /// Up to [`RECOMMENDATION_LIMIT`] related movies, each cross-referenced
    pub async fn recommendations(&self, external_id: &str) -> Vec<MovieSummary> {
        match self.resolver.find_secondary_record(external_id).await {
            Some(movie) => self.recommendations_for(movie.id).await,
            None => Vec::new(),
        }
    }

    /// The first YouTube trailer, if there is one
    pub async fn trailer(&self, external_id: &str) -> Option<TrailerRef> {
        let movie = self.resolver.find_secondary_record(external_id).await?;
        self.trailer_for(movie.id).await
    }

    /// Popular movies carousel
    pub async fn popular(&self) -> Carousel {
        let listing = self.resolver.tmdb().popular().await;
        self.carousel(listing, CAROUSEL_LIMIT).await
    }

    /// Trending today carousel
    pub async fn trending(&self) -> Carousel {
        let listing = self.resolver.tmdb().trending().await;
        self.carousel(listing, CAROUSEL_LIMIT).await
    }

    /// New releases carousel
    pub async fn now_playing(&self) -> Carousel {
        let listing = self.resolver.tmdb().now_playing().await;
        self.carousel(listing, CAROUSEL_LIMIT).await
    }

    /// Genre discovery page
    pub async fn by_genre(&self, genre: Genre) -> Carousel {
        let listing = self.resolver.tmdb().discover_by_genre(genre.id).await;
        self.carousel(listing, GENRE_LIMIT).await
    }

    pub(crate) async fn cast_for(&self, tmdb_id: u64) -> Vec<CastMember> {
        let mut cast = self.resolver.tmdb().credits(tmdb_id).await.unwrap_or_default();
        cast.truncate(CAST_LIMIT);
        cast
    }

    pub(crate) async fn recommendations_for(&self, tmdb_id: u64) -> Vec<MovieSummary> {
        match self.resolver.tmdb().recommendations(tmdb_id).await {
            Some(candidates) => {
                self.resolver
                    .resolve_summaries(&candidates, RECOMMENDATION_LIMIT)
                    .await
            }
            None => Vec::new(),
        }
    }

    pub(crate) async fn trailer_for(&self, tmdb_id: u64) -> Option<TrailerRef> {
        let videos = self.resolver.tmdb().videos(tmdb_id).await?;
        select_trailer(&videos)
    }

    async fn carousel(&self, listing: Option<Vec<TmdbMovie>>, limit: usize) -> Carousel {
        let Some(candidates) = listing else {
            return Carousel::default();
        };

        let backdrops = candidates
            .iter()
            .take(limit)
            .filter_map(|m| {
                self.resolver
                    .tmdb()
                    .optional_image_url(m.backdrop_path.as_deref(), ImageSize::Backdrop)
            })
            .collect();

        Carousel {
            movies: self.resolver.resolve_summaries(&candidates, limit).await,
            backdrops,
        }
    }
}

/// Picks the first video that is a trailer hosted on YouTube
fn select_trailer(videos: &[TmdbVideo]) -> Option<TrailerRef> {
    videos
        .iter()
        .find(|v| v.kind == TRAILER_TYPE && v.site == TRAILER_SITE)
        .map(|v| TrailerRef {
            key: v.key.clone(),
            name: v.name.clone(),
            site: v.site.clone(),
        })
}
