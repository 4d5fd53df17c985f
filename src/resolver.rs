//! Record resolution across providers
//!
//! The stable external identifier (IMDb ID) is the primary key throughout the
//! crate. TMDb knows movies by numeric IDs, so every TMDb record has to be
//! cross-referenced before it can be shown, and every detail page has to find
//! its TMDb counterpart before it can be enriched.

use crate::metadata_retrieval::{
    ImageSize, Lookup, MovieDetail, MovieSummary, OmdbClient, TmdbClient, TmdbMovie,
};
use futures::future::join_all;

/// Translates between the primary and secondary provider identifier spaces.
///
/// Nothing is cached: each call queries upstream again.
#[derive(Debug, Clone)]
pub struct Resolver {
    omdb: OmdbClient,
    tmdb: TmdbClient,
}

impl Resolver {
    /// Creates a resolver over both provider clients
    pub fn new(omdb: OmdbClient, tmdb: TmdbClient) -> Self {
        Self { omdb, tmdb }
    }

    /// The primary provider client
    pub fn omdb(&self) -> &OmdbClient {
        &self.omdb
    }

    /// The secondary provider client
    pub fn tmdb(&self) -> &TmdbClient {
        &self.tmdb
    }

    /// Looks up the primary record directly by its stable external identifier
    pub async fn find_by_external_id(&self, external_id: &str) -> Lookup<MovieDetail> {
        self.omdb.movie_by_id(external_id).await
    }

    /// Resolves a TMDb numeric ID to the stable external identifier.
    ///
    /// `None` means the movie has no cross-reference (or the lookup failed).
    /// Either way the movie is left out of whatever list is being built.
    pub async fn cross_reference(&self, tmdb_id: u64) -> Option<String> {
        let external_id = self.tmdb.external_imdb_id(tmdb_id).await;
        if external_id.is_none() {
            tracing::debug!(tmdb_id, "No external identifier, dropping candidate");
        }
        external_id
    }

    /// Finds the TMDb record for a stable external identifier
    pub async fn find_secondary_record(&self, external_id: &str) -> Option<TmdbMovie> {
        self.tmdb.find_by_imdb_id(external_id).await
    }

    /// Cross-references up to `limit` candidates into summaries.
    ///
    /// All lookups are issued concurrently and collected before filtering, so
    /// the output keeps the candidates' order. Candidates that fail to resolve
    /// are dropped; the batch itself never fails.
    pub async fn resolve_summaries(
        &self,
        candidates: &[TmdbMovie],
        limit: usize,
    ) -> Vec<MovieSummary> {
        let lookups = candidates
            .iter()
            .take(limit)
            .map(|movie| self.resolve_summary(movie));

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn resolve_summary(&self, movie: &TmdbMovie) -> Option<MovieSummary> {
        let external_id = self.cross_reference(movie.id).await?;

        Some(MovieSummary {
            external_id,
            title: movie.title.clone(),
            poster_url: self
                .tmdb
                .optional_image_url(movie.poster_path.as_deref(), ImageSize::Poster),
        })
    }
}
