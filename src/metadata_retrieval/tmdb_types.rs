/// TMDb API response types for deserialization.
///
/// These structures mirror the JSON response format of the TMDb v3 API.
use serde::Deserialize;

/// A paginated movie listing (popular, trending, discover, recommendations, ...).
#[derive(Debug, Deserialize)]
pub(super) struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// A movie record in the secondary provider's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbMovie {
    /// TMDb numeric movie ID
    pub id: u64,
    /// Display title (trending entries may omit it)
    #[serde(default)]
    pub title: String,
    /// Poster path relative to the image CDN, e.g. `/abc.jpg`
    pub poster_path: Option<String>,
    /// Backdrop path relative to the image CDN
    pub backdrop_path: Option<String>,
}

/// Response of `movie/{id}/external_ids`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbExternalIds {
    /// IMDb ID; null or empty when TMDb has no cross-reference
    pub imdb_id: Option<String>,
}

/// Response of `find/{external_id}`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbFindResponse {
    #[serde(default)]
    pub movie_results: Vec<TmdbMovie>,
}

/// Response of `movie/{id}/credits`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

/// A single billed cast member.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbCastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

/// Response of `movie/{id}/videos`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

/// A video attached to a movie (trailer, teaser, clip, ...).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TmdbVideo {
    /// Platform-specific key
    pub key: String,
    #[serde(default)]
    pub name: String,
    /// Hosting platform, e.g. `YouTube` or `Vimeo`
    pub site: String,
    /// Video type, e.g. `Trailer`, `Teaser`, `Featurette`
    #[serde(rename = "type")]
    pub kind: String,
}
