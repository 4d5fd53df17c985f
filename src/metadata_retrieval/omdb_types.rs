/// OMDb API response types for deserialization.
///
/// These structures mirror the JSON response format of the OMDb API. Every
/// response carries a `Response` flag of `"True"` or `"False"`; on `"False"`
/// only `Error` is populated, so all payload fields are optional.
use serde::Deserialize;

/// The response of a title search (`?s=`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct OmdbSearchResponse {
    /// `"True"` or `"False"`
    pub response: String,
    /// Matches, absent on a negative response
    #[serde(default)]
    pub search: Vec<OmdbSearchItem>,
    /// Provider message on a negative response, e.g. `Movie not found!`
    pub error: Option<String>,
}

/// A single search hit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct OmdbSearchItem {
    pub title: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Poster URL or `"N/A"`
    pub poster: Option<String>,
}

/// The response of a lookup by IMDb ID (`?i=...&plot=full`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct OmdbMovie {
    pub response: String,
    pub error: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    /// Runtime text such as `"142 min"` or `"N/A"`
    pub runtime: Option<String>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
}
