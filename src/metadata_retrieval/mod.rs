/// Data structures and provider clients for movie metadata retrieval.
///
/// The primary provider (OMDb) supplies the canonical detail record, the
/// secondary provider (TMDb) supplies listings, cast, videos and
/// recommendations. Both are reached through the shared HTTP gateway and
/// mapped into the records defined here.
mod omdb;
mod omdb_types;
mod tmdb;
mod tmdb_types;

pub use omdb::OmdbClient;
pub use tmdb::{GENRES, Genre, ImageSize, TmdbClient};
pub use tmdb_types::TmdbMovie;
pub(crate) use tmdb_types::TmdbVideo;

use crate::rating::StarRating;
use serde::{Deserialize, Serialize};

/// Outcome of a single provider lookup.
///
/// Keeps an explicit negative answer from the provider apart from a failed
/// request, so callers can show "not found" and "unavailable" differently.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The provider returned the record
    Found(T),
    /// The provider answered with its negative-response flag
    NotFound,
    /// The request failed (transport, HTTP status or malformed body)
    Unavailable,
}

impl<T> Lookup<T> {
    /// Returns the record if one was found
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Unavailable => None,
        }
    }

    /// Returns true for [`Lookup::Found`]
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// A movie as it appears in search results, carousels and recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Stable external identifier (IMDb ID) shared by both providers
    pub external_id: String,
    /// Display title
    pub title: String,
    /// Poster image URL, if the provider has one
    pub poster_url: Option<String>,
}

/// The full detail record of a movie from the primary provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// Stable external identifier (IMDb ID)
    pub external_id: String,
    pub title: String,
    /// Release year as reported, e.g. `1994` or `2019–2021`
    pub year: String,
    /// Comma separated genre list
    pub genre: String,
    pub runtime_minutes: Option<u32>,
    /// Rating on a 0 to 10 scale
    pub rating_out_of_ten: Option<f64>,
    pub plot: String,
    pub poster_url: Option<String>,
}

impl MovieDetail {
    /// Star rendering of the rating (absent rating yields zero stars)
    pub fn stars(&self) -> StarRating {
        StarRating::from_rating(self.rating_out_of_ten)
    }

    /// Runtime formatted as `2h 22m`, or an empty string when unknown
    pub fn runtime_display(&self) -> String {
        format_runtime(self.runtime_minutes)
    }
}

/// A cast member from the secondary provider's credits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

/// A playable trailer hosted on the video platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerRef {
    /// Platform-specific video key
    pub key: String,
    pub name: String,
    pub site: String,
}

impl TrailerRef {
    /// The watch URL on the hosting platform
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }
}

/// Formats a runtime in minutes as `Xh Ym`.
///
/// Unknown or zero runtimes produce an empty string.
pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(minutes) if minutes > 0 => format!("{}h {}m", minutes / 60, minutes % 60),
        _ => String::new(),
    }
}
