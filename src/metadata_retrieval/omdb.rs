/// OMDb metadata provider implementation.
use super::omdb_types::{OmdbMovie, OmdbSearchItem, OmdbSearchResponse};
use super::{Lookup, MovieDetail, MovieSummary};
use crate::gateway::HttpGateway;
use url::Url;

/// OMDb's placeholder for missing values
const NOT_AVAILABLE: &str = "N/A";

/// Client for the OMDb API, the primary metadata provider.
///
/// All requests go to the configured base URL with the API key passed as the
/// `apikey` query parameter.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    gateway: HttpGateway,
    base_url: Url,
    api_key: String,
}

impl OmdbClient {
    /// Creates a new OMDb client.
    pub fn new(gateway: HttpGateway, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            gateway,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Searches movies by title.
    ///
    /// Returns [`Lookup::NotFound`] when OMDb reports no results.
    pub async fn search(&self, title: &str) -> Lookup<Vec<MovieSummary>> {
        let url = self.endpoint(&[("s", title)]);

        let Some(response) = self.gateway.get_json::<OmdbSearchResponse>(url).await else {
            return Lookup::Unavailable;
        };

        if is_negative(&response.response) {
            tracing::debug!(
                title,
                reason = response.error.as_deref().unwrap_or_default(),
                "OMDb search returned no results"
            );
            return Lookup::NotFound;
        }

        Lookup::Found(
            response
                .search
                .into_iter()
                .map(Self::convert_search_item)
                .collect(),
        )
    }

    /// Fetches the full detail record (with full plot) for an IMDb ID.
    pub async fn movie_by_id(&self, imdb_id: &str) -> Lookup<MovieDetail> {
        let url = self.endpoint(&[("i", imdb_id), ("plot", "full")]);

        let Some(movie) = self.gateway.get_json::<OmdbMovie>(url).await else {
            return Lookup::Unavailable;
        };

        if is_negative(&movie.response) {
            tracing::debug!(
                imdb_id,
                reason = movie.error.as_deref().unwrap_or_default(),
                "OMDb has no record for id"
            );
            return Lookup::NotFound;
        }

        Lookup::Found(Self::convert_movie(movie, imdb_id))
    }

    fn endpoint(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .extend_pairs(params);
        url
    }

    /// Converts an OMDb search hit to our summary structure.
    fn convert_search_item(item: OmdbSearchItem) -> MovieSummary {
        MovieSummary {
            external_id: item.imdb_id,
            title: item.title,
            poster_url: present(item.poster),
        }
    }

    /// Converts an OMDb detail record to our detail structure.
    ///
    /// The requested ID is used when OMDb omits `imdbID` from the body.
    fn convert_movie(movie: OmdbMovie, requested_id: &str) -> MovieDetail {
        MovieDetail {
            external_id: present(movie.imdb_id).unwrap_or_else(|| requested_id.to_string()),
            title: movie.title.unwrap_or_default(),
            year: present(movie.year).unwrap_or_default(),
            genre: present(movie.genre).unwrap_or_default(),
            runtime_minutes: present(movie.runtime).and_then(|r| parse_runtime(&r)),
            rating_out_of_ten: present(movie.imdb_rating).and_then(|r| parse_rating(&r)),
            plot: present(movie.plot).unwrap_or_default(),
            poster_url: present(movie.poster),
        }
    }
}

/// OMDb's negative-response flag
fn is_negative(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("false")
}

/// Treats OMDb's `"N/A"` and blank strings as absent
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != NOT_AVAILABLE
    })
}

/// Parses runtime text like `"142 min"` into minutes
fn parse_runtime(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

fn parse_rating(rating: &str) -> Option<f64> {
    rating
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHAWSHANK: &str = r#"{
        "Title": "The Shawshank Redemption",
        "Year": "1994",
        "Rated": "R",
        "Runtime": "142 min",
        "Genre": "Drama",
        "Plot": "Over the course of several years, two convicts form a friendship.",
        "Poster": "https://m.media-amazon.com/images/M/shawshank.jpg",
        "imdbRating": "9.3",
        "imdbID": "tt0111161",
        "Type": "movie",
        "Response": "True"
    }"#;

    fn client_for(server: &MockServer) -> OmdbClient {
        let gateway = HttpGateway::new("cinefind-test/0.0.0", None).unwrap();
        let base_url = Url::parse(&format!("{}/", server.uri())).unwrap();
        OmdbClient::new(gateway, base_url, "test-key")
    }

    #[test]
    fn test_present_filters_not_available() {
        assert_eq!(present(Some("N/A".to_string())), None);
        assert_eq!(present(Some("  ".to_string())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("Drama".to_string())), Some("Drama".to_string()));
    }

    #[test]
    fn test_parse_runtime() {
        assert_eq!(parse_runtime("142 min"), Some(142));
        assert_eq!(parse_runtime("90"), Some(90));
        assert_eq!(parse_runtime("unknown"), None);
        assert_eq!(parse_runtime(""), None);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("7.8"), Some(7.8));
        assert_eq!(parse_rating("N/A"), None);
        assert_eq!(parse_rating("NaN"), None);
    }

    #[test]
    fn test_convert_movie_with_missing_fields() {
        let movie: OmdbMovie = serde_json::from_str(
            r#"{"Title":"Obscure","Runtime":"N/A","imdbRating":"N/A","Poster":"N/A","Response":"True"}"#,
        )
        .unwrap();

        let detail = OmdbClient::convert_movie(movie, "tt0000001");

        assert_eq!(detail.external_id, "tt0000001");
        assert_eq!(detail.title, "Obscure");
        assert_eq!(detail.runtime_minutes, None);
        assert_eq!(detail.rating_out_of_ten, None);
        assert_eq!(detail.poster_url, None);
        assert_eq!(detail.stars().filled(), 0);
    }

    #[tokio::test]
    async fn test_movie_by_id_via_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("i", "tt0111161"))
            .and(query_param("plot", "full"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SHAWSHANK))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let detail = client.movie_by_id("tt0111161").await.found().unwrap();

        assert_eq!(detail.external_id, "tt0111161");
        assert_eq!(detail.title, "The Shawshank Redemption");
        assert_eq!(detail.year, "1994");
        assert_eq!(detail.genre, "Drama");
        assert_eq!(detail.runtime_minutes, Some(142));
        assert_eq!(detail.rating_out_of_ten, Some(9.3));
        assert!(detail.plot.starts_with("Over the course"));
        assert_eq!(
            detail.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/shawshank.jpg")
        );
    }

    #[tokio::test]
    async fn test_movie_by_id_negative_response_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.movie_by_id("tt9999999").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_movie_by_id_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.movie_by_id("tt0111161").await, Lookup::Unavailable);
    }

    #[tokio::test]
    async fn test_search_via_http() {
        let server = MockServer::start().await;
        let body = r#"{
            "Search": [
                {"Title": "Alien", "Year": "1979", "imdbID": "tt0078748", "Type": "movie", "Poster": "https://img/alien.jpg"},
                {"Title": "Aliens", "Year": "1986", "imdbID": "tt0090605", "Type": "movie", "Poster": "N/A"}
            ],
            "totalResults": "2",
            "Response": "True"
        }"#;
        Mock::given(method("GET"))
            .and(query_param("s", "alien"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let results = client.search("alien").await.found().unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].external_id, "tt0078748");
        assert_eq!(results[0].poster_url.as_deref(), Some("https://img/alien.jpg"));
        assert_eq!(results[1].title, "Aliens");
        assert_eq!(results[1].poster_url, None);
    }

    #[tokio::test]
    async fn test_search_without_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Response":"False","Error":"Movie not found!"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.search("zzzzqqq").await, Lookup::NotFound);
    }
}
