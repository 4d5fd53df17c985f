/// TMDb metadata provider implementation.
use super::tmdb_types::{
    TmdbCastMember, TmdbCredits, TmdbExternalIds, TmdbFindResponse, TmdbMovie, TmdbPage,
    TmdbVideo, TmdbVideos,
};
use super::CastMember;
use crate::gateway::{HttpGateway, redact};
use url::Url;

/// Image renditions served by the TMDb image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Carousel and card posters
    Poster,
    /// Cast headshots
    Profile,
    /// Full width page backdrops
    Backdrop,
}

impl ImageSize {
    fn as_str(self) -> &'static str {
        match self {
            ImageSize::Poster => "w342",
            ImageSize::Profile => "w185",
            ImageSize::Backdrop => "w1280",
        }
    }
}

/// A TMDb movie genre usable for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: &'static str,
}

impl Genre {
    /// Looks up a genre by name, ignoring case and surrounding whitespace
    pub fn by_name(name: &str) -> Option<Genre> {
        let name = name.trim();
        GENRES
            .iter()
            .copied()
            .find(|g| g.name.eq_ignore_ascii_case(name))
    }
}

/// TMDb's movie genre table.
pub const GENRES: &[Genre] = &[
    Genre { id: 28, name: "Action" },
    Genre { id: 12, name: "Adventure" },
    Genre { id: 16, name: "Animation" },
    Genre { id: 35, name: "Comedy" },
    Genre { id: 80, name: "Crime" },
    Genre { id: 99, name: "Documentary" },
    Genre { id: 18, name: "Drama" },
    Genre { id: 10751, name: "Family" },
    Genre { id: 14, name: "Fantasy" },
    Genre { id: 36, name: "History" },
    Genre { id: 27, name: "Horror" },
    Genre { id: 10402, name: "Music" },
    Genre { id: 9648, name: "Mystery" },
    Genre { id: 10749, name: "Romance" },
    Genre { id: 878, name: "Science Fiction" },
    Genre { id: 10770, name: "TV Movie" },
    Genre { id: 53, name: "Thriller" },
    Genre { id: 10752, name: "War" },
    Genre { id: 37, name: "Western" },
];

/// Client for the TMDb v3 API, the secondary metadata provider.
///
/// Every request carries the API key as the `api_key` query parameter.
/// Methods return `None` when the request failed; the gateway has already
/// logged why.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    gateway: HttpGateway,
    base_url: Url,
    api_key: String,
    image_base_url: String,
    language: String,
}

impl TmdbClient {
    /// Creates a new TMDb client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.themoviedb.org/3/` (trailing slash required)
    /// * `image_base_url` - Image CDN root, e.g. `https://image.tmdb.org/t/p`
    /// * `language` - Language sent with listing requests, e.g. `en-US`
    pub fn new(
        gateway: HttpGateway,
        base_url: Url,
        api_key: impl Into<String>,
        image_base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let image_base_url: String = image_base_url.into();
        Self {
            gateway,
            base_url,
            api_key: api_key.into(),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            language: language.into(),
        }
    }

    /// Popular movies
    pub async fn popular(&self) -> Option<Vec<TmdbMovie>> {
        self.listing(&["movie", "popular"], &[("language", self.language.as_str())])
            .await
    }

    /// Movies trending today
    pub async fn trending(&self) -> Option<Vec<TmdbMovie>> {
        self.listing(&["trending", "movie", "day"], &[]).await
    }

    /// Movies currently in theatres
    pub async fn now_playing(&self) -> Option<Vec<TmdbMovie>> {
        self.listing(&["movie", "now_playing"], &[("language", self.language.as_str())])
            .await
    }

    /// Movies discovered by genre
    pub async fn discover_by_genre(&self, genre_id: u32) -> Option<Vec<TmdbMovie>> {
        let genre_id = genre_id.to_string();
        self.listing(&["discover", "movie"], &[("with_genres", genre_id.as_str())])
            .await
    }

    /// Recommendations related to a movie
    pub async fn recommendations(&self, tmdb_id: u64) -> Option<Vec<TmdbMovie>> {
        let tmdb_id = tmdb_id.to_string();
        self.listing(
            &["movie", tmdb_id.as_str(), "recommendations"],
            &[("language", self.language.as_str())],
        )
        .await
    }

    /// Looks up the IMDb ID cross-referenced by a TMDb movie.
    ///
    /// Returns `None` when the request fails or TMDb has no (or an empty)
    /// IMDb ID for the movie.
    pub async fn external_imdb_id(&self, tmdb_id: u64) -> Option<String> {
        let tmdb_id = tmdb_id.to_string();
        let ids: TmdbExternalIds = self
            .get(&["movie", tmdb_id.as_str(), "external_ids"], &[])
            .await?;

        ids.imdb_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// Finds the TMDb movie matching an IMDb ID (first match only).
    pub async fn find_by_imdb_id(&self, imdb_id: &str) -> Option<TmdbMovie> {
        let response: TmdbFindResponse = self
            .get(&["find", imdb_id], &[("external_source", "imdb_id")])
            .await?;

        response.movie_results.into_iter().next()
    }

    /// Billed cast in credit order
    pub async fn credits(&self, tmdb_id: u64) -> Option<Vec<CastMember>> {
        let tmdb_id = tmdb_id.to_string();
        let credits: TmdbCredits = self.get(&["movie", tmdb_id.as_str(), "credits"], &[]).await?;

        Some(
            credits
                .cast
                .into_iter()
                .map(|member| self.convert_cast_member(member))
                .collect(),
        )
    }

    /// Videos attached to a movie
    pub(crate) async fn videos(&self, tmdb_id: u64) -> Option<Vec<TmdbVideo>> {
        let tmdb_id = tmdb_id.to_string();
        let videos: TmdbVideos = self.get(&["movie", tmdb_id.as_str(), "videos"], &[]).await?;
        Some(videos.results)
    }

    /// Builds the CDN URL for an image path such as `/abc.jpg`
    pub fn image_url(&self, path: &str, size: ImageSize) -> String {
        format!("{}/{}{}", self.image_base_url, size.as_str(), path)
    }

    /// Like [`TmdbClient::image_url`] but for an optional path
    pub fn optional_image_url(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| self.image_url(p, size))
    }

    fn convert_cast_member(&self, member: TmdbCastMember) -> CastMember {
        CastMember {
            profile_url: self.optional_image_url(member.profile_path.as_deref(), ImageSize::Profile),
            name: member.name,
            character: member.character.filter(|c| !c.trim().is_empty()),
        }
    }

    async fn listing(&self, segments: &[&str], params: &[(&str, &str)]) -> Option<Vec<TmdbMovie>> {
        let page: TmdbPage = self.get(segments, params).await?;
        Some(page.results)
    }

    /// Requests `segments` below the API root
    ///
    /// Each segment is percent-encoded on its own, so values such as an IMDb
    /// ID from user input cannot add path levels or a query.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Option<T> {
        let url = self.endpoint(segments, params)?;
        self.gateway.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Option<Url> {
        let mut url = self.base_url.clone();
        match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().extend(segments);
            }
            Err(()) => {
                tracing::warn!(base_url = %redact(&self.base_url), "TMDb base URL cannot hold a path");
                return None;
            }
        }

        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .extend_pairs(params);

        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_IMAGES: &str = "https://image.tmdb.org/t/p";

    fn client_for(server: &MockServer) -> TmdbClient {
        let gateway = HttpGateway::new("cinefind-test/0.0.0", None).unwrap();
        let base_url = Url::parse(&format!("{}/3/", server.uri())).unwrap();
        TmdbClient::new(
            gateway,
            base_url,
            "tmdb-key",
            "https://image.tmdb.org/t/p/",
            "en-US",
        )
    }

    #[test]
    fn test_genre_by_name() {
        assert_eq!(Genre::by_name("action").map(|g| g.id), Some(28));
        assert_eq!(Genre::by_name(" Science Fiction ").map(|g| g.id), Some(878));
        assert_eq!(Genre::by_name("tv movie").map(|g| g.id), Some(10770));
        assert_eq!(Genre::by_name("Telenovela"), None);
    }

    #[tokio::test]
    async fn test_image_url() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        assert_eq!(
            client.image_url("/poster.jpg", ImageSize::Poster),
            "https://image.tmdb.org/t/p/w342/poster.jpg"
        );
        assert_eq!(
            client.optional_image_url(Some("/face.jpg"), ImageSize::Profile),
            Some("https://image.tmdb.org/t/p/w185/face.jpg".to_string())
        );
        assert_eq!(client.optional_image_url(None, ImageSize::Backdrop), None);
        assert_eq!(client.optional_image_url(Some(""), ImageSize::Backdrop), None);
    }

    #[tokio::test]
    async fn test_popular_sends_key_and_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/popular"))
            .and(query_param("api_key", "tmdb-key"))
            .and(query_param("language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page":1,"results":[{"id":550,"title":"Fight Club","poster_path":"/fc.jpg","backdrop_path":null}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let movies = client_for(&server).popular().await.unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, 550);
        assert_eq!(movies[0].title, "Fight Club");
        assert_eq!(movies[0].poster_path.as_deref(), Some("/fc.jpg"));
    }

    #[tokio::test]
    async fn test_external_imdb_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/550/external_ids"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":550,"imdb_id":"tt0137523","wikidata_id":"Q190050"}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/551/external_ids"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":551,"imdb_id":null}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/552/external_ids"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":552,"imdb_id":""}"#))
            .mount(&server)
            .await;

        let client = client_for(&server);

        assert_eq!(client.external_imdb_id(550).await.as_deref(), Some("tt0137523"));
        assert_eq!(client.external_imdb_id(551).await, None);
        assert_eq!(client.external_imdb_id(552).await, None);
        // Unmatched path answers 404
        assert_eq!(client.external_imdb_id(553).await, None);
    }

    #[tokio::test]
    async fn test_find_by_imdb_id_takes_first_movie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/find/tt0137523"))
            .and(query_param("external_source", "imdb_id"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"movie_results":[{"id":550,"title":"Fight Club"},{"id":9999,"title":"Other"}],"tv_results":[]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/find/tt0000000"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"movie_results":[],"tv_results":[]}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);

        assert_eq!(client.find_by_imdb_id("tt0137523").await.map(|m| m.id), Some(550));
        assert_eq!(client.find_by_imdb_id("tt0000000").await, None);
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let gateway = HttpGateway::new("cinefind-test/0.0.0", None).unwrap();
        let base_url = Url::parse("https://api.themoviedb.org/3/").unwrap();
        let client = TmdbClient::new(gateway, base_url, "k", DEFAULT_IMAGES, "en-US");

        let url = client.endpoint(&["find", "../movie/550?page=2#x"], &[]).unwrap();

        assert_eq!(url.path(), "/3/find/..%2Fmovie%2F550%3Fpage=2%23x");
        let keys: Vec<_> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, ["api_key"]);
    }

    #[tokio::test]
    async fn test_find_by_imdb_id_cannot_escape_find_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"movie_results":[{"id":550,"title":"Fight Club"}]}"#,
            ))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);

        assert_eq!(client.find_by_imdb_id("../movie/550").await, None);
    }

    #[tokio::test]
    async fn test_credits_maps_profile_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/550/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":550,"cast":[
                    {"name":"Edward Norton","character":"The Narrator","profile_path":"/en.jpg"},
                    {"name":"Extra","character":"","profile_path":null}
                ],"crew":[]}"#,
            ))
            .mount(&server)
            .await;

        let cast = client_for(&server).credits(550).await.unwrap();

        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0].name, "Edward Norton");
        assert_eq!(cast[0].character.as_deref(), Some("The Narrator"));
        assert_eq!(
            cast[0].profile_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w185/en.jpg")
        );
        assert_eq!(cast[1].character, None);
        assert_eq!(cast[1].profile_url, None);
    }
}
