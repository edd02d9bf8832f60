use std::sync::Arc;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    StatusCode, Url,
};
use serde::de::DeserializeOwned;

pub use super::auth::{AuthSession, AuthToken};
use super::transport::{FetchOptions, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::{
    errors::{Error, Result},
    pagination::{PaginationControls, ResultsInfo},
    query_state::QueryState,
    Genre, ListingPage, MovieDetails, MovieResults, MovieSummary,
};

/// A trait providing methods for the genre list to be cached and retrieved
///
/// The genre list is cached without expiry, [GenreCache::clear] is the only
/// way to get a fresh one.
pub trait GenreCache {
    fn save_genres(&mut self, genres: &[String]) -> Result<()>;
    fn load_genres(&self) -> Result<Option<Vec<String>>>;
    fn clear(&mut self) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    transport: Arc<dyn HttpTransport>,
    catalog_api_url: Arc<str>,
    session: AuthSession,
}

impl CatalogClient {
    pub fn new(catalog_api_url: String, token: Option<AuthToken>) -> Self {
        Self::with_transport(
            catalog_api_url,
            token,
            Arc::new(ReqwestTransport::default()),
        )
    }

    pub fn with_transport(
        catalog_api_url: String,
        token: Option<AuthToken>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let catalog_api_url: Arc<str> = catalog_api_url.trim_end_matches('/').into();
        let session = AuthSession::new(format!("{catalog_api_url}/auth/token"), token);
        Self {
            transport,
            catalog_api_url,
            session,
        }
    }

    pub fn catalog_api_url(&self) -> &str {
        &self.catalog_api_url
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Acquire an auth token, bypassing the cache if `force_refresh` is set
    pub async fn get_token(&self, force_refresh: bool) -> Result<AuthToken> {
        self.session
            .get_token(self.transport.as_ref(), force_refresh)
            .await
    }

    /// Absolute `http(s)` URLs are kept as-is, anything else is a path
    /// relative to the catalog API URL.
    fn resolve_url(&self, path: &str) -> Result<String> {
        let url = if path.starts_with("http") {
            path.to_owned()
        } else {
            format!(
                "{}/{}",
                self.catalog_api_url,
                path.trim_start_matches('/')
            )
        };
        Url::parse(&url).map_err(|e| {
            log::error!("Invalid URL {url}: {e}");
            Error::InvalidUrl(url.clone())
        })?;
        Ok(url)
    }

    /// The catalog URL extended with `segments`, each one percent-encoded
    /// as a single path segment
    fn segments_url(&self, segments: &[&str]) -> Result<String> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::InvalidUrl(format!("{}/{bad}", self.catalog_api_url)));
        }
        let mut url = Url::parse(&self.catalog_api_url)
            .map_err(|_| Error::InvalidUrl(self.catalog_api_url.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.catalog_api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    async fn attempt(
        &self,
        url: &str,
        options: &FetchOptions,
        token: &AuthToken,
    ) -> Result<HttpResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(Error::generic)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        self.transport
            .send(HttpRequest {
                method: options.method.clone(),
                url: url.to_owned(),
                headers,
                body: options.body.clone(),
            })
            .await
    }

    /// Send a request to the catalog API with a bearer token
    ///
    /// If the API answers 401, a new token is requested and the request is
    /// sent exactly once more; that second response is returned whatever it
    /// is. Any other response, successful or not, is returned unmodified.
    ///
    /// # Errors
    /// Fails if a token cannot be obtained (see [Error::is_auth_failure]) or
    /// if the request cannot be sent. A non-2XX catalog response is NOT an
    /// error.
    pub async fn authenticated_fetch(
        &self,
        path: &str,
        options: FetchOptions,
    ) -> Result<HttpResponse> {
        let url = self.resolve_url(path)?;

        let token = self.get_token(false).await?;
        let response = self.attempt(&url, &options, &token).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::debug!("{url} answered 401, retrying once with a new token");
        let token = self.get_token(true).await?;
        self.attempt(&url, &options, &token).await
    }

    async fn api_call_get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.authenticated_fetch(path, FetchOptions::default())
            .await?
            .error_for_status()?
            .json()
    }

    ////////////////////////
    //       Movies       //
    ////////////////////////
    pub async fn list_movies(&self, query: &QueryState) -> Result<ListingPage<MovieSummary>> {
        let path = format!("movies?{}", query.to_query_string());
        self.api_call_get(&path).await
    }

    /// List the page of `query` along with the exact size of its result set
    ///
    /// The catalog only reports the number of pages, so unless `query`
    /// already is on the last page, the last page is fetched as well. If that
    /// second fetch fails the page is still returned, with a total of 0.
    pub async fn list_movies_with_count(&self, query: &QueryState) -> Result<MovieResults> {
        let current = self.list_movies(query).await?;
        let total_pages = current.total_pages;

        let fetched_last;
        let last = if total_pages == 0 {
            None
        } else if query.page == total_pages {
            Some(&current)
        } else {
            fetched_last = match self.list_movies(&query.with_page(total_pages)).await {
                Ok(page) => Some(page),
                Err(e) => {
                    log::warn!("Could not fetch the last page ({total_pages}): {e}");
                    None
                }
            };
            fetched_last.as_ref()
        };

        let results = ResultsInfo::reconcile(Some(&current), last, query.page, query.limit);
        log::debug!("results={results:?}");
        Ok(MovieResults {
            query: query.clone(),
            total_pages,
            results,
            pagination: PaginationControls::new(query.page, total_pages, &results),
            movies: current.data,
        })
    }

    pub async fn get_movie(&self, movie_id: &str) -> Result<MovieDetails> {
        let url = self.segments_url(&["movies", movie_id])?;
        self.api_call_get(&url).await
    }

    ////////////////////////
    //       Genres       //
    ////////////////////////
    /// The genre titles, in catalog order
    pub async fn list_genres(&self) -> Result<Vec<String>> {
        let genres: ListingPage<Genre> = self.api_call_get("genres/movies").await?;
        Ok(genres.data.into_iter().map(|g| g.title).collect())
    }

    /// Same as [CatalogClient::list_genres] but go through `cache` first
    ///
    /// The cache is best effort: failing to read or write it is logged and
    /// otherwise ignored.
    pub async fn list_genres_cached<C: GenreCache>(&self, cache: &mut C) -> Result<Vec<String>> {
        match cache.load_genres() {
            Ok(Some(genres)) => {
                log::debug!("Using {} cached genres", genres.len());
                return Ok(genres);
            }
            Ok(None) => (),
            Err(e) => log::warn!("{e}"),
        }
        let genres = self.list_genres().await?;
        if let Err(e) = cache.save_genres(&genres) {
            log::warn!("{e}");
        }
        Ok(genres)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::tests::{
        block_on, dark_knight_json, get_test_client, listing_json, MemoryGenreCache,
        ScriptedTransport, API_URL, AUTH_URL,
    };

    fn movies_url(query: &str) -> String {
        format!("{API_URL}/movies?{query}")
    }

    fn bearer(transport: &ScriptedTransport, index: usize) -> String {
        transport.requests()[index]
            .headers
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[test]
    fn first_call_fetches_token_first() {
        let (client, transport) = get_test_client(None);
        transport.token("mock-token");
        transport.reply(&format!("{API_URL}/movies/movie-1"), 200, dark_knight_json());

        let movie = block_on(client.get_movie("movie-1")).unwrap();
        assert_eq!(movie.title, "The Dark Knight");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, AUTH_URL);
        assert_eq!(requests[1].url, format!("{API_URL}/movies/movie-1"));
        assert_eq!(bearer(&transport, 1), "Bearer mock-token");
        assert_eq!(
            requests[1].headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn unauthorized_retries_once_with_new_token() {
        let (client, transport) = get_test_client(Some("expired"));
        transport.token("renewed");
        let url = format!("{API_URL}/movies/movie-1");
        transport.reply(&url, 401, r#"{"error": "Unauthorized"}"#);
        transport.reply(&url, 200, dark_knight_json());

        let response = block_on(client.authenticated_fetch("/movies/movie-1", FetchOptions::default()))
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);

        assert_eq!(transport.count(AUTH_URL), 1);
        assert_eq!(transport.count(&url), 2);
        assert_eq!(bearer(&transport, 0), "Bearer expired");
        assert_eq!(bearer(&transport, 2), "Bearer renewed");
        assert_eq!(
            client.session().cached_token(),
            Some(AuthToken::new("renewed"))
        );
    }

    #[test]
    fn second_unauthorized_is_returned() {
        let (client, transport) = get_test_client(Some("expired"));
        transport.token("still-bad");
        let url = format!("{API_URL}/movies/movie-1");
        transport.reply(&url, 401, r#"{"error": "Unauthorized"}"#);

        let response =
            block_on(client.authenticated_fetch("/movies/movie-1", FetchOptions::default()))
                .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(transport.count(&url), 2);
        assert_eq!(transport.count(AUTH_URL), 1);
    }

    #[test]
    fn other_failures_are_not_retried() {
        let (client, transport) = get_test_client(Some("valid"));
        let url = format!("{API_URL}/movies/movie-1");
        transport.reply(&url, 500, r#"{"error": "Internal Server Error"}"#);

        let response =
            block_on(client.authenticated_fetch("/movies/movie-1", FetchOptions::default()))
                .unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.count(&url), 1);
        assert_eq!(transport.count(AUTH_URL), 0);

        let err = block_on(client.get_movie("movie-1")).unwrap_err();
        assert!(matches!(err, Error::ApiErrorResponse { code: 500, .. }));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn refresh_failure_is_an_auth_error() {
        let (client, transport) = get_test_client(Some("expired"));
        transport.reply(AUTH_URL, 500, "");
        transport.reply(&format!("{API_URL}/movies/movie-1"), 401, "");

        let err = block_on(client.authenticated_fetch("movies/movie-1", FetchOptions::default()))
            .unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed { code: 500 }));
    }

    #[test]
    fn caller_headers_win() {
        let (client, transport) = get_test_client(Some("valid"));
        let url = format!("{API_URL}/genres/movies");
        transport.reply(&url, 200, "{}");

        let options = FetchOptions::new(reqwest::Method::POST)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body("payload");
        block_on(client.authenticated_fetch("/genres/movies", options)).unwrap();

        let requests = transport.requests();
        let request = &requests[0];
        assert_eq!(request.method, reqwest::Method::POST);
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer valid");
        assert_eq!(request.body.as_deref(), Some("payload"));
    }

    #[test]
    fn url_resolution() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply("http://elsewhere.test/movies", 200, "{}");
        block_on(client.authenticated_fetch(
            "http://elsewhere.test/movies",
            FetchOptions::default(),
        ))
        .unwrap();
        assert_eq!(transport.requests()[0].url, "http://elsewhere.test/movies");

        let err =
            block_on(client.authenticated_fetch("http//broken", FetchOptions::default()))
                .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn not_found_movie() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(
            &format!("{API_URL}/movies/unknown"),
            404,
            r#"{"error": "Movie not found"}"#,
        );
        let err = block_on(client.get_movie("unknown")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn listing_with_exact_count() {
        let (client, transport) = get_test_client(Some("valid"));
        let query = QueryState::default().with_search("the").with_page(2);
        transport.reply(
            &movies_url("page=2&limit=25&search=the"),
            200,
            &listing_json(25, 4),
        );
        transport.reply(
            &movies_url("page=4&limit=25&search=the"),
            200,
            &listing_json(10, 4),
        );

        let res = block_on(client.list_movies_with_count(&query)).unwrap();
        assert_eq!(res.movies.len(), 25);
        assert_eq!(res.total_pages, 4);
        assert_eq!(
            res.results,
            ResultsInfo {
                start: 26,
                end: 50,
                total: 85
            }
        );
        let pagination = res.pagination.unwrap();
        assert_eq!(pagination.previous, Some(1));
        assert_eq!(pagination.next, Some(3));
        assert_eq!(
            pagination.summary.as_deref(),
            Some("Showing results 26-50 of 85")
        );
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn listing_on_last_page_needs_one_fetch() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(&movies_url("page=3&limit=25"), 200, &listing_json(7, 3));

        let res = block_on(client.list_movies_with_count(&QueryState::default().with_page(3)))
            .unwrap();
        assert_eq!(res.results.total, 57);
        assert_eq!(res.results.start, 51);
        assert_eq!(res.results.end, 57);
        assert_eq!(transport.requests().len(), 1);

        // Single page result set
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(&movies_url("page=1&limit=25"), 200, &listing_json(4, 1));
        let res = block_on(client.list_movies_with_count(&QueryState::default())).unwrap();
        assert_eq!(res.results.total, 4);
        assert!(res.pagination.is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn listing_past_the_last_page() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(&movies_url("page=10&limit=25"), 200, &listing_json(0, 4));
        transport.reply(&movies_url("page=4&limit=25"), 200, &listing_json(10, 4));

        let res = block_on(client.list_movies_with_count(&QueryState::default().with_page(10)))
            .unwrap();
        assert!(res.movies.is_empty());
        assert_eq!(res.results.total, 85);
        let pagination = res.pagination.unwrap();
        assert_eq!(pagination.pages, vec![1, 2, 3, 4]);
        assert_eq!(pagination.previous, Some(4));
        assert_eq!(pagination.next, None);
        assert_eq!(pagination.summary, None);
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn movie_id_is_a_single_path_segment() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(&format!("{API_URL}/movies/a%3Fb"), 200, dark_knight_json());
        block_on(client.get_movie("a?b")).unwrap();

        let err = block_on(client.get_movie("../auth/token")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            transport.requests()[1].url,
            format!("{API_URL}/movies/..%2Fauth%2Ftoken")
        );
        assert_eq!(transport.count(AUTH_URL), 0);

        for id in ["", ".", ".."] {
            assert!(matches!(
                block_on(client.get_movie(id)),
                Err(Error::InvalidUrl(_))
            ));
        }
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn listing_survives_last_page_failure() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(&movies_url("page=1&limit=25"), 200, &listing_json(25, 5));
        transport.reply(&movies_url("page=5&limit=25"), 500, "");

        let res = block_on(client.list_movies_with_count(&QueryState::default())).unwrap();
        assert_eq!(res.movies.len(), 25);
        assert_eq!(
            res.results,
            ResultsInfo {
                start: 1,
                end: 25,
                total: 0
            }
        );
        assert_eq!(res.pagination.unwrap().summary, None);
    }

    #[test]
    fn listing_failure_is_an_error() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(&movies_url("page=1&limit=25"), 503, "");
        assert!(matches!(
            block_on(client.list_movies_with_count(&QueryState::default())),
            Err(Error::ApiErrorResponse { code: 503, .. })
        ));
    }

    #[test]
    fn empty_listing() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(
            &movies_url("page=1&limit=25&genre=Western"),
            200,
            &listing_json(0, 0),
        );
        let res =
            block_on(client.list_movies_with_count(&QueryState::default().with_genre("Western")))
                .unwrap();
        assert!(res.movies.is_empty());
        assert_eq!(res.results.total, 0);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn genres() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(
            &format!("{API_URL}/genres/movies"),
            200,
            r#"{"data": [
                {"id": "1", "title": "Action", "movies": ["movie1", "movie2"]},
                {"id": "2", "title": "Comedy", "movies": ["movie3"]}
            ], "totalPages": 1}"#,
        );
        let mut cache = MemoryGenreCache::default();

        let genres = block_on(client.list_genres_cached(&mut cache)).unwrap();
        assert_eq!(genres, vec!["Action".to_owned(), "Comedy".to_owned()]);
        assert_eq!(cache.genres, Some(genres.clone()));

        // Served from the cache afterwards
        let again = block_on(client.list_genres_cached(&mut cache)).unwrap();
        assert_eq!(again, genres);
        assert_eq!(transport.count(&format!("{API_URL}/genres/movies")), 1);
    }

    #[test]
    fn genres_failure_is_not_cached() {
        let (client, transport) = get_test_client(Some("valid"));
        transport.reply(
            &format!("{API_URL}/genres/movies"),
            500,
            r#"{"error": "Internal Server Error"}"#,
        );
        let mut cache = MemoryGenreCache::default();
        assert!(block_on(client.list_genres_cached(&mut cache)).is_err());
        assert_eq!(cache.genres, None);
    }
}
