use std::sync::Arc;

use super::Blocker;

use crate::{
    async_client::{AuthSession, AuthToken, FetchOptions, GenreCache, HttpResponse, HttpTransport},
    errors::Result,
    query_state::QueryState,
    ListingPage, MovieDetails, MovieResults, MovieSummary,
};

#[derive(Debug, Clone)]
pub struct CatalogClient {
    inner: crate::async_client::CatalogClient,
    blocker: &'static Blocker,
}

macro_rules! impl_blocking {
    ($fn_name:ident(& $self:ident $(,$a:ident : $t:ty)*) -> $ret:ty) => {
        pub fn $fn_name(& $self $(,$a : $t)*) -> $ret {
            $self.blocker.block_on($self.inner.$fn_name($($a),*))
        }
    };
}

impl CatalogClient {
    pub fn new(catalog_api_url: String, token: Option<AuthToken>) -> Self {
        Self {
            inner: crate::async_client::CatalogClient::new(catalog_api_url, token),
            blocker: super::blocker(),
        }
    }

    pub fn with_transport(
        catalog_api_url: String,
        token: Option<AuthToken>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            inner: crate::async_client::CatalogClient::with_transport(
                catalog_api_url,
                token,
                transport,
            ),
            blocker: super::blocker(),
        }
    }

    pub fn catalog_api_url(&self) -> &str {
        self.inner.catalog_api_url()
    }

    pub fn session(&self) -> &AuthSession {
        self.inner.session()
    }

    impl_blocking!(get_token(&self, force_refresh: bool) -> Result<AuthToken>);
    impl_blocking!(authenticated_fetch(&self, path: &str, options: FetchOptions) -> Result<HttpResponse>);

    ////////////////////////
    //       Movies       //
    ////////////////////////
    impl_blocking!(list_movies(&self, query: &QueryState) -> Result<ListingPage<MovieSummary>>);
    impl_blocking!(list_movies_with_count(&self, query: &QueryState) -> Result<MovieResults>);
    impl_blocking!(get_movie(&self, movie_id: &str) -> Result<MovieDetails>);

    ////////////////////////
    //       Genres       //
    ////////////////////////
    impl_blocking!(list_genres(&self) -> Result<Vec<String>>);

    pub fn list_genres_cached<C: GenreCache>(&self, cache: &mut C) -> Result<Vec<String>> {
        self.blocker.block_on(self.inner.list_genres_cached(cache))
    }
}
