//! The shareable state of a movie search: page, page size, search text and
//! genre filter, as carried in a URL query string.

use serde::Serialize;

pub const PAGE_PARAM: &str = "page";
pub const LIMIT_PARAM: &str = "limit";
pub const SEARCH_PARAM: &str = "search";
pub const GENRE_PARAM: &str = "genre";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 25;

/// Values substituted for absent or unusable query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub page: u32,
    pub limit: u32,
}
impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Identifies one page of one result set
///
/// Two states that only differ by `page` denote the same result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}
impl Default for QueryState {
    fn default() -> Self {
        Self::from_defaults(&QueryDefaults::default())
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl QueryState {
    pub fn from_defaults(defaults: &QueryDefaults) -> Self {
        Self {
            page: defaults.page.max(1),
            limit: defaults.limit.max(1),
            search: None,
            genre: None,
        }
    }

    /// Decode already percent-decoded query parameters
    ///
    /// Unknown keys are ignored and the first occurrence of a key wins.
    /// `page` and `limit` fall back to `defaults` when missing, not a number
    /// or zero. Empty `search` and `genre` are treated as absent.
    pub fn parse<I, K, V>(params: I, defaults: &QueryDefaults) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut page = None;
        let mut limit = None;
        let mut search = None;
        let mut genre = None;
        for (key, value) in params {
            let value = value.as_ref();
            let slot = match key.as_ref() {
                PAGE_PARAM => &mut page,
                LIMIT_PARAM => &mut limit,
                SEARCH_PARAM => &mut search,
                GENRE_PARAM => &mut genre,
                other => {
                    log::debug!("Ignoring unknown query parameter {other}");
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(value.to_owned());
            }
        }

        let mut state = Self::from_defaults(defaults);
        if let Some(p) = page.as_deref().and_then(parse_positive) {
            state.page = p;
        } else if let Some(p) = page {
            log::debug!("Invalid page {p:?}, using {}", state.page);
        }
        if let Some(l) = limit.as_deref().and_then(parse_positive) {
            state.limit = l;
        } else if let Some(l) = limit {
            log::debug!("Invalid limit {l:?}, using {}", state.limit);
        }
        state.search = search.as_deref().and_then(non_empty);
        state.genre = genre.as_deref().and_then(non_empty);
        state
    }

    /// Encode the state as ordered query parameters
    ///
    /// `page` and `limit` are always present so that a shared link keeps its
    /// page size.
    pub fn encode(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (PAGE_PARAM, self.page.to_string()),
            (LIMIT_PARAM, self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            params.push((SEARCH_PARAM, search.clone()));
        }
        if let Some(genre) = &self.genre {
            params.push((GENRE_PARAM, genre.clone()));
        }
        params
    }

    /// The same result set, on another page
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Search for `text`, back on the first page. An empty text clears the
    /// search.
    pub fn with_search(&self, text: &str) -> Self {
        Self {
            page: 1,
            search: non_empty(text),
            ..self.clone()
        }
    }

    pub fn without_search(&self) -> Self {
        Self {
            page: 1,
            search: None,
            ..self.clone()
        }
    }

    /// Filter on the genre `title`, back on the first page. An empty title
    /// clears the filter.
    pub fn with_genre(&self, title: &str) -> Self {
        Self {
            page: 1,
            genre: non_empty(title),
            ..self.clone()
        }
    }

    pub fn without_genre(&self) -> Self {
        Self {
            page: 1,
            genre: None,
            ..self.clone()
        }
    }

    /// Returns true if `other` denotes the same result set, whatever its page
    pub fn same_result_set(&self, other: &Self) -> bool {
        self.limit == other.limit && self.search == other.search && self.genre == other.genre
    }
}

#[cfg(feature = "async_client")]
mod url_encoding {
    use reqwest::Url;

    use super::{QueryDefaults, QueryState};

    fn base() -> Url {
        Url::parse("http://localhost/").expect("static URL is valid")
    }

    impl QueryState {
        /// Decode a raw query string such as `page=2&search=dark%20knight`
        ///
        /// A leading `?` is accepted.
        pub fn parse_query_string(query: &str, defaults: &QueryDefaults) -> Self {
            let mut url = base();
            url.set_query(Some(query.trim_start_matches('?')));
            Self::parse(url.query_pairs(), defaults)
        }

        /// The percent-encoded query string of [QueryState::encode]
        pub fn to_query_string(&self) -> String {
            let mut url = base();
            url.query_pairs_mut().extend_pairs(self.encode());
            url.query().unwrap_or_default().to_owned()
        }
    }
}
