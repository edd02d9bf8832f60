use core::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::{
    pagination::{PaginationControls, ResultsInfo},
    query_state::QueryState,
};

/// One page of a paginated catalog resource
///
/// The catalog only reports how many pages exist for a query, never how many
/// items. See [crate::pagination::ResultsInfo] for how the exact count is
/// recovered.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage<T> {
    /// The items of this page, in server order
    pub data: Vec<T>,
    /// The number of pages available for the query
    #[serde(default)]
    pub total_pages: u32,
}
impl<T> ListingPage<T> {
    /// Returns true if `page` is the last page of the result set, or beyond it
    pub fn is_last_page(&self, page: u32) -> bool {
        page >= self.total_pages
    }
}
impl<T> Deref for ListingPage<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenreRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Genre {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub movies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// ISO-8601 duration, e.g. `PT2H32M`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<GenreRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_actors: Option<Vec<String>>,
}

/// One page of movies, ready to be displayed
#[derive(Debug, Clone, Serialize)]
pub struct MovieResults {
    pub query: QueryState,
    pub movies: Vec<MovieSummary>,
    pub total_pages: u32,
    pub results: ResultsInfo,
    /// `None` when everything fits on one page
    pub pagination: Option<PaginationControls>,
}

const CARD_LIST_MAX: usize = 3;

fn abbreviated_list<'a>(items: impl ExactSizeIterator<Item = &'a str>) -> Option<String> {
    let len = items.len();
    if len == 0 {
        return None;
    }
    let mut line = items.take(CARD_LIST_MAX).collect::<Vec<_>>().join(", ");
    if len > CARD_LIST_MAX {
        line.push_str("...");
    }
    Some(line)
}

impl MovieDetails {
    /// The first three genre titles, with a trailing `...` if there are more
    pub fn genres_line(&self) -> Option<String> {
        self.genres
            .as_ref()
            .and_then(|genres| abbreviated_list(genres.iter().map(|g| g.title.as_str())))
    }

    /// The first three main actors, with a trailing `...` if there are more
    pub fn cast_line(&self) -> Option<String> {
        self.main_actors
            .as_ref()
            .and_then(|actors| abbreviated_list(actors.iter().map(String::as_str)))
    }
}

fn re_iso_duration() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"PT(?:(?<h>\d+)H)?(?:(?<m>\d+)M)?").unwrap())
}

/// Format an ISO-8601 duration such as `PT2H32M` as `2h 32m`
///
/// Strings that do not look like a duration are returned unchanged.
pub fn format_duration(duration: &str) -> String {
    let Some(caps) = re_iso_duration().captures(duration) else {
        return duration.to_owned();
    };
    let read = |name: &str| {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let (hours, minutes) = (read("h"), read("m"));
    if hours > 0 && minutes > 0 {
        format!("{hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}

/// Display-ready view of a [MovieDetails]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
impl From<&MovieDetails> for MovieCard {
    fn from(value: &MovieDetails) -> Self {
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            poster_url: value.poster_url.clone(),
            // A zero rating is treated as "no rating"
            rating: value
                .rating_value
                .filter(|r| *r != 0.0)
                .map(|r| format!("⭐️ {r}")),
            duration: value
                .duration
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(format_duration),
            genres: value.genres_line(),
            cast: value.cast_line(),
            summary: value.summary.clone().filter(|s| !s.is_empty()),
        }
    }
}
