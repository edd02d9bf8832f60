use core::any::Any;

use movie_catalog_client::{
    errors::Result,
    query_state::{QueryDefaults, QueryState},
    CatalogClient, MovieCard, MovieResults, MovieSummary,
};
use serde::Serialize;

use super::{downcast_params, CommandExecutor};

const CARD_LOAD_FAILURE: &str = "Failed to load details";
const NO_MOVIES_FOUND: &str = "No movies found";

#[derive(Debug, Clone, clap::Args)]
pub struct MoviesArgs {
    /// The page to display. Overrides the page of --query
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    page: Option<u32>,
    /// Only list the movies matching this text. Goes back to the first page unless --page is given
    #[arg(short, long)]
    search: Option<String>,
    /// Only list the movies of this genre (see the "genres" command). Goes back to the first page unless --page is given
    #[arg(short, long)]
    genre: Option<String>,
    /// Start from a shared query string, e.g. "page=2&search=alien&genre=Horror"
    #[arg(short, long)]
    query: Option<String>,
    /// Also fetch the card of every listed movie
    #[arg(long)]
    details: bool,
}

impl MoviesArgs {
    fn query_state(&self, defaults: &QueryDefaults) -> QueryState {
        let mut state =
            QueryState::parse_query_string(self.query.as_deref().unwrap_or_default(), defaults);
        if let Some(search) = &self.search {
            state = state.with_search(search);
        }
        if let Some(genre) = &self.genre {
            state = state.with_genre(genre);
        }
        if let Some(page) = self.page {
            state = state.with_page(page);
        }
        state
    }
}

/// Query strings that can be fed back to --query
#[derive(Debug, Serialize)]
struct QueryLinks {
    current: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
}
impl QueryLinks {
    fn new(results: &MovieResults) -> Self {
        let link = |page: Option<u32>| page.map(|p| results.query.with_page(p).to_query_string());
        let pagination = results.pagination.as_ref();
        Self {
            current: results.query.to_query_string(),
            previous: link(pagination.and_then(|p| p.previous)),
            next: link(pagination.and_then(|p| p.next)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CardEntry {
    Loaded(MovieCard),
    Failed { id: String, error: &'static str },
}

#[derive(Debug, Serialize)]
struct MoviesView {
    #[serde(flatten)]
    results: MovieResults,
    links: QueryLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cards: Option<Vec<CardEntry>>,
}

/// Each card is loaded on its own, a failing card does not prevent the
/// others from being displayed
fn load_cards(client: &CatalogClient, movies: &[MovieSummary]) -> Vec<CardEntry> {
    movies
        .iter()
        .map(|movie| match client.get_movie(&movie.id) {
            Ok(details) => CardEntry::Loaded(MovieCard::from(&details)),
            Err(e) => {
                log::warn!("Could not load the details of movie {}: {e}", movie.id);
                CardEntry::Failed {
                    id: movie.id.clone(),
                    error: CARD_LOAD_FAILURE,
                }
            }
        })
        .collect()
}

impl CommandExecutor for MoviesArgs {
    fn execute(self, params: Box<dyn Any>) -> Result<Box<dyn crate::display::Displayable>> {
        let (client, defaults): (CatalogClient, QueryDefaults) = downcast_params(params)?;

        let query = self.query_state(&defaults);
        log::debug!("query={query:?}");
        let results = client.list_movies_with_count(&query)?;
        let cards = self
            .details
            .then(|| load_cards(&client, &results.movies));
        Ok(Box::new(MoviesView {
            links: QueryLinks::new(&results),
            message: results.movies.is_empty().then_some(NO_MOVIES_FOUND),
            cards,
            results,
        }))
    }
}
