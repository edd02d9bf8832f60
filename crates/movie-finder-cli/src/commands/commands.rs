use core::any::Any;

use movie_catalog_client::{errors::Result, GenreCache, MovieCard};
use serde::Serialize;

use super::{downcast_params, CatalogGlobalArgs, CliGlobalArgs, CommandExecutor};
use crate::genre_cache::FileGenreCache;

/// Top level cli sub-commands.
#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// List one page of movies, with the exact number of results and the pagination controls.
    /// {n}Search text, genre filter and page can be given explicitly or through a shared query string.
    #[command(visible_aliases = ["list", "ls"])]
    Movies(super::subcmd_movies::MoviesArgs),
    /// Display the card of a single movie
    Movie {
        /// The ID of the movie
        movie_id: String,
        /// Display the details exactly as returned by the catalog instead of the card
        #[arg(long)]
        raw: bool,
    },
    /// List the genres that can be used to filter movies
    /// {n}The list is cached in the data directory, use --refresh to get a new one.
    Genres {
        /// Discard the cached genre list before listing
        #[arg(long)]
        refresh: bool,
    },
    /// Check that an auth token can be obtained from the catalog API
    Token,
}

#[derive(Debug, Serialize)]
struct TokenStatus {
    token_endpoint: String,
    authenticated: bool,
}

impl CommandExecutor for Command {
    fn execute(self, params: Box<dyn Any>) -> Result<Box<dyn crate::display::Displayable>> {
        let (gargs, catalog_gargs): (CliGlobalArgs, CatalogGlobalArgs) = downcast_params(params)?;
        let client = catalog_gargs.client();

        let res: Box<dyn crate::display::Displayable> = match self {
            Command::Movies(args) => {
                let params = Box::new((client, catalog_gargs.query_defaults()));
                args.execute(params)?
            }
            Command::Movie { movie_id, raw } => {
                let details = client.get_movie(&movie_id)?;
                if raw {
                    Box::new(details)
                } else {
                    Box::new(MovieCard::from(&details))
                }
            }
            Command::Genres { refresh } => {
                let mut cache = FileGenreCache::new(&gargs.datadir);
                if refresh && cache.clear()? {
                    log::info!("Cleared the cached genre list");
                }
                Box::new(client.list_genres_cached(&mut cache)?)
            }
            Command::Token => {
                client.get_token(false)?;
                Box::new(TokenStatus {
                    token_endpoint: client.session().token_endpoint().to_owned(),
                    authenticated: client.session().has_token(),
                })
            }
        };
        Ok(res)
    }
}
