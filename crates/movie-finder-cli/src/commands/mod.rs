mod commands;
mod subcmd_movies;

use core::any::Any;
use std::{ops::Deref, path::PathBuf, str::FromStr};

use movie_catalog_client::{
    errors::Result,
    query_state::{QueryDefaults, DEFAULT_LIMIT},
    CatalogClient, Error,
};

pub trait CommandExecutor {
    fn execute(self, params: Box<dyn Any>) -> Result<Box<dyn crate::display::Displayable>>;
}

/// Recover the parameters a parent command handed down to a sub-command
fn downcast_params<T: 'static>(params: Box<dyn Any>) -> Result<T> {
    params
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| Error::Generic("Unexpected command parameters".to_owned()))
}

#[derive(Clone, Debug, clap::Args)]
pub struct CliGlobalArgs {
    /// Use the specified directory for the genre cache instead of the default one.
    #[arg(
        short, long,
        default_value_t,
        value_hint = clap::ValueHint::DirPath,
        global = true
    )]
    pub datadir: DataDir,
}

#[derive(Clone, Debug, clap::Args)]
pub struct CatalogGlobalArgs {
    /// Set the URL of the movie catalog API.
    #[arg(
        long,
        value_hint = clap::ValueHint::Url,
        env = "MOVIE_API_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    pub api_url: String,
    /// Set the default number of movies per page, when the query does not specify one.
    #[arg(
        short, long,
        env = "MOVIE_PAGE_LIMIT",
        default_value_t = DEFAULT_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..),
        global = true
    )]
    pub limit: u32,
}
impl CatalogGlobalArgs {
    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            limit: self.limit,
            ..Default::default()
        }
    }

    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(self.api_url.clone(), None)
    }
}

#[derive(Clone, Debug, clap::Parser)]
/// The Movie Finder CLI
///
/// movie-finder browses a movie catalog: search by title, filter by genre,
/// walk through the pages of results and display movie cards.
#[command(author= option_env ! ("CARGO_PKG_AUTHORS").unwrap_or(""), version = option_env ! ("CARGO_PKG_VERSION").unwrap_or("unknown"), about, long_about = None)]
pub struct CliParser {
    #[clap(next_help_heading = Some("Global options"))]
    #[command(flatten)]
    pub gargs: CliGlobalArgs,
    #[command(flatten)]
    pub catalog_gargs: CatalogGlobalArgs,
    #[command(subcommand)]
    /// Top level cli sub-commands.
    pub cmd: commands::Command,
}

impl CliParser {
    pub fn execute(self) -> Result<Box<dyn crate::display::Displayable>> {
        let cmd = self.cmd;
        let params = Box::new((self.gargs, self.catalog_gargs));
        cmd.execute(params)
    }
}

#[derive(Debug, Clone)]
pub struct DataDir(PathBuf);
impl Default for DataDir {
    fn default() -> Self {
        let mut home_path: PathBuf = dirs_next::home_dir().unwrap_or_default();
        home_path.push(".movie-finder");
        Self(home_path)
    }
}
impl core::fmt::Display for DataDir {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
impl FromStr for DataDir {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from_str(s).map_err(|e| e.to_string())?))
    }
}
impl Deref for DataDir {
    type Target = PathBuf;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
