use std::{fs, io::ErrorKind, path::PathBuf};

use movie_catalog_client::{errors::Result, Error, GenreCache};

const GENRES_CACHE_FILE: &str = "movie-genres.json";

/// [GenreCache] stored as a JSON file in the data directory
#[derive(Debug, Clone)]
pub struct FileGenreCache {
    path: PathBuf,
}

impl FileGenreCache {
    pub fn new(datadir: &std::path::Path) -> Self {
        Self {
            path: datadir.join(GENRES_CACHE_FILE),
        }
    }
}

impl GenreCache for FileGenreCache {
    fn save_genres(&mut self, genres: &[String]) -> Result<()> {
        log::debug!("Saving {} genres in {}", genres.len(), self.path.display());
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| Error::GenreCacheWriteError(e.to_string()))?;
        }
        let content = serde_json::to_string(genres)?;
        fs::write(&self.path, content).map_err(|e| Error::GenreCacheWriteError(e.to_string()))
    }

    fn load_genres(&self) -> Result<Option<Vec<String>>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::GenreCacheReadError(e.to_string())),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::GenreCacheReadError(e.to_string()))
    }

    fn clear(&mut self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::GenreCacheWriteError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_cache_lifecycle() {
        let tmpdir = tempfile::tempdir().unwrap();
        let mut cache = FileGenreCache::new(&tmpdir.path().join("nested"));

        assert_eq!(cache.load_genres().unwrap(), None);
        assert!(!cache.clear().unwrap());

        let genres = vec!["Action".to_owned(), "Sci-Fi".to_owned()];
        cache.save_genres(&genres).unwrap();
        assert_eq!(cache.load_genres().unwrap(), Some(genres));

        assert!(cache.clear().unwrap());
        assert_eq!(cache.load_genres().unwrap(), None);
    }

    #[test]
    fn corrupted_cache_is_a_read_error() {
        let tmpdir = tempfile::tempdir().unwrap();
        fs::write(tmpdir.path().join(GENRES_CACHE_FILE), "not json").unwrap();
        let cache = FileGenreCache::new(tmpdir.path());
        assert!(matches!(
            cache.load_genres(),
            Err(Error::GenreCacheReadError(_))
        ));
    }
}
