//! Flat-file persistence for favorites and playlists.
//!
//! Each collection is a pretty-printed JSON array stored under the data
//! directory. Reads never fail (missing or corrupt files load as empty) and
//! writes report errors to the caller, which decides whether to care.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

const FAVORITES_FILE: &str = "favorites.json";
const PLAYLISTS_FILE: &str = "playlists.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Locations of the persisted collections.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub favorites: PathBuf,
    pub playlists: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            favorites: dir.join(FAVORITES_FILE),
            playlists: dir.join(PLAYLISTS_FILE),
        }
    }
}

/// Load a list of records, treating a missing or unreadable file as empty.
pub fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read list, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(list) => list,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt list file, starting empty");
            Vec::new()
        }
    }
}

/// Write `list` to `path`, creating parent directories as needed.
pub fn save_list<T: Serialize>(path: &Path, list: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(list).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
