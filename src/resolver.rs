//! Search and stream resolution.
//!
//! `SearchBackend` is the boundary to whatever finds tracks and turns them
//! into playable locators; `Resolver` puts a process-lifetime cache in front
//! of the locator lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::library::{StreamLocator, Track};

mod ytdlp;

pub use ytdlp::YtDlp;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("no stream found for {0}")]
    Empty(String),
}

/// Finds tracks and resolves them into direct stream addresses.
pub trait SearchBackend: Send + Sync {
    /// Return up to `limit` ranked results for `query`.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ResolveError>;

    /// Return up to `count` results following the first `already` ones.
    ///
    /// Backends may drift between calls, so the caller must cope with
    /// overlaps and gaps.
    fn fetch_more(
        &self,
        query: &str,
        already: usize,
        count: usize,
    ) -> Result<Vec<Track>, ResolveError>;

    /// Turn a track into a directly playable address.
    fn resolve_stream(&self, track: &Track) -> Result<String, ResolveError>;
}

/// Anything that can produce a locator for a track. The session only needs
/// this much, which keeps it testable without a real backend.
pub trait StreamResolver {
    fn resolve(&mut self, track: &Track) -> Result<StreamLocator, ResolveError>;
}

/// Stream locators keyed by track id. Entries are never evicted.
#[derive(Debug, Default)]
pub struct StreamCache {
    entries: HashMap<String, StreamLocator>,
}

impl StreamCache {
    pub fn get(&self, track_id: &str) -> Option<&StreamLocator> {
        self.entries.get(track_id)
    }

    pub fn insert(&mut self, locator: StreamLocator) {
        self.entries.insert(locator.track_id.clone(), locator);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cache-first resolver over a shared `SearchBackend`.
pub struct Resolver {
    backend: Arc<dyn SearchBackend>,
    cache: StreamCache,
}

impl Resolver {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            cache: StreamCache::default(),
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &StreamCache {
        &self.cache
    }
}

impl StreamResolver for Resolver {
    fn resolve(&mut self, track: &Track) -> Result<StreamLocator, ResolveError> {
        if let Some(hit) = self.cache.get(&track.id) {
            debug!(id = %track.id, "stream cache hit");
            return Ok(hit.clone());
        }

        let url = self.backend.resolve_stream(track).inspect_err(|e| {
            warn!(id = %track.id, error = %e, "stream resolution failed");
        })?;

        let locator = StreamLocator {
            track_id: track.id.clone(),
            url,
        };
        self.cache.insert(locator.clone());
        debug!(id = %track.id, cached = self.cache.len(), "stream resolved");
        Ok(locator)
    }
}
