use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::config::SearchSettings;
use crate::library::Track;

use super::{ResolveError, SearchBackend};

/// `SearchBackend` backed by the `yt-dlp` executable.
pub struct YtDlp {
    program: String,
    stream_format: String,
}

/// The subset of a flat `--dump-json` entry we care about.
#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    channel: Option<String>,
}

impl YtDlp {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            program: settings.ytdlp_path.clone(),
            stream_format: settings.stream_format.clone(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, ResolveError> {
        debug!(program = %self.program, ?args, "running");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ResolveError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ResolveError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn flat_search(&self, query: &str, total: usize) -> Result<Vec<Track>, ResolveError> {
        let target = format!("ytsearch{total}:{query}");
        let stdout = self.run(&[
            "--flat-playlist",
            "--dump-json",
            "--no-warnings",
            "--quiet",
            &target,
        ])?;
        Ok(parse_search_output(&stdout))
    }
}

impl SearchBackend for YtDlp {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ResolveError> {
        self.flat_search(query, limit)
    }

    fn fetch_more(
        &self,
        query: &str,
        already: usize,
        count: usize,
    ) -> Result<Vec<Track>, ResolveError> {
        // ytsearch has no offset; ask for the whole prefix and slice.
        let all = self.flat_search(query, already + count)?;
        Ok(all.into_iter().skip(already).take(count).collect())
    }

    fn resolve_stream(&self, track: &Track) -> Result<String, ResolveError> {
        let source = if track.source.is_empty() {
            watch_url(&track.id)
        } else {
            track.source.clone()
        };
        let stdout = self.run(&[
            "-f",
            &self.stream_format,
            "--get-url",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            &source,
        ])?;
        parse_stream_url(&stdout).ok_or_else(|| ResolveError::Empty(track.id.clone()))
    }
}

pub(super) fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// Parse one JSON object per line into tracks, skipping junk and id-less entries.
pub(super) fn parse_search_output(stdout: &str) -> Vec<Track> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| {
            serde_json::from_str::<FlatEntry>(l)
                .inspect_err(|e| debug!(error = %e, "skipping malformed search entry"))
                .ok()
        })
        .filter_map(|e| {
            let id = e.id.filter(|id| !id.is_empty())?;
            let uploader = e
                .uploader
                .or(e.channel)
                .unwrap_or_else(|| "Unknown".to_string());
            let duration = e.duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0);
            Some(Track::new(
                id.clone(),
                e.title.unwrap_or_else(|| "Unknown".to_string()),
                uploader,
                duration as u64,
                watch_url(&id),
            ))
        })
        .collect()
}

/// First non-empty line of `--get-url` output.
pub(super) fn parse_stream_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
