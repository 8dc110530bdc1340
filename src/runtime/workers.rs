use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::warn;

use crate::app::WorkerEvent;
use crate::resolver::SearchBackend;

/// Runs searches off the render thread and reports back through the inbox.
///
/// Each request gets its own short-lived thread; the sequence number lets
/// the app drop answers to queries it no longer cares about.
#[derive(Clone)]
pub struct Workers {
    backend: Arc<dyn SearchBackend>,
    inbox: Sender<WorkerEvent>,
}

impl Workers {
    pub fn new(backend: Arc<dyn SearchBackend>, inbox: Sender<WorkerEvent>) -> Self {
        Self { backend, inbox }
    }

    pub fn spawn_search(&self, seq: u64, query: String, limit: usize) {
        let backend = self.backend.clone();
        let inbox = self.inbox.clone();
        thread::spawn(move || {
            let result = backend.search(&query, limit).map_err(|e| {
                warn!(%query, error = %e, "search failed");
                e.to_string()
            });
            let _ = inbox.send(WorkerEvent::SearchFinished { seq, query, result });
        });
    }

    pub fn spawn_fetch_more(&self, seq: u64, query: String, already: usize, count: usize) {
        let backend = self.backend.clone();
        let inbox = self.inbox.clone();
        thread::spawn(move || {
            let result = backend
                .fetch_more(&query, already, count)
                .map_err(|e| {
                    warn!(%query, already, error = %e, "fetch-more failed");
                    e.to_string()
                });
            let _ = inbox.send(WorkerEvent::MoreFinished { seq, result });
        });
    }
}
