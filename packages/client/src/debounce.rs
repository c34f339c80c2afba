//! Debounce-and-cancel for search-style lookups.
//!
//! Each call waits out a quiet period before running its lookup. A newer
//! call (or [`Debouncer::cancel`]) supersedes it; a superseded call either
//! never starts its lookup or has its result discarded. Requests already in
//! flight are not aborted.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `lookup` after the quiet period. `None` when superseded.
    pub async fn run<F, Fut, T>(&self, lookup: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.quiet).await;
        if self.is_stale(ticket) {
            debug!(ticket, "Debounced call superseded before lookup");
            return None;
        }

        let result = lookup().await;
        if self.is_stale(ticket) {
            debug!(ticket, "Discarding stale lookup result");
            return None;
        }
        Some(result)
    }

    /// Supersede every pending call
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}
