//! Shared test utilities for `signet_cache` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use async_trait::async_trait;
use parking_lot::Mutex;
use signet_cache::{RemoteError, RemoteResourceClient};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

// ─────────────────────────────────────────────────────────────────────────────
// Scripted backend
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory backend that counts calls and fails on request.
///
/// A fetch reads the stored value when it starts, then waits on the gate (if
/// any), so a gated fetch returns whatever was stored before it was released.
pub struct MockBackend {
    stored: Mutex<String>,
    fetch_failures: Mutex<VecDeque<RemoteError>>,
    write_failures: Mutex<VecDeque<RemoteError>>,
    fetch_gate: Option<Arc<Semaphore>>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl MockBackend {
    pub fn new(value: &str) -> Self {
        Self {
            stored: Mutex::new(value.to_string()),
            fetch_failures: Mutex::new(VecDeque::new()),
            write_failures: Mutex::new(VecDeque::new()),
            fetch_gate: None,
            fetches: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Every fetch waits for one permit of `gate`.
    pub fn with_fetch_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.fetch_gate = Some(gate);
        self
    }

    pub fn fail_next_fetch(&self, error: RemoteError) {
        self.fetch_failures.lock().push_back(error);
    }

    pub fn fail_next_write(&self, error: RemoteError) {
        self.write_failures.lock().push_back(error);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> String {
        self.stored.lock().clone()
    }
}

#[async_trait]
impl RemoteResourceClient for MockBackend {
    type Value = String;
    type Payload = String;

    async fn fetch(&self, _resource: &str) -> Result<String, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let value = self.stored();
        let failure = self.fetch_failures.lock().pop_front();

        if let Some(gate) = &self.fetch_gate {
            gate.acquire().await.unwrap().forget();
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }

    async fn write(&self, _resource: &str, payload: String) -> Result<String, RemoteError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.write_failures.lock().pop_front() {
            return Err(error);
        }
        *self.stored.lock() = payload.clone();
        Ok(payload)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// A closed gate: fetches block until permits are added.
pub fn closed_gate() -> Arc<Semaphore> {
    Arc::new(Semaphore::new(0))
}

pub fn server_error() -> RemoteError {
    RemoteError::Status {
        status: 500,
        message: "Something went wrong".to_string(),
    }
}

/// Records every value a subscriber receives.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<(String, u64)>>>,
}

impl Recorder {
    pub fn record(&self, value: &str, version: u64) {
        self.seen.lock().push((value.to_string(), version));
    }

    pub fn values(&self) -> Vec<String> {
        self.seen.lock().iter().map(|(value, _)| value.clone()).collect()
    }

    pub fn versions(&self) -> Vec<u64> {
        self.seen.lock().iter().map(|(_, version)| *version).collect()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }
}
