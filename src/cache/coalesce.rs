//! Load Coalescing Module
//!
//! At most one archive load runs per dataset identifier. Later requesters
//! subscribe to the running load and receive its outcome, success or failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::cache::CacheRecord;
use crate::error::{ArchiveError, Result};

type LoadOutcome = Option<Result<Arc<CacheRecord>>>;
type Inflight = Arc<Mutex<HashMap<String, watch::Receiver<LoadOutcome>>>>;

// == Load Coalescer ==
#[derive(Default)]
pub struct LoadCoalescer {
    inflight: Inflight,
}

impl LoadCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loads currently running.
    pub fn in_flight(&self) -> usize {
        lock(&self.inflight).len()
    }

    /// Runs `load` for `key` unless one is already running, then waits for
    /// the outcome.
    ///
    /// The load is registered before it starts and runs on its own task, so
    /// it completes even if every waiter goes away. Its registration is
    /// removed once it finishes, whatever the result.
    pub async fn load<F>(&self, key: &str, load: F) -> Result<Arc<CacheRecord>>
    where
        F: Future<Output = Result<Arc<CacheRecord>>> + Send + 'static,
    {
        let mut rx = {
            let mut inflight = lock(&self.inflight);
            match inflight.get(key) {
                Some(rx) => {
                    debug!("Joining in-flight archive load for {}", key);
                    rx.clone()
                }
                None => {
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(key.to_string(), rx.clone());

                    let registration = Registration {
                        inflight: Arc::clone(&self.inflight),
                        key: key.to_string(),
                    };
                    tokio::spawn(async move {
                        let outcome = load.await;
                        drop(registration);
                        let _ = tx.send(Some(outcome));
                    });
                    rx
                }
            }
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };

        outcome.unwrap_or_else(|| {
            Err(ArchiveError::Internal(format!(
                "archive load for {} ended without a result",
                key
            )))
        })
    }
}

/// Removes an in-flight registration on drop, including when the load panics.
struct Registration {
    inflight: Inflight,
    key: String,
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.inflight).remove(&self.key);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
