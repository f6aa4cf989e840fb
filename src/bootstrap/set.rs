//! Process-wide holder of the current registry snapshot

use super::loader::RegistryLoader;
use crate::error::{BootstrapError, Result};
use crate::registry::Snapshot;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Holds the active [`Snapshot`] and replaces it on refresh.
///
/// The refresh task is the only writer. Readers clone the `Arc` under a
/// short read lock, so a reader always sees one whole snapshot.
pub struct RegistrySet {
    loader: RegistryLoader,
    current: RwLock<Arc<Snapshot>>,
    last_refresh_error: Mutex<Option<BootstrapError>>,
    last_success: Mutex<DateTime<Utc>>,
    refresh_count: AtomicU64,
}

impl RegistrySet {
    /// Perform the first load and build the set.
    ///
    /// There is no usable fallback before the first load, so its failure is
    /// returned to the caller, which is expected to abort startup.
    pub async fn initialize(loader: RegistryLoader) -> Result<Self> {
        let start = Instant::now();
        let snapshot = loader.load().await.map_err(|e| {
            tracing::error!(error = %e, "Initial bootstrap load failed");
            e
        })?;
        log_loaded(&snapshot, start.elapsed());

        Ok(Self::with_snapshot(loader, snapshot))
    }

    /// Build a set around an already loaded snapshot
    pub fn with_snapshot(loader: RegistryLoader, snapshot: Snapshot) -> Self {
        let loaded_at = snapshot.loaded_at;
        Self {
            loader,
            current: RwLock::new(Arc::new(snapshot)),
            last_refresh_error: Mutex::new(None),
            last_success: Mutex::new(loaded_at),
            refresh_count: AtomicU64::new(0),
        }
    }

    /// The active snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Load once and swap the result in.
    ///
    /// On failure the previous snapshot stays active and the error is kept
    /// for [`last_refresh_error`](Self::last_refresh_error).
    pub async fn refresh_once(&self) -> Result<()> {
        let start = Instant::now();
        self.refresh_count.fetch_add(1, Ordering::Relaxed);

        match self.loader.load().await {
            Ok(snapshot) => {
                log_loaded(&snapshot, start.elapsed());
                let loaded_at = snapshot.loaded_at;
                *self.current.write() = Arc::new(snapshot);
                *self.last_success.lock() = loaded_at;
                *self.last_refresh_error.lock() = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = %start.elapsed().as_millis(),
                    "Bootstrap refresh failed, keeping previous registries"
                );
                *self.last_refresh_error.lock() = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Refresh forever, waiting `interval` after each attempt completes
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                // failures are logged and recorded by refresh_once
                let _ = self.refresh_once().await;
            }
        })
    }

    /// Error of the most recent refresh, cleared by a successful one
    pub fn last_refresh_error(&self) -> Option<BootstrapError> {
        self.last_refresh_error.lock().clone()
    }

    /// When the active snapshot was loaded
    pub fn last_success(&self) -> DateTime<Utc> {
        *self.last_success.lock()
    }

    /// Number of refresh attempts since initialization
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::Relaxed)
    }
}

fn log_loaded(snapshot: &Snapshot, elapsed: Duration) {
    let counts = snapshot.entry_counts();
    tracing::info!(
        dns = %counts[0].1,
        ip = %counts[1].1,
        asn = %counts[2].1,
        object_tags = %counts[3].1,
        missing = ?snapshot.missing,
        duration_ms = %elapsed.as_millis(),
        "Bootstrap registries loaded"
    );
}
