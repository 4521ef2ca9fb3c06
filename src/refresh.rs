//! Refresh Cycle and Scheduling
//!
//! A refresh cycle fetches Solr thread and heap stats plus the passthrough blob,
//! builds the exposition text, and swaps it into the [`SnapshotStore`]. All network
//! work happens before the store's lock is touched.
//!
//! # Overlap
//!
//! Only one cycle runs at a time. A tick that arrives while a cycle is still in
//! flight is dropped rather than queued, so a persistently slow Solr never builds
//! up a backlog of requests.
//!
//! # Cadence
//!
//! [`run_schedule`] fires on wall-clock multiples of the period since the Unix
//! epoch. With the default two minute period that is second 0 of every even minute,
//! regardless of how long the previous cycle took.

use crate::metrics::build_snapshot;
use crate::passthrough::PassthroughClient;
use crate::snapshot::SnapshotStore;
use crate::solr::SolrClient;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What a single cycle produced, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub threads_emitted: bool,
    pub heap_emitted: bool,
    /// `None` when the passthrough fetch failed
    pub passthrough_bytes: Option<usize>,
    /// False when every source failed and the previous snapshot was kept
    pub replaced: bool,
}

/// Outcome of [`Refresher::try_refresh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A cycle ran; see [`CycleReport::replaced`]
    Completed(CycleReport),
    /// Another cycle was already in flight; nothing was done
    Skipped,
}

/// Owns the upstream clients, the snapshot store, and the single-cycle guard
pub struct Refresher {
    solr: SolrClient,
    passthrough: PassthroughClient,
    store: SnapshotStore,
    in_flight: Mutex<()>,
}

impl Refresher {
    pub fn new(solr: SolrClient, passthrough: PassthroughClient, store: SnapshotStore) -> Self {
        Self {
            solr,
            passthrough,
            store,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one refresh cycle unless another is already running.
    ///
    /// The snapshot is replaced whenever at least one source produced data. When
    /// Solr and the passthrough feed all fail, the last snapshot stays in place so
    /// scrapers keep seeing stale-but-valid data.
    pub async fn try_refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Refresh already in progress, skipping tick");
            return RefreshOutcome::Skipped;
        };

        let started = Instant::now();
        info!("Collecting metrics from Solr");

        let (threads, heap, passthrough) = tokio::join!(
            self.solr.fetch_threads(),
            self.solr.fetch_heap(),
            self.passthrough.fetch(),
        );

        let threads_emitted = threads.current.is_some();
        let heap_emitted = heap.used.is_some();
        let passthrough_bytes = passthrough.as_ref().map(String::len);
        let replaced = threads_emitted || heap_emitted || passthrough.is_some();

        if replaced {
            let text = build_snapshot(&threads, &heap, passthrough.as_deref().unwrap_or(""));
            self.store.replace(text);
            info!(
                threads = threads_emitted,
                heap = heap_emitted,
                passthrough_bytes = passthrough_bytes.unwrap_or(0),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Snapshot refreshed"
            );
        } else {
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "All sources failed, keeping previous snapshot"
            );
        }

        let report = CycleReport {
            threads_emitted,
            heap_emitted,
            passthrough_bytes,
            replaced,
        };

        RefreshOutcome::Completed(report)
    }
}

/// Next wall-clock tick, in Unix milliseconds, strictly after `now_ms`.
pub fn next_tick_after(now_ms: i64, period: Duration) -> i64 {
    let period_ms = i64::try_from(period.as_millis()).unwrap_or(i64::MAX).max(1);
    (now_ms.div_euclid(period_ms) + 1).saturating_mul(period_ms)
}

/// Drive refresh cycles on wall-clock aligned ticks forever.
///
/// Each tick runs its cycle in a separate task so the timer keeps its alignment
/// while a slow cycle is in flight; [`Refresher::try_refresh`] drops ticks that
/// overlap a running cycle.
pub async fn run_schedule(refresher: Arc<Refresher>, period: Duration) {
    let mut due = next_tick_after(Utc::now().timestamp_millis(), period);

    loop {
        let wait_ms = due.saturating_sub(Utc::now().timestamp_millis()).max(0);
        tokio::time::sleep(Duration::from_millis(wait_ms as u64)).await;

        let cycle = refresher.clone();
        tokio::spawn(async move {
            cycle.try_refresh().await;
        });

        // Taking the max keeps an early wake-up from firing the same tick twice.
        due = next_tick_after(Utc::now().timestamp_millis().max(due), period);
    }
}
