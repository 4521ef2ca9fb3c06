//! Refresh cycle tests
//!
//! End-to-end cycles against mock upstreams, the no-overlap guard, and
//! stale snapshot retention.

mod common;

use axum::{routing::get, Json, Router};
use common::*;
use solr_exporter::passthrough::PassthroughClient;
use solr_exporter::refresh::{run_schedule, CycleReport, RefreshOutcome, Refresher};
use solr_exporter::snapshot::SnapshotStore;
use solr_exporter::solr::SolrClient;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn refresher(base_url: &str, passthrough_socket: &Path) -> Refresher {
    let solr = SolrClient::new(&solr_config(base_url)).expect("client");
    let passthrough = PassthroughClient::new(&passthrough_config(passthrough_socket));
    Refresher::new(solr, passthrough, SnapshotStore::new())
}

fn count_prefix(snapshot: &str, prefix: &str) -> usize {
    snapshot.lines().filter(|l| l.starts_with(prefix)).count()
}

#[tokio::test]
async fn test_scenario_healthy_solr() {
    // Given: Solr reporting threads 12/20/3 and heap 100/500/300/200, no passthrough peer
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_solr(threads_doc(12, 20, 3), system_doc(100, 500, 300, 200)).await;
    let refresher = refresher(&base, &dir.path().join("absent.sock"));

    // When: Running one cycle
    let outcome = refresher.try_refresh().await;

    // Then: Exactly the seven Solr lines are published
    assert_eq!(
        outcome,
        RefreshOutcome::Completed(CycleReport {
            threads_emitted: true,
            heap_emitted: true,
            passthrough_bytes: None,
            replaced: true,
        })
    );
    let snapshot = refresher.store().read();
    assert_eq!(count_prefix(&snapshot, "solr_threads{"), 3);
    assert_eq!(count_prefix(&snapshot, "solr_heap_memory{"), 4);
    assert!(snapshot.contains("solr_threads{type=\"current\"} 12\n"));
    assert!(snapshot.contains("solr_threads{type=\"peak\"} 20\n"));
    assert!(snapshot.contains("solr_threads{type=\"daemon\"} 3\n"));
    assert!(snapshot.contains("solr_heap_memory{type=\"used\"} 100\n"));
    assert!(snapshot.contains("solr_heap_memory{type=\"max\"} 500\n"));
    assert!(snapshot.contains("solr_heap_memory{type=\"total\"} 300\n"));
    assert!(snapshot.contains("solr_heap_memory{type=\"free\"} 200\n"));
    assert_eq!(snapshot.lines().count(), 7, "no trailing passthrough content");
}

#[tokio::test]
async fn test_scenario_solr_unreachable() {
    // Given: Solr down, passthrough up
    let dir = tempfile::tempdir().expect("tempdir");
    let detail = "solr_core_docs{core=\"a\"} 42\n";
    let socket = spawn_passthrough(dir.path(), detail).await;
    let refresher = refresher(&unreachable_base_url(), &socket);

    // When: Running one cycle
    refresher.try_refresh().await;

    // Then: Only the passthrough content is published
    let snapshot = refresher.store().read();
    assert_eq!(count_prefix(&snapshot, "solr_threads"), 0);
    assert_eq!(count_prefix(&snapshot, "solr_heap_memory"), 0);
    assert_eq!(&*snapshot, detail);
}

#[tokio::test]
async fn test_both_sources_combined() {
    let dir = tempfile::tempdir().expect("tempdir");
    let detail = "solr_core_docs{core=\"a\"} 42\n";
    let socket = spawn_passthrough(dir.path(), detail).await;
    let base = spawn_solr(threads_doc(1, 2, 3), system_doc(4, 5, 6, 7)).await;
    let refresher = refresher(&base, &socket);

    let outcome = refresher.try_refresh().await;

    let snapshot = refresher.store().read();
    assert!(snapshot.starts_with("solr_threads{type=\"current\"} 1\n"));
    assert!(snapshot.ends_with(detail));
    assert_eq!(snapshot.lines().count(), 8);
    assert!(matches!(
        outcome,
        RefreshOutcome::Completed(CycleReport {
            passthrough_bytes: Some(n),
            ..
        }) if n == detail.len()
    ));
}

#[tokio::test]
async fn test_all_sources_failing_keeps_previous_snapshot() {
    // Given: A store that already holds a good snapshot
    let dir = tempfile::tempdir().expect("tempdir");
    let refresher = refresher(&unreachable_base_url(), &dir.path().join("absent.sock"));
    refresher.store().replace("solr_threads{type=\"current\"} 5\n");

    // When: A cycle runs with every upstream down
    let outcome = refresher.try_refresh().await;

    // Then: The stale snapshot is still served
    assert!(matches!(
        outcome,
        RefreshOutcome::Completed(CycleReport { replaced: false, .. })
    ));
    assert_eq!(&*refresher.store().read(), "solr_threads{type=\"current\"} 5\n");
}

#[tokio::test]
async fn test_overlapping_cycles_run_once() {
    // Given: A slow Solr that counts requests and concurrent cycles
    let hits = Arc::new(AtomicU32::new(0));
    let in_flight = Arc::new(AtomicU32::new(0));
    let max_in_flight = Arc::new(AtomicU32::new(0));
    let (h, f, m) = (hits.clone(), in_flight.clone(), max_in_flight.clone());
    let router = Router::new()
        .route(
            "/solr/admin/info/threads",
            get(move || {
                let (h, f, m) = (h.clone(), f.clone(), m.clone());
                async move {
                    h.fetch_add(1, Ordering::SeqCst);
                    let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                    m.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    f.fetch_sub(1, Ordering::SeqCst);
                    Json(threads_doc(1, 1, 1))
                }
            }),
        )
        .route(
            "/solr/admin/info/system",
            get(|| async { Json(system_doc(1, 1, 1, 1)) }),
        );
    let base = spawn_solr_router(router).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let refresher = Arc::new(refresher(&base, &dir.path().join("absent.sock")));

    // When: A second trigger arrives while the first cycle is in flight
    let first = {
        let refresher = refresher.clone();
        tokio::spawn(async move { refresher.try_refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = refresher.try_refresh().await;
    let first = first.await.expect("first cycle panicked");

    // Then: The second is skipped and Solr saw a single cycle
    assert_eq!(second, RefreshOutcome::Skipped);
    assert!(matches!(first, RefreshOutcome::Completed(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_guard_released_after_cycle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_solr(threads_doc(1, 1, 1), system_doc(1, 1, 1, 1)).await;
    let refresher = refresher(&base, &dir.path().join("absent.sock"));

    assert!(matches!(refresher.try_refresh().await, RefreshOutcome::Completed(_)));
    assert!(matches!(refresher.try_refresh().await, RefreshOutcome::Completed(_)));
}

#[tokio::test]
async fn test_many_concurrent_triggers_at_most_one_runs() {
    // Given: A slow Solr
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let router = Router::new()
        .route(
            "/solr/admin/info/threads",
            get(move || {
                let h = h.clone();
                async move {
                    h.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Json(threads_doc(1, 1, 1))
                }
            }),
        )
        .route(
            "/solr/admin/info/system",
            get(|| async { Json(system_doc(1, 1, 1, 1)) }),
        );
    let base = spawn_solr_router(router).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let refresher = Arc::new(refresher(&base, &dir.path().join("absent.sock")));

    // When: Eight triggers race
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let refresher = refresher.clone();
            tokio::spawn(async move { refresher.try_refresh().await })
        })
        .collect();
    let mut completed = 0;
    for handle in handles {
        if let RefreshOutcome::Completed(_) = handle.await.expect("cycle panicked") {
            completed += 1;
        }
    }

    // Then: Each completed cycle hit Solr once and none overlapped
    assert!(completed >= 1);
    assert_eq!(hits.load(Ordering::SeqCst), completed);
}

#[tokio::test]
async fn test_schedule_runs_cycles_on_its_own() {
    // Given: A Solr that counts thread requests and a one second period
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let router = Router::new()
        .route(
            "/solr/admin/info/threads",
            get(move || {
                let h = h.clone();
                async move {
                    h.fetch_add(1, Ordering::SeqCst);
                    Json(threads_doc(5, 6, 7))
                }
            }),
        )
        .route(
            "/solr/admin/info/system",
            get(|| async { Json(system_doc(1, 1, 1, 1)) }),
        );
    let base = spawn_solr_router(router).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let refresher = Arc::new(refresher(&base, &dir.path().join("absent.sock")));

    // When: The schedule runs without any manual trigger
    let schedule = tokio::spawn(run_schedule(refresher.clone(), Duration::from_secs(1)));
    let deadline = tokio::time::Instant::now() + Duration::from_millis(3500);
    while refresher.store().read().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    schedule.abort();

    // Then: At least one tick fired and published a snapshot
    assert!(hits.load(Ordering::SeqCst) >= 1);
    assert!(refresher
        .store()
        .read()
        .contains("solr_threads{type=\"current\"} 5\n"));
}
