//! Shared fixtures: mock Solr and passthrough servers.

#![allow(dead_code)]

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use solr_exporter::config::{PassthroughConfig, SolrConfig};
use std::path::{Path, PathBuf};
use tokio::net::{TcpListener, UnixListener};

pub fn threads_doc(current: i64, peak: i64, daemon: i64) -> Value {
    json!({"system": {"threadCount": {"current": current, "peak": peak, "daemon": daemon}}})
}

pub fn system_doc(used: i64, max: i64, total: i64, free: i64) -> Value {
    json!({"jvm": {"memory": {"raw": {"used": used, "max": max, "total": total, "free": free}}}})
}

/// Serve `router` on an ephemeral loopback port and return its Solr base URL.
pub async fn spawn_solr_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock Solr");
    let addr = listener.local_addr().expect("Mock Solr has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}/solr", addr)
}

/// Mock Solr answering both admin endpoints with fixed documents.
pub async fn spawn_solr(threads: Value, system: Value) -> String {
    let router = Router::new()
        .route(
            "/solr/admin/info/threads",
            get(move || {
                let body = threads.clone();
                async move { Json(body) }
            }),
        )
        .route(
            "/solr/admin/info/system",
            get(move || {
                let body = system.clone();
                async move { Json(body) }
            }),
        );
    spawn_solr_router(router).await
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind placeholder port");
    let addr = listener.local_addr().expect("Placeholder port has no address");
    drop(listener);
    format!("http://{}/solr", addr)
}

/// Serve `body` at `/metrics` on a Unix socket inside `dir`.
pub async fn spawn_passthrough(dir: &Path, body: &'static str) -> PathBuf {
    let router = Router::new().route("/metrics", get(move || async move { body }));
    spawn_passthrough_router(dir, router).await
}

pub async fn spawn_passthrough_router(dir: &Path, router: Router) -> PathBuf {
    let socket = dir.join("detail.sock");
    let listener = UnixListener::bind(&socket).expect("Failed to bind mock passthrough");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    socket
}

/// Solr settings with short timeouts so failure paths stay fast.
pub fn solr_config(base_url: &str) -> SolrConfig {
    SolrConfig {
        base_url: base_url.to_string(),
        request_timeout_ms: 1000,
        max_retries: 1,
        retry_backoff_ms: 20,
    }
}

pub fn passthrough_config(socket: &Path) -> PassthroughConfig {
    PassthroughConfig {
        socket_path: socket.to_string_lossy().into_owned(),
        path: "/metrics".to_string(),
        timeout_ms: 1000,
    }
}
