//! Solr Prometheus Exporter
//!
//! Polls Solr's admin info API for thread and JVM heap figures, merges them with a
//! pre-formatted metrics feed read from a local Unix socket, and serves the combined
//! snapshot in Prometheus text format over another Unix socket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   HTTP (admin/info)   ┌──────────────────────┐
//! │    Solr     │ ◄───────────────────  │       Exporter       │
//! └─────────────┘                       │  ┌────────────────┐  │
//!                                       │  │   Refresher    │  │   unix socket   ┌───────────┐
//! ┌─────────────┐   unix socket         │  └───────┬────────┘  │ ◄─────────────► │ collector │
//! │ detail feed │ ◄───────────────────  │  ┌───────▼────────┐  │    /metrics     └───────────┘
//! └─────────────┘                       │  │ SnapshotStore  │  │
//!                                       │  └────────────────┘  │
//!                                       └──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`solr`] - Solr admin API client and stats types
//! - [`passthrough`] - Unix socket client for the passthrough feed
//! - [`metrics`] - Exposition formatting of a snapshot
//! - [`snapshot`] - Shared store for the latest snapshot
//! - [`refresh`] - Refresh cycle and wall-clock aligned schedule
//! - [`server`] - HTTP server over a Unix socket
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use solr_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod passthrough;
pub mod refresh;
pub mod server;
pub mod snapshot;
pub mod solr;
