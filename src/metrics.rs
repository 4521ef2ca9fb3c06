//! Snapshot Exposition Formatting
//!
//! Turns one cycle's fetched values into the Prometheus text exposition format.
//!
//! # Metric Families
//!
//! - `solr_threads{type="current|peak|daemon"}` - JVM thread counts
//! - `solr_heap_memory{type="used|max|total|free"}` - JVM heap in bytes
//!
//! # Emission Rules
//!
//! Each family is all-or-nothing on its gating field (`current` for threads, `used`
//! for heap). When the gating field is available every line of the family is
//! written, with any other unavailable field rendered as `-1`. When it is not, the
//! family is left out so scrapers never see a fully failed family as `-1` values.
//!
//! The passthrough blob is appended verbatim after the Solr families. It is not
//! validated and may repeat metric names already written above it.

use crate::solr::types::{HeapStats, ThreadStats, SENTINEL};
use std::fmt::Write;

/// Namespace prefix for every metric produced from the Solr admin API.
pub const NAMESPACE: &str = "solr";

/// Build the complete snapshot text for one refresh cycle.
pub fn build_snapshot(threads: &ThreadStats, heap: &HeapStats, passthrough: &str) -> String {
    let mut out = String::new();

    if threads.current.is_some() {
        write_family(
            &mut out,
            "threads",
            &[
                ("current", threads.current),
                ("peak", threads.peak),
                ("daemon", threads.daemon),
            ],
        );
    }

    if heap.used.is_some() {
        write_family(
            &mut out,
            "heap_memory",
            &[
                ("used", heap.used),
                ("max", heap.max),
                ("total", heap.total),
                ("free", heap.free),
            ],
        );
    }

    out.push_str(passthrough);
    out
}

fn write_family(out: &mut String, name: &str, samples: &[(&str, Option<f64>)]) {
    for (kind, value) in samples {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{}_{}{{type=\"{}\"}} {}",
            NAMESPACE,
            name,
            kind,
            format_value(value.unwrap_or(SENTINEL))
        );
    }
}

/// Render a sample value the way the exposition format spells it.
///
/// Integral values print without a fractional part (`12`, not `12.0`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
