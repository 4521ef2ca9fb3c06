//! Solr Admin API Types
//!
//! Typed views over the two admin documents the exporter reads. The JSON schema is
//! treated as a field-extraction contract: each value is looked up by its path and
//! parsed on its own, so one malformed field never invalidates its siblings.
//!
//! A field that is missing, `null`, or not numeric is `None`. On the exposition wire
//! `None` is written as [`SENTINEL`].

use serde_json::Value;

/// Wire value for a measurement that could not be determined.
pub const SENTINEL: f64 = -1.0;

/// Thread counts from `/admin/info/threads`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThreadStats {
    pub current: Option<f64>,
    pub peak: Option<f64>,
    pub daemon: Option<f64>,
}

/// JVM heap figures in bytes from `/admin/info/system`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeapStats {
    pub used: Option<f64>,
    pub max: Option<f64>,
    pub total: Option<f64>,
    pub free: Option<f64>,
}

impl ThreadStats {
    /// Every field unavailable, used when the request itself failed.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Extract `system.threadCount.{current,peak,daemon}`.
    pub fn from_json(doc: &Value) -> Self {
        Self {
            current: extract_number(doc, "/system/threadCount/current"),
            peak: extract_number(doc, "/system/threadCount/peak"),
            daemon: extract_number(doc, "/system/threadCount/daemon"),
        }
    }
}

impl HeapStats {
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Extract `jvm.memory.raw.{used,max,total,free}`.
    pub fn from_json(doc: &Value) -> Self {
        Self {
            used: extract_number(doc, "/jvm/memory/raw/used"),
            max: extract_number(doc, "/jvm/memory/raw/max"),
            total: extract_number(doc, "/jvm/memory/raw/total"),
            free: extract_number(doc, "/jvm/memory/raw/free"),
        }
    }
}

/// Look up a JSON pointer and read it as a number.
///
/// Solr reports most figures as JSON numbers, but some builds serialise them as
/// strings, so numeric strings are accepted too.
pub fn extract_number(doc: &Value, pointer: &str) -> Option<f64> {
    match doc.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
