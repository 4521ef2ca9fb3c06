//! Snapshot Store
//!
//! Holds the most recently built exposition text. Readers clone an `Arc<str>`
//! under a shared lock; the refresher swaps in a new `Arc<str>` under the exclusive
//! lock. The text itself is never mutated, so a reader always gets one complete
//! snapshot.

use parking_lot::RwLock;
use std::sync::Arc;

/// Latest exposition snapshot, shared between the refresher and the HTTP handlers
#[derive(Clone)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<str>>>,
}

impl SnapshotStore {
    /// Create an empty store. The metrics endpoint serves an empty body until the
    /// first refresh cycle completes.
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::from(""))),
        }
    }

    /// Replace the current snapshot.
    ///
    /// The allocation happens before the write lock is taken; the lock only covers
    /// the pointer swap.
    pub fn replace(&self, text: impl Into<Arc<str>>) {
        let text = text.into();
        let previous = std::mem::replace(&mut *self.current.write(), text);
        drop(previous);
    }

    /// Return the current snapshot.
    pub fn read(&self) -> Arc<str> {
        self.current.read().clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
