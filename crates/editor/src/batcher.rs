//! Client-side operation coalescing.
//!
//! A single drag gesture emits on the order of a hundred `move_element`
//! operations; only the last position matters. The batcher keeps an
//! insertion-ordered map from coalesce key to the most recent operation
//! for that key. Coalescable operations replace their predecessor;
//! discrete operations (`add_*`, `delete_*`, structural ops) get a unique
//! key and are never merged away.
//!
//! Every push restarts the inactivity window; the batch drains once input
//! pauses for the full window, or immediately on [`flush`](OperationBatcher::flush)
//! (unmount/navigation must not lose the tail of a gesture).

use std::time::{Duration, Instant};

use indexmap::IndexMap;

use slate_core::operation::Operation;

use crate::debounce::DebounceTimer;

/// Default inactivity window before a batch drains.
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_millis(300);

pub struct OperationBatcher {
    entries: IndexMap<String, Operation>,
    timer: DebounceTimer,
}

impl Default for OperationBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_WINDOW)
    }
}

impl OperationBatcher {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: IndexMap::new(),
            timer: DebounceTimer::new(window),
        }
    }

    /// Add one operation and restart the inactivity window.
    ///
    /// For a coalescable operation an existing entry under the same key is
    /// replaced in place, keeping its original position in the batch order.
    pub fn push(&mut self, operation: Operation, now: Instant) {
        self.entries.insert(operation.coalesce_key(), operation);
        self.timer.start(now);
    }

    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>, now: Instant) {
        for op in operations {
            self.entries.insert(op.coalesce_key(), op);
        }
        self.timer.start(now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the deadline an async driver should wake at, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Drain the batch if the inactivity window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<Operation>> {
        if self.timer.fire_if_due(now) && !self.entries.is_empty() {
            Some(self.drain())
        } else {
            None
        }
    }

    /// Cancel the window and drain whatever is buffered.
    pub fn flush(&mut self) -> Vec<Operation> {
        self.timer.cancel();
        self.drain()
    }

    fn drain(&mut self) -> Vec<Operation> {
        self.entries.drain(..).map(|(_, op)| op).collect()
    }
}
