//! The operation queue: outbox, send debounce, and version reconciliation.
//!
//! Sits between the batcher and the transport. Batches accumulate in an
//! outbox; a second-level debounce (default 2s) turns several batcher
//! flushes into one network call carrying the current base version. The
//! queue never has more than one request in flight; operations enqueued
//! mid-send join the next cycle.
//!
//! Failure policy:
//! - version conflict: surfaced, never retried or rebased (detect, don't
//!   resolve); the queue refuses further sends until [`reset`](OperationQueue::reset)
//!   after the caller reloads.
//! - transport failure: the in-flight operations return to the front of
//!   the outbox and the send is retried with backoff, up to a bounded
//!   number of attempts; after that the queue stalls with the operations
//!   intact and [`unsynced_len`](OperationQueue::unsynced_len) non-zero.
//! - rejection (400): the batch can never succeed; it is dropped and
//!   reported.

use std::time::{Duration, Instant};

use serde::Serialize;

use slate_core::operation::Operation;
use slate_core::types::{DbId, Version};

use crate::debounce::DebounceTimer;
use crate::transport::{SendOutcome, SyncTransport, TransportError};

/// Default debounce between batch arrival and the network send.
pub const DEFAULT_SEND_WINDOW: Duration = Duration::from_secs(2);

/// Retries per batch before the queue stalls.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Body of `POST /api/v1/templates/{id}/operations`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub operations: Vec<Operation>,
    pub base_version: Version,
}

/// What a completed send cycle means for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// Server accepted the batch; local version adopted.
    Saved { version: Version },
    /// Another writer got there first. Caller must reload and
    /// [`reset`](OperationQueue::reset) the queue.
    Conflict {
        current: Version,
        requested: Version,
    },
    /// Server rejected the batch outright; the operations were dropped.
    Rejected { message: String, details: String },
    /// Transport failure; the batch is back in the outbox and a retry is
    /// scheduled after a backoff delay.
    Retrying { attempt: u32, delay: Duration },
    /// Retries exhausted. Operations remain queued; a manual
    /// [`flush`](OperationQueue::flush) can try again.
    Stalled,
}

pub struct OperationQueue {
    template_id: DbId,
    base_version: Version,
    outbox: Vec<Operation>,
    in_flight: Option<Vec<Operation>>,
    send_window: Duration,
    timer: DebounceTimer,
    retries: u32,
    max_retries: u32,
    conflicted: bool,
    last_saved_at: Option<Instant>,
}

impl OperationQueue {
    pub fn new(template_id: DbId, base_version: Version) -> Self {
        Self::with_window(template_id, base_version, DEFAULT_SEND_WINDOW)
    }

    pub fn with_window(template_id: DbId, base_version: Version, window: Duration) -> Self {
        Self {
            template_id,
            base_version,
            outbox: Vec::new(),
            in_flight: None,
            send_window: window,
            timer: DebounceTimer::new(window),
            retries: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            conflicted: false,
            last_saved_at: None,
        }
    }

    pub fn template_id(&self) -> DbId {
        self.template_id
    }

    pub fn base_version(&self) -> Version {
        self.base_version
    }

    /// Operations not yet confirmed by the server (outbox + in flight).
    /// Non-zero means "unsynced changes" for the UI.
    pub fn unsynced_len(&self) -> usize {
        self.outbox.len() + self.in_flight.as_ref().map_or(0, Vec::len)
    }

    pub fn last_saved_at(&self) -> Option<Instant> {
        self.last_saved_at
    }

    pub fn is_conflicted(&self) -> bool {
        self.conflicted
    }

    /// When an async driver should next wake, if a send is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Accept a drained batch and (re)start the send debounce.
    pub fn enqueue(&mut self, operations: Vec<Operation>, now: Instant) {
        if operations.is_empty() {
            return;
        }
        self.outbox.extend(operations);
        if !self.conflicted {
            self.timer.start(now);
        }
    }

    /// Yield the next request once the debounce elapses. At most one
    /// request is outstanding at a time.
    pub fn poll(&mut self, now: Instant) -> Option<SyncRequest> {
        if self.in_flight.is_some() || self.conflicted {
            return None;
        }
        if self.timer.fire_if_due(now) && !self.outbox.is_empty() {
            Some(self.take_request())
        } else {
            None
        }
    }

    /// Collapse the pending debounce and send immediately (used before
    /// unload and before undo/redo so history operations never interleave
    /// with stale pending sends). Also restarts a stalled queue.
    pub fn flush(&mut self) -> Option<SyncRequest> {
        if self.in_flight.is_some() || self.conflicted || self.outbox.is_empty() {
            return None;
        }
        self.timer = DebounceTimer::new(self.send_window);
        self.retries = 0;
        Some(self.take_request())
    }

    fn take_request(&mut self) -> SyncRequest {
        let operations = std::mem::take(&mut self.outbox);
        self.in_flight = Some(operations.clone());
        SyncRequest {
            operations,
            base_version: self.base_version,
        }
    }

    /// Reconcile the server's answer for the in-flight request.
    pub fn complete(
        &mut self,
        result: Result<SendOutcome, TransportError>,
        now: Instant,
    ) -> SyncStatus {
        let sent = self.in_flight.take().unwrap_or_default();

        match result {
            Ok(SendOutcome::Saved { version, .. }) => {
                tracing::debug!(version, count = sent.len(), "Batch saved");
                self.base_version = version;
                self.retries = 0;
                self.last_saved_at = Some(now);
                // Anything enqueued while in flight goes out next cycle,
                // back on the normal send window.
                self.timer = DebounceTimer::new(self.send_window);
                if !self.outbox.is_empty() {
                    self.timer.start(now);
                }
                SyncStatus::Saved { version }
            }
            Ok(SendOutcome::Conflict { current, requested }) => {
                tracing::warn!(current, requested, "Version conflict; sync halted until reset");
                self.conflicted = true;
                self.timer.cancel();
                SyncStatus::Conflict { current, requested }
            }
            Ok(SendOutcome::Rejected { message, details }) => {
                tracing::error!(%message, %details, count = sent.len(), "Batch rejected, dropping operations");
                self.retries = 0;
                self.timer = DebounceTimer::new(self.send_window);
                if !self.outbox.is_empty() {
                    self.timer.start(now);
                }
                SyncStatus::Rejected { message, details }
            }
            Err(err) => {
                // The batch goes back to the front so ordering survives a
                // retry, ahead of anything enqueued mid-send.
                let mut restored = sent;
                restored.append(&mut self.outbox);
                self.outbox = restored;

                self.retries += 1;
                if self.retries > self.max_retries {
                    tracing::error!(error = %err, unsynced = self.outbox.len(), "Retries exhausted; sync stalled");
                    self.timer.cancel();
                    SyncStatus::Stalled
                } else {
                    let delay = retry_backoff(self.retries);
                    tracing::warn!(error = %err, attempt = self.retries, ?delay, "Send failed; retrying");
                    self.timer = DebounceTimer::new(delay);
                    self.timer.start(now);
                    SyncStatus::Retrying {
                        attempt: self.retries,
                        delay,
                    }
                }
            }
        }
    }

    /// Adopt a fresh server state after the caller reloaded (the only way
    /// out of a conflict). Pending local operations are discarded; they
    /// were based on a document that no longer exists.
    pub fn reset(&mut self, base_version: Version) {
        self.base_version = base_version;
        self.outbox.clear();
        self.in_flight = None;
        self.timer.cancel();
        self.retries = 0;
        self.conflicted = false;
    }

    /// Convenience driver: send one due request, if any, and reconcile.
    pub async fn sync<T: SyncTransport + ?Sized>(
        &mut self,
        transport: &T,
        now: Instant,
    ) -> Option<SyncStatus> {
        let request = self.poll(now)?;
        let result = transport.send(self.template_id, &request).await;
        Some(self.complete(result, now))
    }
}

/// Exponential backoff, capped: 1s, 2s, 4s, 8s, 10s, 10s, ...
fn retry_backoff(attempt: u32) -> Duration {
    let secs = 1u64 << attempt.saturating_sub(1).min(4);
    Duration::from_secs(secs.min(10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::operation::OperationKind;

    fn move_op(x: f64) -> Operation {
        Operation::new(OperationKind::MoveElement {
            page_id: "p1".into(),
            element_id: "e1".into(),
            x: Some(x),
            y: None,
        })
    }

    fn net_err() -> TransportError {
        TransportError::UnexpectedStatus { status: 502 }
    }

    #[test]
    fn debounce_gates_the_send() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);

        assert!(queue.poll(t0 + Duration::from_secs(1)).is_none());
        let request = queue.poll(t0 + DEFAULT_SEND_WINDOW).unwrap();
        assert_eq!(request.base_version, 5);
        assert_eq!(request.operations.len(), 1);
    }

    #[test]
    fn success_adopts_server_version() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);
        queue.poll(t0 + DEFAULT_SEND_WINDOW).unwrap();

        let status = queue.complete(
            Ok(SendOutcome::Saved {
                version: 6,
                applied_ops: vec![],
            }),
            t0 + DEFAULT_SEND_WINDOW,
        );
        assert_eq!(status, SyncStatus::Saved { version: 6 });
        assert_eq!(queue.base_version(), 6);
        assert_eq!(queue.unsynced_len(), 0);
        assert!(queue.last_saved_at().is_some());
    }

    #[test]
    fn ops_enqueued_mid_send_join_the_next_cycle() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);
        let first = queue.poll(t0 + DEFAULT_SEND_WINDOW).unwrap();
        assert_eq!(first.operations.len(), 1);

        // Second gesture lands while the send is in flight.
        queue.enqueue(vec![move_op(2.0)], t0 + DEFAULT_SEND_WINDOW);
        assert!(queue.poll(t0 + DEFAULT_SEND_WINDOW * 2).is_none());

        let now = t0 + DEFAULT_SEND_WINDOW * 2;
        queue.complete(
            Ok(SendOutcome::Saved {
                version: 6,
                applied_ops: vec![],
            }),
            now,
        );

        let second = queue.poll(now + DEFAULT_SEND_WINDOW).unwrap();
        assert_eq!(second.operations.len(), 1);
        assert_eq!(second.base_version, 6);
    }

    #[test]
    fn conflict_halts_the_queue_until_reset() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);
        queue.poll(t0 + DEFAULT_SEND_WINDOW).unwrap();

        let status = queue.complete(
            Ok(SendOutcome::Conflict {
                current: 9,
                requested: 5,
            }),
            t0,
        );
        assert_eq!(
            status,
            SyncStatus::Conflict {
                current: 9,
                requested: 5
            }
        );
        assert!(queue.is_conflicted());

        // No sends while conflicted, even with new work.
        queue.enqueue(vec![move_op(2.0)], t0);
        assert!(queue.flush().is_none());
        assert!(queue.poll(t0 + Duration::from_secs(60)).is_none());

        queue.reset(9);
        assert!(!queue.is_conflicted());
        assert_eq!(queue.base_version(), 9);
        assert_eq!(queue.unsynced_len(), 0);
    }

    #[test]
    fn transport_failure_requeues_in_order_and_backs_off() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);
        queue.poll(t0 + DEFAULT_SEND_WINDOW).unwrap();

        // New work arrives while the failing send is out.
        queue.enqueue(vec![move_op(2.0)], t0 + DEFAULT_SEND_WINDOW);

        let status = queue.complete(Err(net_err()), t0 + DEFAULT_SEND_WINDOW);
        assert_eq!(
            status,
            SyncStatus::Retrying {
                attempt: 1,
                delay: Duration::from_secs(1)
            }
        );
        assert_eq!(queue.unsynced_len(), 2);

        // Retry goes out after the backoff delay, failed ops first.
        let retry = queue
            .poll(t0 + DEFAULT_SEND_WINDOW + Duration::from_secs(1))
            .unwrap();
        assert_eq!(retry.operations.len(), 2);
        match &retry.operations[0].kind {
            OperationKind::MoveElement { x, .. } => assert_eq!(*x, Some(1.0)),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn retries_are_bounded_then_the_queue_stalls() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);

        let mut now = t0 + DEFAULT_SEND_WINDOW;
        queue.poll(now).unwrap();
        for attempt in 1..=DEFAULT_MAX_RETRIES {
            let status = queue.complete(Err(net_err()), now);
            assert_eq!(
                status,
                SyncStatus::Retrying {
                    attempt,
                    delay: retry_backoff(attempt)
                }
            );
            now += Duration::from_secs(30);
            queue.poll(now).unwrap();
        }

        let status = queue.complete(Err(net_err()), now);
        assert_eq!(status, SyncStatus::Stalled);
        // Operations survive the stall; a manual flush can try again.
        assert_eq!(queue.unsynced_len(), 1);
        assert!(queue.flush().is_some());
    }

    #[test]
    fn flush_sends_immediately_and_cancels_the_debounce() {
        let t0 = Instant::now();
        let mut queue = OperationQueue::new(7, 5);
        queue.enqueue(vec![move_op(1.0)], t0);

        let request = queue.flush().unwrap();
        assert_eq!(request.operations.len(), 1);
        // Nothing left to send.
        assert!(queue.flush().is_none());
    }

    #[test]
    fn request_body_serializes_with_camel_case_base_version() {
        let request = SyncRequest {
            operations: vec![move_op(1.0)],
            base_version: 5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["baseVersion"], 5);
        assert!(json["operations"].is_array());
    }

    #[test]
    fn backoff_schedule_is_capped() {
        assert_eq!(retry_backoff(1), Duration::from_secs(1));
        assert_eq!(retry_backoff(2), Duration::from_secs(2));
        assert_eq!(retry_backoff(4), Duration::from_secs(8));
        assert_eq!(retry_backoff(5), Duration::from_secs(10));
        assert_eq!(retry_backoff(12), Duration::from_secs(10));
    }
}
