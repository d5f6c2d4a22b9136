//! Client-side sync core for the Slate editor.
//!
//! Turns a stream of fine-grained local edits into a small number of
//! idempotent, ordered operations and ships them to the server under
//! optimistic concurrency control:
//!
//! ```text
//! input handler -> EditorCommand -> CommandDispatcher (execute + history)
//!              -> middleware extracts Operations
//!              -> OperationBatcher (coalesce, ~300ms inactivity window)
//!              -> OperationQueue (outbox, ~2s debounce, baseVersion)
//!              -> SyncTransport (POST /templates/{id}/operations)
//! ```
//!
//! All timing is expressed against caller-supplied [`std::time::Instant`]s
//! so the whole pipeline is testable without wall-clock waits.

pub mod batcher;
pub mod command;
pub mod commands;
pub mod content;
pub mod debounce;
pub mod dispatcher;
pub mod queue;
pub mod transport;

pub use batcher::OperationBatcher;
pub use command::{CommandMetadata, EditorCommand};
pub use content::EditorContent;
pub use debounce::DebounceTimer;
pub use dispatcher::{CommandDispatcher, CommandMiddleware, OperationCollector};
pub use queue::{OperationQueue, SyncRequest, SyncStatus};
pub use transport::{HttpTransport, SendOutcome, SyncTransport, TransportError};
