//! The editor command contract.
//!
//! A command bundles one user-visible mutation: forward execution against
//! [`EditorContent`], its inverse for undo, and its translation into wire
//! operations. Commands capture whatever pre-state they need for `undo` at
//! construction (constructors take the current content), so both `execute`
//! and `undo` are pure functions over content state.

use uuid::Uuid;

use slate_core::operation::Operation;

use crate::content::EditorContent;

/// Descriptive metadata for history UIs and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    /// Unique command id (`cmd_<uuid>`).
    pub id: String,
    /// Stable command kind, e.g. `"move_element"`.
    pub kind: &'static str,
    /// Ids of the entities the command touches.
    pub affected_ids: Vec<String>,
    /// Human-readable description, e.g. `"Move element"`.
    pub description: String,
    /// Creation time, unix milliseconds.
    pub timestamp: i64,
}

impl CommandMetadata {
    /// Create metadata with a generated id and the current time.
    pub fn new(kind: &'static str, description: impl Into<String>) -> Self {
        Self {
            id: format!("cmd_{}", Uuid::new_v4().simple()),
            kind,
            affected_ids: Vec::new(),
            description: description.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_affected(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.affected_ids.extend(ids);
        self
    }
}

/// One undoable user action.
pub trait EditorCommand: Send {
    /// Apply the command, returning the new content state.
    fn execute(&mut self, content: &EditorContent) -> EditorContent;

    /// Invert the command, returning the restored content state.
    fn undo(&self, content: &EditorContent) -> EditorContent;

    /// The wire operations this command contributes to the sync stream.
    fn operations(&self) -> Vec<Operation>;

    fn metadata(&self) -> CommandMetadata;
}
