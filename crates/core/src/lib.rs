//! Pure domain core for the Slate template editor.
//!
//! Contains the design-document model, the operation data contract, the
//! operation executor (a pure reducer over [`design::DesignData`]), and the
//! optimistic-concurrency version guard. This crate has no internal
//! dependencies and performs no I/O, so every higher layer (editor, db,
//! api) can share the same types and semantics.

pub mod design;
pub mod error;
pub mod executor;
pub mod operation;
pub mod types;
pub mod version;
