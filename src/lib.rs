//! docstore - an in-memory document state store
//!
//! Documents are semi-structured states kept in a concurrent registry.
//! Typed property trees track which fields changed so callers can write
//! back minimal diffs. Each document carries at most one pessimistic lock
//! and may reference externally stored binaries.

pub mod blob;
pub mod cli;
pub mod lock;
pub mod observability;
pub mod property;
pub mod schema;
pub mod state;
pub mod store;
