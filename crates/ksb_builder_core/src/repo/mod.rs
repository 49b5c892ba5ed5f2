//! Repository layer for locally persisted builder data.
//!
//! # Responsibility
//! - Define storage contracts for drafts.
//! - Isolate SQLite query details from the draft service.

pub mod draft_repo;
