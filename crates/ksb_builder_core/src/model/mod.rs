//! Builder domain model.
//!
//! # Responsibility
//! - Define the course tree, reference items, form values and drafts.
//! - Keep all tree edits synchronous and in-memory.
//!
//! # Invariants
//! - Node ids are produced by an injected `IdGenerator` and never reused.
//! - Lessons are owned by exactly one module.

pub mod course;
pub mod draft;
pub mod form;
pub mod ids;
pub mod linking;
pub mod reference;
