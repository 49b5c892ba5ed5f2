//! Builder use-case services.
//!
//! # Responsibility
//! - Orchestrate model edits, draft persistence and external collaborators.
//! - Keep UI layers decoupled from storage and transport details.

pub mod autosave;
pub mod draft_service;
pub mod session;
pub mod synthesizer;
pub mod validation;
