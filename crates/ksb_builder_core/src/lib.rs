//! Core domain logic for the KSB course builder.
//! This crate is the single source of truth for builder invariants.

pub mod config;
pub mod db;
pub mod external;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BuilderConfig, ConfigError, SeedLimits};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use external::{
    GenerationRequest, LocalStructureGenerator, ReferenceCatalog, ServiceError, ServiceResult,
    StaticReferenceCatalog, StructureGenerator, TemplateId, TemplateService, TemplateSubmission,
};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::course::{CourseTree, Lesson, LessonKind, LessonPatch, Module, ModulePatch};
pub use model::draft::{DraftSnapshot, DraftState, DRAFT_SCHEMA_VERSION};
pub use model::form::BuilderForm;
pub use model::ids::{
    Clock, IdGenerator, ManualClock, NodeId, SequentialIdGenerator, SystemClock, UuidIdGenerator,
};
pub use model::linking::CoverageReport;
pub use model::reference::{Classification, ReferenceId, ReferenceItem, StandardId};
pub use repo::draft_repo::{
    DraftRepoError, DraftRepository, MemoryDraftRepository, SqliteDraftRepository, StoredDraft,
};
pub use service::autosave::{run_autosave, spawn_autosave, SharedSession};
pub use service::draft_service::{DraftStore, DraftStoreError};
pub use service::session::{
    AutosaveOutcome, AutosaveSkip, BuilderSession, PendingOperation, RequestOutcome,
    RequestTicket, SessionNotice, SessionPhase,
};
pub use service::synthesizer::synthesize;
pub use service::validation::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
