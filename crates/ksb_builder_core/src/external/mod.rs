//! Contracts for services the builder calls but does not own.
//!
//! # Responsibility
//! - Describe the catalog, structure-generation and template persistence
//!   collaborators as async traits.
//! - Ship in-process implementations usable without a network.
//!
//! # Invariants
//! - Failures are reported as `ServiceError`; callers decide rollback.
//! - Implementations never mutate builder state directly.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog;
pub mod generator;
pub mod template;

pub use catalog::{CatalogLoadError, ReferenceCatalog, StaticReferenceCatalog};
pub use generator::{GenerationRequest, LocalStructureGenerator, StructureGenerator};
pub use template::{TemplateId, TemplateService, TemplateSubmission};

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Service unreachable or timed out.
    Unavailable(String),
    /// Requested record does not exist.
    NotFound(String),
    /// Service refused the request.
    Rejected(String),
    /// Service answered with an unusable payload.
    InvalidResponse(String),
}

impl ServiceError {
    /// Stable machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::NotFound(_) => "not_found",
            Self::Rejected(_) => "rejected",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "service unavailable: {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::Rejected(message) => write!(f, "request rejected: {message}"),
            Self::InvalidResponse(message) => write!(f, "invalid service response: {message}"),
        }
    }
}

impl Error for ServiceError {}

pub type ServiceResult<T> = Result<T, ServiceError>;
