//! Draft use-case service.
//!
//! # Responsibility
//! - Encode builder state into single-slot drafts keyed by owner.
//! - Decode drafts back, treating unreadable ones as absent.
//!
//! # Invariants
//! - `save` overwrites the owner's previous draft (last write wins).
//! - `load` never fails on a corrupt or future-version payload; it logs and
//!   reports `None` so a broken draft cannot block the builder.
//! - Log lines carry metadata only, never draft content.

use crate::model::draft::{DraftSnapshot, DraftState, DRAFT_SCHEMA_VERSION};
use crate::model::ids::Clock;
use crate::repo::draft_repo::{DraftRepoError, DraftRepository, StoredDraft};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Errors from draft service operations.
#[derive(Debug)]
pub enum DraftStoreError {
    /// State could not be encoded.
    Serialize(serde_json::Error),
    /// Storage failure.
    Repo(DraftRepoError),
}

impl Display for DraftStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to encode draft: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DraftRepoError> for DraftStoreError {
    fn from(value: DraftRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for DraftStoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Draft service facade over a repository implementation.
pub struct DraftStore<R: DraftRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: DraftRepository> DraftStore<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Stores `state` as the owner's only draft and returns the save time.
    pub fn save(&self, owner_id: &str, state: &DraftState) -> Result<i64, DraftStoreError> {
        let state_json = serde_json::to_string(state)?;
        let saved_at = self.clock.now_ms();
        self.repo.save_draft(&StoredDraft {
            owner_id: owner_id.to_string(),
            schema_version: DRAFT_SCHEMA_VERSION,
            state_json,
            saved_at,
        })?;
        info!(
            "event=draft_save module=draft status=ok modules={} lessons={} saved_at={saved_at}",
            state.tree.module_count(),
            state.tree.lesson_count()
        );
        Ok(saved_at)
    }

    /// Loads the owner's draft. Unreadable drafts are reported as absent.
    pub fn load(&self, owner_id: &str) -> Result<Option<DraftSnapshot>, DraftStoreError> {
        let Some(stored) = self.repo.load_draft(owner_id)? else {
            return Ok(None);
        };

        if stored.schema_version != DRAFT_SCHEMA_VERSION {
            warn!(
                "event=draft_load module=draft status=skip reason=schema_version found={} expected={}",
                stored.schema_version, DRAFT_SCHEMA_VERSION
            );
            return Ok(None);
        }

        match serde_json::from_str::<DraftState>(&stored.state_json) {
            Ok(state) => Ok(Some(DraftSnapshot {
                owner_id: stored.owner_id,
                saved_at: stored.saved_at,
                schema_version: stored.schema_version,
                state,
            })),
            Err(err) => {
                warn!(
                    "event=draft_load module=draft status=skip reason=decode line={} column={}",
                    err.line(),
                    err.column()
                );
                Ok(None)
            }
        }
    }

    /// Removes the owner's draft. Returns whether one existed.
    pub fn clear(&self, owner_id: &str) -> Result<bool, DraftStoreError> {
        let removed = self.repo.delete_draft(owner_id)?;
        info!("event=draft_clear module=draft status=ok removed={removed}");
        Ok(removed)
    }
}
