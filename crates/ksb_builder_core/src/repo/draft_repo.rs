//! Draft repository contracts and storage backends.
//!
//! # Responsibility
//! - Persist raw draft rows keyed by owner id.
//! - Keep SQL details inside the repository boundary.
//!
//! # Invariants
//! - At most one row per owner; `save_draft` is an upsert.
//! - Owner ids are trimmed and must not be blank.
//! - Rows are stored as opaque JSON; decoding happens in the draft service.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Result type used by draft repository operations.
pub type DraftRepoResult<T> = Result<T, DraftRepoError>;

/// Errors from draft repository operations.
#[derive(Debug)]
pub enum DraftRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Owner id is blank after trim.
    InvalidOwnerId,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for DraftRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidOwnerId => write!(f, "draft owner id must not be blank"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "draft repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "draft repository requires table `{table}`")
            }
        }
    }
}

impl Error for DraftRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for DraftRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DraftRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw persisted draft row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDraft {
    pub owner_id: String,
    pub schema_version: u32,
    /// Serialized `DraftState`.
    pub state_json: String,
    /// Epoch ms of the save.
    pub saved_at: i64,
}

/// Repository interface for single-slot drafts.
pub trait DraftRepository: Send {
    /// Inserts or replaces the owner's draft.
    fn save_draft(&self, draft: &StoredDraft) -> DraftRepoResult<()>;
    /// Loads the owner's draft, if any.
    fn load_draft(&self, owner_id: &str) -> DraftRepoResult<Option<StoredDraft>>;
    /// Deletes the owner's draft. Returns whether a row existed.
    fn delete_draft(&self, owner_id: &str) -> DraftRepoResult<bool>;
}

/// SQLite-backed draft repository.
///
/// Owns its connection so a session holding it can move across tasks.
pub struct SqliteDraftRepository {
    conn: Connection,
}

impl SqliteDraftRepository {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> DraftRepoResult<Self> {
        ensure_draft_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DraftRepository for SqliteDraftRepository {
    fn save_draft(&self, draft: &StoredDraft) -> DraftRepoResult<()> {
        let owner_id = normalize_owner_id(&draft.owner_id)?;
        self.conn.execute(
            "INSERT INTO builder_drafts (owner_id, schema_version, state_json, saved_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(owner_id) DO UPDATE SET
                 schema_version = excluded.schema_version,
                 state_json = excluded.state_json,
                 saved_at = excluded.saved_at;",
            params![owner_id, draft.schema_version, draft.state_json, draft.saved_at],
        )?;
        Ok(())
    }

    fn load_draft(&self, owner_id: &str) -> DraftRepoResult<Option<StoredDraft>> {
        let owner_id = normalize_owner_id(owner_id)?;
        let row = self
            .conn
            .query_row(
                "SELECT owner_id, schema_version, state_json, saved_at
                 FROM builder_drafts
                 WHERE owner_id = ?1;",
                [owner_id],
                parse_draft_row,
            )
            .optional()?;
        Ok(row)
    }

    fn delete_draft(&self, owner_id: &str) -> DraftRepoResult<bool> {
        let owner_id = normalize_owner_id(owner_id)?;
        let changed = self
            .conn
            .execute("DELETE FROM builder_drafts WHERE owner_id = ?1;", [owner_id])?;
        Ok(changed > 0)
    }
}

/// Process-local draft repository.
#[derive(Debug, Default)]
pub struct MemoryDraftRepository {
    drafts: Mutex<HashMap<String, StoredDraft>>,
}

impl MemoryDraftRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_drafts<T>(&self, f: impl FnOnce(&mut HashMap<String, StoredDraft>) -> T) -> T {
        let mut guard = self
            .drafts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl DraftRepository for MemoryDraftRepository {
    fn save_draft(&self, draft: &StoredDraft) -> DraftRepoResult<()> {
        let owner_id = normalize_owner_id(&draft.owner_id)?.to_string();
        let stored = StoredDraft {
            owner_id: owner_id.clone(),
            ..draft.clone()
        };
        self.with_drafts(|drafts| drafts.insert(owner_id, stored));
        Ok(())
    }

    fn load_draft(&self, owner_id: &str) -> DraftRepoResult<Option<StoredDraft>> {
        let owner_id = normalize_owner_id(owner_id)?;
        Ok(self.with_drafts(|drafts| drafts.get(owner_id).cloned()))
    }

    fn delete_draft(&self, owner_id: &str) -> DraftRepoResult<bool> {
        let owner_id = normalize_owner_id(owner_id)?;
        Ok(self.with_drafts(|drafts| drafts.remove(owner_id).is_some()))
    }
}

impl<R: DraftRepository + Sync> DraftRepository for Arc<R> {
    fn save_draft(&self, draft: &StoredDraft) -> DraftRepoResult<()> {
        self.as_ref().save_draft(draft)
    }

    fn load_draft(&self, owner_id: &str) -> DraftRepoResult<Option<StoredDraft>> {
        self.as_ref().load_draft(owner_id)
    }

    fn delete_draft(&self, owner_id: &str) -> DraftRepoResult<bool> {
        self.as_ref().delete_draft(owner_id)
    }
}

fn normalize_owner_id(owner_id: &str) -> DraftRepoResult<&str> {
    let trimmed = owner_id.trim();
    if trimmed.is_empty() {
        return Err(DraftRepoError::InvalidOwnerId);
    }
    Ok(trimmed)
}

fn parse_draft_row(row: &Row<'_>) -> rusqlite::Result<StoredDraft> {
    Ok(StoredDraft {
        owner_id: row.get("owner_id")?,
        schema_version: row.get("schema_version")?,
        state_json: row.get("state_json")?,
        saved_at: row.get("saved_at")?,
    })
}

fn ensure_draft_connection_ready(conn: &Connection) -> DraftRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(DraftRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'builder_drafts'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(DraftRepoError::MissingRequiredTable("builder_drafts"));
    }
    Ok(())
}
