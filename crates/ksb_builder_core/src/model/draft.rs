//! Draft snapshot model.
//!
//! # Invariants
//! - One snapshot per owner; a newer save replaces the older one.
//! - `schema_version` describes the JSON shape of `DraftState`.

use crate::model::course::CourseTree;
use crate::model::form::BuilderForm;
use crate::model::reference::ReferenceItem;
use serde::{Deserialize, Serialize};

/// Current JSON shape of [`DraftState`].
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

/// Owner scope of drafts, supplied by the identity provider.
pub type OwnerId = String;

/// Everything needed to resume a builder session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftState {
    pub form: BuilderForm,
    pub tree: CourseTree,
    /// Catalog loaded for `form.standard_id` when the draft was taken.
    #[serde(default)]
    pub reference_items: Vec<ReferenceItem>,
}

/// Decoded draft of one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub owner_id: OwnerId,
    /// Epoch ms of the save.
    pub saved_at: i64,
    pub schema_version: u32,
    pub state: DraftState,
}
