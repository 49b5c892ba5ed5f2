//! KSB reference items.
//!
//! Reference items are read-only catalog entries fetched per apprenticeship
//! standard. The builder links leaves to them by `id` only.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Catalog id of one KSB element.
pub type ReferenceId = i64;

/// Id of an apprenticeship standard.
pub type StandardId = i64;

/// KSB classification of a reference item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Knowledge,
    Skill,
    Behavior,
}

impl Classification {
    pub const ALL: [Classification; 3] = [Self::Knowledge, Self::Skill, Self::Behavior];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::Skill => "skill",
            Self::Behavior => "behavior",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One KSB element of a standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub id: ReferenceId,
    pub classification: Classification,
    /// Short code such as `K3` or `B1`.
    pub code: String,
    pub description: String,
    pub standard_id: StandardId,
}

impl ReferenceItem {
    pub fn new(
        id: ReferenceId,
        classification: Classification,
        code: impl Into<String>,
        description: impl Into<String>,
        standard_id: StandardId,
    ) -> Self {
        Self {
            id,
            classification,
            code: code.into(),
            description: description.into(),
            standard_id,
        }
    }
}

/// Ids of `items` with the given classification, in input order.
pub fn ids_of_classification(
    items: &[ReferenceItem],
    classification: Classification,
) -> Vec<ReferenceId> {
    items
        .iter()
        .filter(|item| item.classification == classification)
        .map(|item| item.id)
        .collect()
}
