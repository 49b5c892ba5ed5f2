//! Builder form values outside the course tree.

use crate::model::reference::StandardId;
use serde::{Deserialize, Serialize};

/// Metadata the user edits alongside the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderForm {
    pub title: String,
    pub description: String,
    pub standard_id: Option<StandardId>,
    /// Visibility of the stored template to other users.
    pub is_public: bool,
    /// Generation flag forwarded to the structure generator.
    pub include_resources: bool,
    /// Generation flag forwarded to the structure generator.
    pub include_assessments: bool,
}

impl Default for BuilderForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            standard_id: None,
            is_public: false,
            include_resources: true,
            include_assessments: true,
        }
    }
}
