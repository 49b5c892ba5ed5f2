//! Template persistence collaborator.

use crate::external::ServiceResult;
use crate::model::course::Module;
use crate::model::reference::StandardId;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Identifier assigned by the persistence service.
pub type TemplateId = String;

/// Full payload submitted on explicit save and returned on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSubmission {
    pub title: String,
    pub description: String,
    pub standard_id: StandardId,
    pub is_public: bool,
    pub modules: Vec<Module>,
}

/// Stores and returns builder templates.
pub trait TemplateService: Send + Sync {
    fn submit_template(
        &self,
        submission: &TemplateSubmission,
    ) -> impl Future<Output = ServiceResult<TemplateId>> + Send;

    fn load_template(
        &self,
        template_id: &str,
    ) -> impl Future<Output = ServiceResult<TemplateSubmission>> + Send;
}
