//! Structure generation collaborator.
//!
//! An AI-backed service and the local synthesizer both produce a module
//! list of the same shape; the session treats them interchangeably.

use crate::config::SeedLimits;
use crate::external::{ReferenceCatalog, ServiceError, ServiceResult};
use crate::model::course::Module;
use crate::model::ids::IdGenerator;
use crate::model::reference::{ReferenceItem, StandardId};
use crate::service::synthesizer::{synthesize, ASSESSMENT_MODULE_TITLE};
use std::future::Future;
use std::sync::Arc;

/// Parameters forwarded to a structure generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub standard_id: StandardId,
    pub include_resources: bool,
    pub include_assessments: bool,
}

/// Produces a candidate module tree for a standard.
pub trait StructureGenerator: Send + Sync {
    fn generate_structure(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = ServiceResult<Vec<Module>>> + Send;
}

/// Offline generator built on the deterministic synthesizer.
///
/// `include_assessments = false` drops the trailing assessment module.
/// `include_resources` has no local counterpart and is ignored.
pub struct LocalStructureGenerator<C> {
    catalog: C,
    ids: Arc<dyn IdGenerator>,
    limits: SeedLimits,
}

impl<C: ReferenceCatalog> LocalStructureGenerator<C> {
    pub fn new(catalog: C, ids: Arc<dyn IdGenerator>, limits: SeedLimits) -> Self {
        Self {
            catalog,
            ids,
            limits,
        }
    }

    fn build(&self, items: &[ReferenceItem], request: &GenerationRequest) -> Vec<Module> {
        let mut modules = synthesize(items, self.ids.as_ref(), self.limits);
        if !request.include_assessments {
            modules.retain(|module| module.title != ASSESSMENT_MODULE_TITLE);
        }
        modules
    }
}

impl<C: ReferenceCatalog> StructureGenerator for LocalStructureGenerator<C> {
    async fn generate_structure(&self, request: &GenerationRequest) -> ServiceResult<Vec<Module>> {
        let items = self
            .catalog
            .fetch_reference_items(request.standard_id)
            .await?;
        let modules = self.build(&items, request);
        if modules.is_empty() {
            return Err(ServiceError::InvalidResponse(format!(
                "no structure for standard {}",
                request.standard_id
            )));
        }
        Ok(modules)
    }
}
