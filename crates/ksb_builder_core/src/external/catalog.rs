//! Reference catalog collaborator.

use crate::external::{ServiceError, ServiceResult};
use crate::model::reference::{ReferenceItem, StandardId};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::path::Path;

/// Source of KSB reference items per standard.
pub trait ReferenceCatalog: Send + Sync {
    /// Returns the standard's items in catalog order.
    fn fetch_reference_items(
        &self,
        standard_id: StandardId,
    ) -> impl Future<Output = ServiceResult<Vec<ReferenceItem>>> + Send;
}

/// Catalog file could not be loaded.
#[derive(Debug)]
pub enum CatalogLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for CatalogLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read catalog: {err}"),
            Self::Json(err) => write!(f, "failed to decode catalog: {err}"),
        }
    }
}

impl Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

/// In-memory catalog grouped by standard.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceCatalog {
    by_standard: BTreeMap<StandardId, Vec<ReferenceItem>>,
}

impl StaticReferenceCatalog {
    /// Groups `items` by `standard_id`, keeping input order per standard.
    pub fn new(items: impl IntoIterator<Item = ReferenceItem>) -> Self {
        let mut by_standard: BTreeMap<StandardId, Vec<ReferenceItem>> = BTreeMap::new();
        for item in items {
            by_standard.entry(item.standard_id).or_default().push(item);
        }
        Self { by_standard }
    }

    /// Decodes a JSON array of reference items.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogLoadError> {
        let items: Vec<ReferenceItem> = serde_json::from_str(raw).map_err(CatalogLoadError::Json)?;
        Ok(Self::new(items))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let raw = std::fs::read_to_string(path).map_err(CatalogLoadError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn items(&self, standard_id: StandardId) -> Option<&[ReferenceItem]> {
        self.by_standard.get(&standard_id).map(Vec::as_slice)
    }
}

impl ReferenceCatalog for StaticReferenceCatalog {
    async fn fetch_reference_items(
        &self,
        standard_id: StandardId,
    ) -> ServiceResult<Vec<ReferenceItem>> {
        self.items(standard_id)
            .map(<[ReferenceItem]>::to_vec)
            .ok_or_else(|| ServiceError::NotFound(format!("standard {standard_id}")))
    }
}
