//! Lesson ↔ KSB linking.
//!
//! # Responsibility
//! - Toggle and bulk-select reference ids on lessons and modules.
//! - Report catalog coverage and stale links for the current standard.
//!
//! # Invariants
//! - Links to ids outside the current catalog are allowed; they are only
//!   reported (`stale_references`) or removed on explicit request.
//! - Bulk selection never removes existing links.

use crate::model::course::CourseTree;
use crate::model::reference::{ids_of_classification, Classification, ReferenceId, ReferenceItem};
use std::collections::{BTreeMap, BTreeSet};

/// Catalog coverage of one tree, per classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Catalog ids linked from at least one module or lesson.
    pub covered: BTreeMap<Classification, Vec<ReferenceId>>,
    /// Catalog ids linked from nowhere.
    pub uncovered: BTreeMap<Classification, Vec<ReferenceId>>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.uncovered.values().all(Vec::is_empty)
    }

    pub fn uncovered_count(&self) -> usize {
        self.uncovered.values().map(Vec::len).sum()
    }
}

impl CourseTree {
    /// Flips one reference link on a lesson.
    ///
    /// Returns the new link state, or `None` when the lesson is unknown.
    pub fn toggle_reference(
        &mut self,
        lesson_id: &str,
        reference_id: ReferenceId,
        now_ms: i64,
    ) -> Option<bool> {
        let lesson = self.lesson_mut(lesson_id)?;
        let linked = toggle(&mut lesson.reference_ids, reference_id);
        self.updated_at = now_ms;
        Some(linked)
    }

    /// Flips one reference link on a module.
    pub fn toggle_module_reference(
        &mut self,
        module_id: &str,
        reference_id: ReferenceId,
        now_ms: i64,
    ) -> Option<bool> {
        let module = self.module_mut(module_id)?;
        let linked = toggle(&mut module.reference_ids, reference_id);
        self.updated_at = now_ms;
        Some(linked)
    }

    /// Links every catalog item of `classification` to the lesson.
    ///
    /// Returns how many links were added. Zero matches is not an error.
    pub fn select_all_of_classification(
        &mut self,
        lesson_id: &str,
        classification: Classification,
        catalog: &[ReferenceItem],
        now_ms: i64,
    ) -> usize {
        let candidates = ids_of_classification(catalog, classification);
        let Some(lesson) = self.lesson_mut(lesson_id) else {
            return 0;
        };
        let before = lesson.reference_ids.len();
        lesson.reference_ids.extend(candidates);
        let added = lesson.reference_ids.len() - before;
        if added > 0 {
            self.updated_at = now_ms;
        }
        added
    }

    /// Reference ids linked to a lesson. Empty for unknown lessons.
    pub fn references(&self, lesson_id: &str) -> BTreeSet<ReferenceId> {
        self.lesson(lesson_id)
            .map(|lesson| lesson.reference_ids.clone())
            .unwrap_or_default()
    }

    /// Every reference id linked anywhere in the tree.
    pub fn linked_references(&self) -> BTreeSet<ReferenceId> {
        let mut linked = BTreeSet::new();
        for module in &self.modules {
            linked.extend(module.reference_ids.iter().copied());
            for lesson in &module.lessons {
                linked.extend(lesson.reference_ids.iter().copied());
            }
        }
        linked
    }

    pub fn coverage(&self, catalog: &[ReferenceItem]) -> CoverageReport {
        let linked = self.linked_references();
        let mut report = CoverageReport::default();
        for classification in Classification::ALL {
            report.covered.insert(classification, Vec::new());
            report.uncovered.insert(classification, Vec::new());
        }
        for item in catalog {
            let bucket = if linked.contains(&item.id) {
                &mut report.covered
            } else {
                &mut report.uncovered
            };
            bucket.entry(item.classification).or_default().push(item.id);
        }
        report
    }

    /// Linked ids that are not part of `catalog`.
    pub fn stale_references(&self, catalog: &[ReferenceItem]) -> BTreeSet<ReferenceId> {
        let known = catalog_ids(catalog);
        self.linked_references()
            .into_iter()
            .filter(|id| !known.contains(id))
            .collect()
    }

    /// Removes links to ids outside `catalog`. Returns how many were removed.
    pub fn prune_stale_references(&mut self, catalog: &[ReferenceItem], now_ms: i64) -> usize {
        let known = catalog_ids(catalog);
        let mut removed = 0;
        for module in &mut self.modules {
            removed += retain_known(&mut module.reference_ids, &known);
            for lesson in &mut module.lessons {
                removed += retain_known(&mut lesson.reference_ids, &known);
            }
        }
        if removed > 0 {
            self.updated_at = now_ms;
        }
        removed
    }
}

fn toggle(set: &mut BTreeSet<ReferenceId>, reference_id: ReferenceId) -> bool {
    if set.remove(&reference_id) {
        false
    } else {
        set.insert(reference_id);
        true
    }
}

fn catalog_ids(catalog: &[ReferenceItem]) -> BTreeSet<ReferenceId> {
    catalog.iter().map(|item| item.id).collect()
}

fn retain_known(set: &mut BTreeSet<ReferenceId>, known: &BTreeSet<ReferenceId>) -> usize {
    let before = set.len();
    set.retain(|id| known.contains(id));
    before - set.len()
}
