//! Course tree: ordered modules owning ordered lessons.
//!
//! # Responsibility
//! - Hold the editable Module → Lesson hierarchy of one builder session.
//! - Apply insert/update/delete/reorder edits in place.
//!
//! # Invariants
//! - Every lesson's `parent_id` equals the id of the module that owns it.
//! - Deleting a module drops its lessons with it; lessons never outlive their
//!   parent.
//! - Within one parent, `order` is exactly `1..=n` in display order, after
//!   every edit including deletes.
//! - Default titles of new nodes never repeat a sibling's title.
//! - Edits addressed to unknown ids are no-ops and do not touch `updated_at`.

use crate::model::ids::{IdGenerator, NodeId};
use crate::model::reference::ReferenceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lesson (question) content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    #[default]
    Content,
    Video,
    Reading,
    Activity,
    Quiz,
    Assignment,
    Assessment,
}

impl LessonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Video => "video",
            Self::Reading => "reading",
            Self::Activity => "activity",
            Self::Quiz => "quiz",
            Self::Assignment => "assignment",
            Self::Assessment => "assessment",
        }
    }
}

/// Leaf node owned by exactly one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: NodeId,
    pub parent_id: NodeId,
    pub title: String,
    pub description: String,
    pub kind: LessonKind,
    pub order: i64,
    #[serde(default)]
    pub reference_ids: BTreeSet<ReferenceId>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Lesson {
    pub fn new(
        id: NodeId,
        parent_id: NodeId,
        title: impl Into<String>,
        kind: LessonKind,
        order: i64,
    ) -> Self {
        Self {
            id,
            parent_id,
            title: title.into(),
            description: String::new(),
            kind,
            order,
            reference_ids: BTreeSet::new(),
            content: None,
        }
    }
}

/// Top-level container node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: NodeId,
    pub title: String,
    pub description: String,
    pub order: i64,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub reference_ids: BTreeSet<ReferenceId>,
}

impl Module {
    pub fn new(id: NodeId, title: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            order,
            lessons: Vec::new(),
            reference_ids: BTreeSet::new(),
        }
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == lesson_id)
    }

    fn next_lesson_order(&self) -> i64 {
        self.lessons.len() as i64 + 1
    }

    fn renumber_lessons(&mut self) {
        for (index, lesson) in self.lessons.iter_mut().enumerate() {
            lesson.order = index as i64 + 1;
        }
    }
}

/// Merge-patch for module fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Merge-patch for lesson fields. `None` leaves a field unchanged.
///
/// `content: Some(None)` clears the lesson content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<LessonKind>,
    pub content: Option<Option<String>>,
}

/// Editable course aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTree {
    pub modules: Vec<Module>,
    #[serde(default)]
    pub selected_module_id: Option<NodeId>,
    /// Epoch ms of the last applied edit. Staleness only; not a version.
    #[serde(default)]
    pub updated_at: i64,
}

impl CourseTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from externally produced modules.
    ///
    /// Re-establishes ownership links and display order so the result holds
    /// the tree invariants even when the producer did not.
    pub fn from_modules(modules: Vec<Module>, now_ms: i64) -> Self {
        let mut tree = Self {
            modules,
            selected_module_id: None,
            updated_at: now_ms,
        };
        tree.normalize();
        tree.selected_module_id = tree.modules.first().map(|module| module.id.clone());
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|module| module.lessons.len()).sum()
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == module_id)
    }

    /// Finds a lesson anywhere in the tree.
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.modules
            .iter()
            .find_map(|module| module.lesson(lesson_id))
    }

    pub fn selected_module(&self) -> Option<&Module> {
        self.selected_module_id
            .as_deref()
            .and_then(|module_id| self.module(module_id))
    }

    /// Selects a module for editing. Unknown ids are ignored.
    pub fn select_module(&mut self, module_id: &str) -> bool {
        if self.module(module_id).is_none() {
            return false;
        }
        self.selected_module_id = Some(module_id.to_string());
        true
    }

    /// Appends a module with a default title and selects it.
    pub fn add_module(&mut self, ids: &dyn IdGenerator, now_ms: i64) -> Module {
        let order = self.modules.len() as i64 + 1;
        let title = default_title("Module", order, self.modules.iter().map(|m| m.title.as_str()));
        let module = Module::new(ids.next_id(), title, order);
        self.selected_module_id = Some(module.id.clone());
        self.modules.push(module.clone());
        self.updated_at = now_ms;
        module
    }

    /// Appends a lesson to `module_id`. Returns `None` when the module is
    /// missing.
    pub fn add_lesson(
        &mut self,
        ids: &dyn IdGenerator,
        module_id: &str,
        kind: LessonKind,
        now_ms: i64,
    ) -> Option<Lesson> {
        let module = self.module_mut(module_id)?;
        let order = module.next_lesson_order();
        let title = default_title("Lesson", order, module.lessons.iter().map(|l| l.title.as_str()));
        let lesson = Lesson::new(ids.next_id(), module.id.clone(), title, kind, order);
        module.lessons.push(lesson.clone());
        self.updated_at = now_ms;
        Some(lesson)
    }

    pub fn update_module(&mut self, module_id: &str, patch: ModulePatch, now_ms: i64) -> bool {
        let Some(module) = self.module_mut(module_id) else {
            return false;
        };
        if let Some(title) = patch.title {
            module.title = title;
        }
        if let Some(description) = patch.description {
            module.description = description;
        }
        self.updated_at = now_ms;
        true
    }

    pub fn update_lesson(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        patch: LessonPatch,
        now_ms: i64,
    ) -> bool {
        let Some(lesson) = self.lesson_in_mut(module_id, lesson_id) else {
            return false;
        };
        if let Some(title) = patch.title {
            lesson.title = title;
        }
        if let Some(description) = patch.description {
            lesson.description = description;
        }
        if let Some(kind) = patch.kind {
            lesson.kind = kind;
        }
        if let Some(content) = patch.content {
            lesson.content = content;
        }
        self.updated_at = now_ms;
        true
    }

    /// Removes a module together with all of its lessons.
    pub fn delete_module(&mut self, module_id: &str, now_ms: i64) -> Option<Module> {
        let index = self.module_index(module_id)?;
        let removed = self.modules.remove(index);
        self.renumber_modules();
        if self.selected_module_id.as_deref() == Some(module_id) {
            self.selected_module_id = None;
        }
        self.updated_at = now_ms;
        Some(removed)
    }

    pub fn delete_lesson(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        now_ms: i64,
    ) -> Option<Lesson> {
        let module = self.module_mut(module_id)?;
        let index = module
            .lessons
            .iter()
            .position(|lesson| lesson.id == lesson_id)?;
        let removed = module.lessons.remove(index);
        module.renumber_lessons();
        self.updated_at = now_ms;
        Some(removed)
    }

    /// Moves the module at `from` to `to` among the root modules.
    pub fn reorder_modules(&mut self, from: usize, to: usize, now_ms: i64) -> bool {
        if !move_within(&mut self.modules, from, to) {
            return false;
        }
        self.renumber_modules();
        self.updated_at = now_ms;
        true
    }

    /// Moves the lesson at `from` to `to` inside one module.
    ///
    /// Lessons never change parent through reordering.
    pub fn reorder_lessons(
        &mut self,
        module_id: &str,
        from: usize,
        to: usize,
        now_ms: i64,
    ) -> bool {
        let Some(module) = self.module_mut(module_id) else {
            return false;
        };
        if !move_within(&mut module.lessons, from, to) {
            return false;
        }
        module.renumber_lessons();
        self.updated_at = now_ms;
        true
    }

    /// Replaces the whole tree content, e.g. after synthesis or generation.
    pub fn replace_modules(&mut self, modules: Vec<Module>, now_ms: i64) {
        *self = Self::from_modules(modules, now_ms);
    }

    pub(crate) fn module_mut(&mut self, module_id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|module| module.id == module_id)
    }

    pub(crate) fn lesson_mut(&mut self, lesson_id: &str) -> Option<&mut Lesson> {
        self.modules
            .iter_mut()
            .flat_map(|module| module.lessons.iter_mut())
            .find(|lesson| lesson.id == lesson_id)
    }

    fn lesson_in_mut(&mut self, module_id: &str, lesson_id: &str) -> Option<&mut Lesson> {
        self.module_mut(module_id)?
            .lessons
            .iter_mut()
            .find(|lesson| lesson.id == lesson_id)
    }

    fn module_index(&self, module_id: &str) -> Option<usize> {
        self.modules.iter().position(|module| module.id == module_id)
    }

    fn renumber_modules(&mut self) {
        for (index, module) in self.modules.iter_mut().enumerate() {
            module.order = index as i64 + 1;
        }
    }

    fn normalize(&mut self) {
        for (module_index, module) in self.modules.iter_mut().enumerate() {
            module.order = module_index as i64 + 1;
            for (lesson_index, lesson) in module.lessons.iter_mut().enumerate() {
                lesson.parent_id = module.id.clone();
                lesson.order = lesson_index as i64 + 1;
            }
        }
    }
}

/// `"{prefix} {n}"` for the smallest `n >= order` not already taken.
fn default_title<'a>(prefix: &str, order: i64, taken: impl Iterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.collect();
    let mut number = order;
    loop {
        let title = format!("{prefix} {number}");
        if !taken.contains(&title.as_str()) {
            return title;
        }
        number += 1;
    }
}

fn move_within<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}
