//! Default course skeleton synthesis.
//!
//! # Responsibility
//! - Bucket a standard's KSB items into foundation/skills/behaviors modules.
//! - Always close the course with an assessment preparation module.
//!
//! # Invariants
//! - Output shape depends only on the ordered input and the seed limits.
//! - Ids come from the caller's generator and may differ between calls.
//! - Items are seeded in input order; nothing beyond the caps is linked.

use crate::config::SeedLimits;
use crate::model::course::{Lesson, LessonKind, Module};
use crate::model::ids::IdGenerator;
use crate::model::reference::{
    ids_of_classification as bucket, Classification, ReferenceId, ReferenceItem,
};

pub const FOUNDATIONS_MODULE_TITLE: &str = "Foundations";
pub const SKILLS_MODULE_TITLE: &str = "Practical Skills";
pub const BEHAVIORS_MODULE_TITLE: &str = "Professional Behaviors";
pub const ASSESSMENT_MODULE_TITLE: &str = "Assessment Preparation";

/// Builds the default module skeleton for `items`.
pub fn synthesize(
    items: &[ReferenceItem],
    ids: &dyn IdGenerator,
    limits: SeedLimits,
) -> Vec<Module> {
    let knowledge = bucket(items, Classification::Knowledge);
    let skills = bucket(items, Classification::Skill);
    let behaviors = bucket(items, Classification::Behavior);

    let mut modules = Vec::with_capacity(4);

    if !knowledge.is_empty() {
        let mut module = seeded_module(
            ids,
            FOUNDATIONS_MODULE_TITLE,
            "Core knowledge that underpins the standard.",
            &knowledge,
            limits.module,
        );
        push_lesson(ids, &mut module, "Introduction", LessonKind::Content, &[]);
        modules.push(module);
    }

    if !skills.is_empty() {
        let mut module = seeded_module(
            ids,
            SKILLS_MODULE_TITLE,
            "Hands-on application of the standard's skills.",
            &skills,
            limits.module,
        );
        let seeded = first_n(&skills, limits.lesson);
        push_lesson(ids, &mut module, "Applying core skills", LessonKind::Activity, seeded);
        modules.push(module);
    }

    if !behaviors.is_empty() {
        let mut module = seeded_module(
            ids,
            BEHAVIORS_MODULE_TITLE,
            "Workplace behaviors expected of the apprentice.",
            &behaviors,
            limits.module,
        );
        let seeded = first_n(&behaviors, limits.lesson);
        push_lesson(
            ids,
            &mut module,
            "Demonstrating professional behaviors",
            LessonKind::Activity,
            seeded,
        );
        modules.push(module);
    }

    let mut assessment = Module::new(ids.next_id(), ASSESSMENT_MODULE_TITLE, 0);
    assessment.description = "Preparation for the end-point assessment.".to_string();
    push_lesson(ids, &mut assessment, "Assessment overview", LessonKind::Content, &[]);
    push_lesson(ids, &mut assessment, "Mock assessment", LessonKind::Assessment, &[]);
    modules.push(assessment);

    for (index, module) in modules.iter_mut().enumerate() {
        module.order = index as i64 + 1;
    }
    modules
}

fn first_n(ids: &[ReferenceId], cap: usize) -> &[ReferenceId] {
    &ids[..ids.len().min(cap)]
}

fn seeded_module(
    ids: &dyn IdGenerator,
    title: &str,
    description: &str,
    pool: &[ReferenceId],
    cap: usize,
) -> Module {
    let mut module = Module::new(ids.next_id(), title, 0);
    module.description = description.to_string();
    module.reference_ids.extend(first_n(pool, cap).iter().copied());
    module
}

fn push_lesson(
    ids: &dyn IdGenerator,
    module: &mut Module,
    title: &str,
    kind: LessonKind,
    seeded: &[ReferenceId],
) {
    let order = module.lessons.len() as i64 + 1;
    let mut lesson = Lesson::new(ids.next_id(), module.id.clone(), title, kind, order);
    lesson.reference_ids.extend(seeded.iter().copied());
    module.lessons.push(lesson);
}
