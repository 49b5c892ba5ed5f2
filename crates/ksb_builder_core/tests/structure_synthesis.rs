use ksb_builder_core::external::{GenerationRequest, LocalStructureGenerator, StructureGenerator};
use ksb_builder_core::service::synthesizer::{
    ASSESSMENT_MODULE_TITLE, BEHAVIORS_MODULE_TITLE, FOUNDATIONS_MODULE_TITLE,
    SKILLS_MODULE_TITLE,
};
use ksb_builder_core::{
    synthesize, Classification, LessonKind, Module, ReferenceItem, SeedLimits,
    SequentialIdGenerator, ServiceError, StaticReferenceCatalog, UuidIdGenerator,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn items(
    standard_id: i64,
    knowledge: usize,
    skills: usize,
    behaviors: usize,
) -> Vec<ReferenceItem> {
    let mut next_id = 100;
    let mut out = Vec::new();
    let groups = [
        (Classification::Knowledge, "K", knowledge),
        (Classification::Skill, "S", skills),
        (Classification::Behavior, "B", behaviors),
    ];
    for (classification, prefix, count) in groups {
        for index in 1..=count {
            out.push(ReferenceItem::new(
                next_id,
                classification,
                format!("{prefix}{index}"),
                format!("{prefix}{index} description"),
                standard_id,
            ));
            next_id += 1;
        }
    }
    out
}

fn titles(modules: &[Module]) -> Vec<&str> {
    modules.iter().map(|module| module.title.as_str()).collect()
}

type LessonShape = (String, LessonKind, BTreeSet<i64>);
type ModuleShape = (String, BTreeSet<i64>, Vec<LessonShape>);

/// Structure without ids, for shape comparisons.
fn shape(modules: &[Module]) -> Vec<ModuleShape> {
    modules
        .iter()
        .map(|module| {
            let lessons = module
                .lessons
                .iter()
                .map(|lesson| (lesson.title.clone(), lesson.kind, lesson.reference_ids.clone()))
                .collect();
            (module.title.clone(), module.reference_ids.clone(), lessons)
        })
        .collect()
}

#[test]
fn empty_catalog_yields_only_assessment_module() {
    let modules = synthesize(&[], &SequentialIdGenerator::new("n"), SeedLimits::default());

    assert_eq!(titles(&modules), vec![ASSESSMENT_MODULE_TITLE]);
    let assessment = &modules[0];
    assert_eq!(assessment.lessons.len(), 2);
    assert_eq!(assessment.lessons[1].kind, LessonKind::Assessment);
    assert!(assessment.reference_ids.is_empty());
    assert!(assessment
        .lessons
        .iter()
        .all(|lesson| lesson.reference_ids.is_empty()));
}

#[test]
fn missing_behaviors_skip_behaviors_module() {
    let catalog = items(7, 3, 2, 0);
    let modules = synthesize(&catalog, &SequentialIdGenerator::new("n"), SeedLimits::default());

    assert_eq!(
        titles(&modules),
        vec![
            FOUNDATIONS_MODULE_TITLE,
            SKILLS_MODULE_TITLE,
            ASSESSMENT_MODULE_TITLE
        ]
    );
    assert_eq!(modules[0].reference_ids, BTreeSet::from([100, 101, 102]));
    assert_eq!(modules[1].reference_ids, BTreeSet::from([103, 104]));
    assert_eq!(
        modules[1].lessons[0].reference_ids,
        BTreeSet::from([103, 104])
    );
}

#[test]
fn seeding_respects_caps_and_input_order() {
    let catalog = items(7, 6, 4, 2);
    let modules = synthesize(&catalog, &SequentialIdGenerator::new("n"), SeedLimits::default());

    assert_eq!(
        titles(&modules),
        vec![
            FOUNDATIONS_MODULE_TITLE,
            SKILLS_MODULE_TITLE,
            BEHAVIORS_MODULE_TITLE,
            ASSESSMENT_MODULE_TITLE
        ]
    );
    // Knowledge ids 100..=105; only the first five are seeded.
    assert_eq!(
        modules[0].reference_ids,
        BTreeSet::from([100, 101, 102, 103, 104])
    );
    assert_eq!(modules[0].lessons.len(), 1);
    assert!(modules[0].lessons[0].reference_ids.is_empty());

    // Skill ids 106..=109; lesson cap is three.
    assert_eq!(modules[1].reference_ids.len(), 4);
    assert_eq!(
        modules[1].lessons[0].reference_ids,
        BTreeSet::from([106, 107, 108])
    );

    assert_eq!(modules[2].reference_ids, BTreeSet::from([110, 111]));
    let orders: Vec<i64> = modules.iter().map(|module| module.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);
}

#[test]
fn custom_limits_override_default_caps() {
    let catalog = items(7, 6, 4, 0);
    let limits = SeedLimits {
        module: 2,
        lesson: 1,
    };
    let modules = synthesize(&catalog, &SequentialIdGenerator::new("n"), limits);

    assert_eq!(modules[0].reference_ids.len(), 2);
    assert_eq!(modules[1].reference_ids.len(), 2);
    assert_eq!(modules[1].lessons[0].reference_ids, BTreeSet::from([106]));
}

#[test]
fn repeated_calls_are_shape_stable_but_not_id_stable() {
    let catalog = items(7, 2, 2, 2);

    let first = synthesize(&catalog, &UuidIdGenerator, SeedLimits::default());
    let second = synthesize(&catalog, &UuidIdGenerator, SeedLimits::default());

    assert_eq!(shape(&first), shape(&second));
    assert_ne!(first[0].id, second[0].id);
}

#[test]
fn lessons_are_owned_by_their_module() {
    let catalog = items(7, 1, 1, 1);
    let modules = synthesize(&catalog, &SequentialIdGenerator::new("n"), SeedLimits::default());

    let mut seen = BTreeSet::new();
    for module in &modules {
        assert!(seen.insert(module.id.clone()));
        for (index, lesson) in module.lessons.iter().enumerate() {
            assert_eq!(lesson.parent_id, module.id);
            assert_eq!(lesson.order, index as i64 + 1);
            assert!(seen.insert(lesson.id.clone()));
        }
    }
}

#[tokio::test]
async fn local_generator_honors_assessment_flag() {
    let catalog = StaticReferenceCatalog::new(items(7, 2, 1, 0));
    let generator = LocalStructureGenerator::new(
        catalog,
        Arc::new(SequentialIdGenerator::new("g")),
        SeedLimits::default(),
    );

    let with = generator
        .generate_structure(&GenerationRequest {
            standard_id: 7,
            include_resources: true,
            include_assessments: true,
        })
        .await
        .unwrap();
    let without = generator
        .generate_structure(&GenerationRequest {
            standard_id: 7,
            include_resources: true,
            include_assessments: false,
        })
        .await
        .unwrap();

    assert_eq!(with.len(), 3);
    assert_eq!(
        titles(&without),
        vec![FOUNDATIONS_MODULE_TITLE, SKILLS_MODULE_TITLE]
    );
}

#[tokio::test]
async fn local_generator_reports_unknown_standard_and_keeps_sparse_results() {
    let catalog = StaticReferenceCatalog::new(items(7, 1, 0, 0));
    let generator = LocalStructureGenerator::new(
        catalog,
        Arc::new(SequentialIdGenerator::new("g")),
        SeedLimits::default(),
    );

    let unknown = generator
        .generate_structure(&GenerationRequest {
            standard_id: 8,
            include_resources: false,
            include_assessments: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound(_)));

    let sparse_catalog = StaticReferenceCatalog::new(vec![ReferenceItem::new(
        1,
        Classification::Knowledge,
        "K1",
        "only",
        9,
    )]);
    let sparse = LocalStructureGenerator::new(
        sparse_catalog,
        Arc::new(SequentialIdGenerator::new("h")),
        SeedLimits::default(),
    );
    let ok = sparse
        .generate_structure(&GenerationRequest {
            standard_id: 9,
            include_resources: false,
            include_assessments: false,
        })
        .await
        .unwrap();
    assert_eq!(titles(&ok), vec![FOUNDATIONS_MODULE_TITLE]);
}
