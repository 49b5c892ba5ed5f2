use ksb_builder_core::{
    Classification, CourseTree, LessonKind, ReferenceItem, SequentialIdGenerator,
};
use std::collections::BTreeSet;

fn catalog() -> Vec<ReferenceItem> {
    vec![
        ReferenceItem::new(1, Classification::Knowledge, "K1", "Data structures", 7),
        ReferenceItem::new(2, Classification::Knowledge, "K2", "Data protection", 7),
        ReferenceItem::new(3, Classification::Skill, "S1", "Clean data", 7),
        ReferenceItem::new(4, Classification::Skill, "S2", "Visualise data", 7),
        ReferenceItem::new(5, Classification::Behavior, "B1", "Works securely", 7),
    ]
}

fn tree_with_lesson() -> (CourseTree, String, String) {
    let ids = SequentialIdGenerator::new("n");
    let mut tree = CourseTree::new();
    let module = tree.add_module(&ids, 1);
    let lesson = tree
        .add_lesson(&ids, &module.id, LessonKind::Content, 1)
        .unwrap();
    (tree, module.id, lesson.id)
}

#[test]
fn toggle_twice_restores_original_links() {
    let (mut tree, _, lesson_id) = tree_with_lesson();

    assert_eq!(tree.toggle_reference(&lesson_id, 3, 2), Some(true));
    assert_eq!(tree.references(&lesson_id), BTreeSet::from([3]));
    assert_eq!(tree.toggle_reference(&lesson_id, 3, 3), Some(false));
    assert!(tree.references(&lesson_id).is_empty());
}

#[test]
fn toggle_on_unknown_lesson_returns_none() {
    let (mut tree, _, _) = tree_with_lesson();
    let before = tree.clone();

    assert_eq!(tree.toggle_reference("ghost", 1, 5), None);
    assert!(tree.references("ghost").is_empty());
    assert_eq!(tree, before);
}

#[test]
fn module_links_are_independent_of_lesson_links() {
    let (mut tree, module_id, lesson_id) = tree_with_lesson();

    assert_eq!(tree.toggle_module_reference(&module_id, 1, 2), Some(true));

    assert!(tree.references(&lesson_id).is_empty());
    assert_eq!(tree.linked_references(), BTreeSet::from([1]));
}

#[test]
fn select_all_adds_only_missing_ids_of_the_classification() {
    let (mut tree, _, lesson_id) = tree_with_lesson();
    tree.toggle_reference(&lesson_id, 3, 2);
    tree.toggle_reference(&lesson_id, 1, 2);

    let added =
        tree.select_all_of_classification(&lesson_id, Classification::Skill, &catalog(), 3);

    assert_eq!(added, 1);
    assert_eq!(tree.references(&lesson_id), BTreeSet::from([1, 3, 4]));
    assert_eq!(tree.updated_at, 3);
}

#[test]
fn select_all_with_no_matches_changes_nothing() {
    let (mut tree, _, lesson_id) = tree_with_lesson();
    let knowledge_only: Vec<ReferenceItem> = catalog()
        .into_iter()
        .filter(|item| item.classification == Classification::Knowledge)
        .collect();

    let added = tree.select_all_of_classification(
        &lesson_id,
        Classification::Behavior,
        &knowledge_only,
        9,
    );

    assert_eq!(added, 0);
    assert!(tree.references(&lesson_id).is_empty());
    assert_eq!(tree.updated_at, 1);
}

#[test]
fn coverage_splits_catalog_by_classification() {
    let (mut tree, module_id, lesson_id) = tree_with_lesson();
    tree.toggle_module_reference(&module_id, 1, 2);
    tree.toggle_reference(&lesson_id, 4, 2);

    let report = tree.coverage(&catalog());

    assert_eq!(report.covered[&Classification::Knowledge], vec![1]);
    assert_eq!(report.uncovered[&Classification::Knowledge], vec![2]);
    assert_eq!(report.covered[&Classification::Skill], vec![4]);
    assert_eq!(report.uncovered[&Classification::Skill], vec![3]);
    assert!(report.covered[&Classification::Behavior].is_empty());
    assert_eq!(report.uncovered_count(), 3);
    assert!(!report.is_complete());
}

#[test]
fn links_outside_the_catalog_are_reported_then_pruned() {
    let (mut tree, module_id, lesson_id) = tree_with_lesson();
    tree.toggle_reference(&lesson_id, 2, 2);
    tree.toggle_reference(&lesson_id, 42, 2);
    tree.toggle_module_reference(&module_id, 99, 2);

    assert_eq!(tree.stale_references(&catalog()), BTreeSet::from([42, 99]));

    let removed = tree.prune_stale_references(&catalog(), 8);

    assert_eq!(removed, 2);
    assert_eq!(tree.references(&lesson_id), BTreeSet::from([2]));
    assert!(tree.stale_references(&catalog()).is_empty());
    assert_eq!(tree.updated_at, 8);
    assert_eq!(tree.prune_stale_references(&catalog(), 9), 0);
    assert_eq!(tree.updated_at, 8);
}

#[test]
fn select_all_twice_matches_a_single_call() {
    let (mut once, _, lesson_id) = tree_with_lesson();
    once.toggle_reference(&lesson_id, 1, 2);
    let mut twice = once.clone();

    once.select_all_of_classification(&lesson_id, Classification::Skill, &catalog(), 3);
    twice.select_all_of_classification(&lesson_id, Classification::Skill, &catalog(), 3);
    let second_added =
        twice.select_all_of_classification(&lesson_id, Classification::Skill, &catalog(), 4);

    assert_eq!(second_added, 0);
    assert_eq!(twice, once);
    assert_eq!(twice.references(&lesson_id), BTreeSet::from([1, 3, 4]));
}
