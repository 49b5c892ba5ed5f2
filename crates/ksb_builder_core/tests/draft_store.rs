use ksb_builder_core::db::open_db_in_memory;
use ksb_builder_core::{
    BuilderForm, Classification, CourseTree, DraftRepoError, DraftRepository, DraftState,
    DraftStore, DraftStoreError, LessonKind, ManualClock, MemoryDraftRepository, ReferenceItem,
    SequentialIdGenerator, SqliteDraftRepository, StoredDraft, DRAFT_SCHEMA_VERSION,
};
use std::sync::Arc;

fn sample_state() -> DraftState {
    let ids = SequentialIdGenerator::new("d");
    let mut tree = CourseTree::new();
    let module = tree.add_module(&ids, 10);
    let lesson = tree
        .add_lesson(&ids, &module.id, LessonKind::Quiz, 11)
        .unwrap();
    tree.toggle_reference(&lesson.id, 3, 12);
    tree.toggle_module_reference(&module.id, 1, 12);

    DraftState {
        form: BuilderForm {
            title: "Data Technician".to_string(),
            standard_id: Some(7),
            ..BuilderForm::default()
        },
        tree,
        reference_items: vec![
            ReferenceItem::new(1, Classification::Knowledge, "K1", "Data", 7),
            ReferenceItem::new(3, Classification::Skill, "S1", "Clean", 7),
        ],
    }
}

fn sqlite_store(clock: Arc<ManualClock>) -> DraftStore<SqliteDraftRepository> {
    let repo = SqliteDraftRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    DraftStore::new(repo, clock)
}

#[test]
fn sqlite_round_trip_restores_structurally_equal_tree() {
    let clock = Arc::new(ManualClock::new(1_000));
    let store = sqlite_store(Arc::clone(&clock));
    let state = sample_state();

    let saved_at = store.save("owner-1", &state).unwrap();
    let snapshot = store.load("owner-1").unwrap().expect("draft should exist");

    assert_eq!(saved_at, 1_000);
    assert_eq!(snapshot.saved_at, 1_000);
    assert_eq!(snapshot.owner_id, "owner-1");
    assert_eq!(snapshot.schema_version, DRAFT_SCHEMA_VERSION);
    assert_eq!(snapshot.state, state);
}

#[test]
fn second_save_overwrites_first() {
    let clock = Arc::new(ManualClock::new(1_000));
    let store = sqlite_store(Arc::clone(&clock));
    let mut state = sample_state();
    store.save("owner-1", &state).unwrap();

    clock.advance(60_000);
    state.form.title = "Renamed".to_string();
    store.save("owner-1", &state).unwrap();

    let snapshot = store.load("owner-1").unwrap().unwrap();
    assert_eq!(snapshot.saved_at, 61_000);
    assert_eq!(snapshot.state.form.title, "Renamed");

    let rows: i64 = store
        .repository()
        .connection()
        .query_row("SELECT COUNT(*) FROM builder_drafts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn clear_then_load_returns_none() {
    let store = sqlite_store(Arc::new(ManualClock::new(5)));
    store.save("owner-1", &sample_state()).unwrap();

    assert!(store.clear("owner-1").unwrap());
    assert!(store.load("owner-1").unwrap().is_none());
    assert!(!store.clear("owner-1").unwrap());
}

#[test]
fn drafts_are_scoped_per_owner() {
    let store = DraftStore::new(MemoryDraftRepository::new(), Arc::new(ManualClock::new(5)));
    store.save("owner-a", &sample_state()).unwrap();

    assert!(store.load("owner-b").unwrap().is_none());
    assert!(store.load(" owner-a ").unwrap().is_some());
}

#[test]
fn undecodable_draft_is_treated_as_absent() {
    let repo = MemoryDraftRepository::new();
    repo.save_draft(&StoredDraft {
        owner_id: "owner-1".to_string(),
        schema_version: DRAFT_SCHEMA_VERSION,
        state_json: "{not json".to_string(),
        saved_at: 1,
    })
    .unwrap();
    let store = DraftStore::new(repo, Arc::new(ManualClock::new(5)));

    assert!(store.load("owner-1").unwrap().is_none());
}

#[test]
fn draft_from_other_schema_version_is_treated_as_absent() {
    let repo = MemoryDraftRepository::new();
    let state_json = serde_json::to_string(&sample_state()).unwrap();
    repo.save_draft(&StoredDraft {
        owner_id: "owner-1".to_string(),
        schema_version: DRAFT_SCHEMA_VERSION + 1,
        state_json,
        saved_at: 1,
    })
    .unwrap();
    let store = DraftStore::new(repo, Arc::new(ManualClock::new(5)));

    assert!(store.load("owner-1").unwrap().is_none());
}

#[test]
fn blank_owner_is_rejected() {
    let store = DraftStore::new(MemoryDraftRepository::new(), Arc::new(ManualClock::new(5)));

    let err = store.save("   ", &sample_state()).unwrap_err();
    assert!(matches!(
        err,
        DraftStoreError::Repo(DraftRepoError::InvalidOwnerId)
    ));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();

    let err = SqliteDraftRepository::try_new(conn)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(
        err,
        DraftRepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}
