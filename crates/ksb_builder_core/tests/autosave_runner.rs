use ksb_builder_core::{
    run_autosave, spawn_autosave, BuilderConfig, BuilderSession, ManualClock,
    MemoryDraftRepository, SequentialIdGenerator, SharedSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

fn shared_session(config: BuilderConfig) -> SharedSession<Arc<MemoryDraftRepository>> {
    Arc::new(Mutex::new(BuilderSession::new(
        "owner-1",
        Arc::new(MemoryDraftRepository::new()),
        config,
        Arc::new(SequentialIdGenerator::new("a")),
        Arc::new(ManualClock::new(0)),
    )))
}

#[tokio::test(start_paused = true)]
async fn writes_only_on_ticks_with_pending_changes() {
    let session = shared_session(BuilderConfig::default());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run_autosave(
        Arc::clone(&session),
        Duration::from_secs(60),
        cancel.clone(),
    ));

    session.lock().await.add_module();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(session.lock().await.last_draft_at().is_none());

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!session.lock().await.has_unsaved_changes());

    // Idle interval: nothing new to write.
    tokio::time::sleep(Duration::from_secs(60)).await;

    session.lock().await.set_title("Edited");
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!session.lock().await.has_unsaved_changes());

    cancel.cancel();
    let written = task.await.unwrap();
    assert_eq!(written, 2);
}

#[tokio::test(start_paused = true)]
async fn spawned_loop_uses_configured_interval_and_stops_on_cancel() {
    let config = BuilderConfig {
        autosave_interval_secs: 5,
        ..BuilderConfig::default()
    };
    let session = shared_session(config);
    let cancel = CancellationToken::new();
    let task = spawn_autosave(Arc::clone(&session), cancel.clone());

    session.lock().await.add_module();
    tokio::time::sleep(Duration::from_secs(6)).await;

    cancel.cancel();
    assert_eq!(task.await.unwrap(), 1);
    let guard = session.lock().await;
    assert!(guard.drafts().load("owner-1").unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn disabled_autosave_never_writes() {
    let config = BuilderConfig {
        autosave_enabled: false,
        ..BuilderConfig::default()
    };
    let session = shared_session(config);
    let cancel = CancellationToken::new();
    let task = spawn_autosave(Arc::clone(&session), cancel.clone());

    session.lock().await.add_module();
    tokio::time::sleep(Duration::from_secs(600)).await;

    cancel.cancel();
    assert_eq!(task.await.unwrap(), 0);
    assert!(session.lock().await.has_unsaved_changes());
}

#[tokio::test(start_paused = true)]
async fn zero_interval_returns_without_writing() {
    let config = BuilderConfig {
        autosave_interval_secs: 0,
        ..BuilderConfig::default()
    };
    let session = shared_session(config);
    session.lock().await.add_module();

    let task = spawn_autosave(Arc::clone(&session), CancellationToken::new());
    assert_eq!(task.await.unwrap(), 0);

    let direct = run_autosave(Arc::clone(&session), Duration::ZERO, CancellationToken::new());
    assert_eq!(direct.await, 0);
    assert!(session.lock().await.has_unsaved_changes());
}
