//! Timing tests for the autosave driver
//!
//! Run on a paused clock: `sleep` advances virtual time and the driver's
//! timers fire deterministically.

use pagecraft_common::{MemoryDocumentStore, MemoryLocalStore, UserId};
use pagecraft_editor::{
    spawn_autosave, AutosaveState, ComponentContent, EditSession, EditorConfig, HeroContent,
    Severity, SharedSession, PAGES_COLLECTION,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

fn hero(headline: &str) -> ComponentContent {
    ComponentContent::Hero(HeroContent {
        headline: headline.to_string(),
        ..Default::default()
    })
}

/// Session with one hero section, wrapped for the driver
async fn setup(store: Arc<MemoryDocumentStore>) -> (SharedSession, String, String) {
    let mut session = EditSession::new(
        UserId::from("alice"),
        store,
        Arc::new(MemoryLocalStore::new()),
        EditorConfig::default(),
    );
    let page = session.create("Launch", None).await.unwrap();
    let hero_id = session.add_component("hero").await.unwrap();
    (Arc::new(Mutex::new(session)), page, hero_id)
}

fn stored_headline(store: &MemoryDocumentStore, page: &str) -> String {
    let doc = store.document(PAGES_COLLECTION, page).unwrap();
    doc["components"][0]["content"]["headline"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_coalesce_into_one_write() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (session, page, hero_id) = setup(store.clone()).await;
    let baseline = store.write_attempts();
    let autosave = spawn_autosave(session.clone()).await;

    // Five edits 300ms apart; the last one lands at t=1200ms
    for i in 1..=5 {
        session
            .lock()
            .await
            .update_component(&hero_id, hero(&format!("Headline {}", i)))
            .unwrap();
        sleep(Duration::from_millis(300)).await;
    }

    // t=3000ms: still inside the quiet period of the last edit
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.write_attempts(), baseline);

    // t=4000ms: exactly one write, carrying the final state
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(store.write_attempts(), baseline + 1);
    assert_eq!(stored_headline(&store, &page), "Headline 5");
    assert_eq!(session.lock().await.autosave_state(), AutosaveState::Idle);

    autosave.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_autosave_disables_after_three_failures() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (session, page, hero_id) = setup(store.clone()).await;
    let baseline = store.write_attempts();
    let autosave = spawn_autosave(session.clone()).await;

    store.fail_next_writes(usize::MAX);
    session
        .lock()
        .await
        .update_component(&hero_id, hero("Unsaved"))
        .unwrap();

    // Debounce at 2s, retries 5s apart, then give up
    sleep(Duration::from_secs(2) + Duration::from_millis(100)).await;
    assert_eq!(store.write_attempts(), baseline + 1);
    assert_eq!(session.lock().await.autosave_state(), AutosaveState::RetryPending);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(store.write_attempts(), baseline + 2);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(store.write_attempts(), baseline + 3);

    // Nothing else is attempted, however long we wait
    sleep(Duration::from_secs(120)).await;
    assert_eq!(store.write_attempts(), baseline + 3);

    {
        let guard = session.lock().await;
        assert_eq!(guard.autosave_state(), AutosaveState::Disabled);
        assert!(guard.is_dirty());
        assert_eq!(guard.save_attempt().retry_count, 3);

        let terminal: Vec<_> = guard
            .notifications()
            .iter()
            .filter(|n| n.persistent)
            .collect();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].severity, Severity::Error);
    }

    // A failed manual save leaves autosave off
    assert!(session.lock().await.save_now().await.is_err());
    assert_eq!(session.lock().await.autosave_state(), AutosaveState::Disabled);
    sleep(Duration::from_secs(60)).await;
    assert_eq!(store.write_attempts(), baseline + 4);

    // A successful one re-arms the scheduler and clears the notice
    store.fail_next_writes(0);
    session.lock().await.save_now().await.unwrap();
    assert_eq!(stored_headline(&store, &page), "Unsaved");
    {
        let guard = session.lock().await;
        assert_eq!(guard.autosave_state(), AutosaveState::Idle);
        assert!(guard.notifications().iter().all(|n| !n.persistent));
    }

    autosave.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_undo_waits_for_periodic_autosave() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (session, page, hero_id) = setup(store.clone()).await;
    session
        .lock()
        .await
        .commit_component(&hero_id, hero("Committed"))
        .await
        .unwrap();
    let baseline = store.write_attempts();
    let autosave = spawn_autosave(session.clone()).await;

    assert!(session.lock().await.undo());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(store.write_attempts(), baseline);

    sleep(Duration::from_secs(25)).await;
    assert_eq!(store.write_attempts(), baseline + 1);
    assert_ne!(stored_headline(&store, &page), "Committed");

    autosave.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_save() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (session, _page, hero_id) = setup(store.clone()).await;
    let baseline = store.write_attempts();
    let autosave = spawn_autosave(session.clone()).await;

    session
        .lock()
        .await
        .update_component(&hero_id, hero("Never written"))
        .unwrap();
    autosave.shutdown().await;

    sleep(Duration::from_secs(60)).await;
    assert_eq!(store.write_attempts(), baseline);
    assert!(session.lock().await.is_dirty());
}
