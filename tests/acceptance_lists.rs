use std::path::Path;

use solo_dilo::application::{focus::FieldTarget, gesture::{GestureAction, GestureConfig, SwipeTracker}, ListSession};
use solo_dilo::domain::{
    repository::{ListStore, PreferenceStore},
    settings::DrawerPosition,
    speech::{RecognitionEvent, RecognitionEventKind, RecognizerConfig, SessionId, SpeechRecognizer},
    todo_list::{ListId, Task},
};
use solo_dilo::infrastructure::{json_preferences::JsonPreferences, speech::NoSpeechRecognizer, sqlite_store::SqliteListStore};

/// Stands in for the platform: accepts every start and stop.
struct Microphone;

impl SpeechRecognizer for Microphone {
    fn is_available(&self) -> bool { true }
    fn start(&mut self, _session: SessionId, _config: &RecognizerConfig) -> anyhow::Result<()> { Ok(()) }
    fn stop(&mut self, _session: SessionId) -> anyhow::Result<()> { Ok(()) }
}

fn open_app<R: SpeechRecognizer>(store: &SqliteListStore, prefs: &Path, recognizer: R) -> ListSession<SqliteListStore, JsonPreferences, R> {
    ListSession::new(store.clone(), JsonPreferences::open(prefs), recognizer, RecognizerConfig::default())
}

async fn memory_store() -> SqliteListStore { SqliteListStore::connect("sqlite::memory:").await.unwrap() }

#[tokio::test]
async fn acceptance_groceries_scenario() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_app(&store, &dir.path().join("prefs.json"), NoSpeechRecognizer);

    let id = session.create_list("groceries").await.unwrap();
    assert_eq!(id, ListId(1));
    session.add_task(Some("milk")).await.unwrap();
    session.add_task(Some("eggs")).await.unwrap();

    let stored = store.get(id).await.unwrap();
    assert_eq!(stored.id, Some(ListId(1)));
    assert_eq!(stored.title, "Groceries");
    assert_eq!(stored.tasks, vec![Task::new("Milk"), Task::new("Eggs")]);
    assert_eq!(session.current_list(), Some(&stored));

    // toggle then delete the first task: the second one moves up untouched
    session.toggle_task_complete(0).await.unwrap();
    session.delete_task(0).await.unwrap();
    let stored = store.get(id).await.unwrap();
    assert_eq!(stored.tasks, vec![Task::new("Eggs")]);
}

#[tokio::test]
async fn acceptance_dictation_scenario() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_app(&store, &dir.path().join("prefs.json"), Microphone);
    let id = session.create_list("errands").await.unwrap();
    session.add_task(None).await.unwrap();
    let before = store.get(id).await.unwrap().last_modified;

    session.start_dictation(FieldTarget::Task(0)).await.unwrap();
    let live = session.dictation().session().unwrap();
    session.handle_dictation_event(RecognitionEvent::new(live, RecognitionEventKind::Interim("buy milk".into()))).await.unwrap();
    assert_eq!(store.get(id).await.unwrap().tasks[0].text, "New task");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    session.handle_dictation_event(RecognitionEvent::new(live, RecognitionEventKind::Final("buy milk please".into()))).await.unwrap();
    session.handle_dictation_event(RecognitionEvent::new(live, RecognitionEventKind::End)).await.unwrap();
    session.commit_task_edit(0).await.unwrap();

    let stored = store.get(id).await.unwrap();
    assert_eq!(stored.tasks[0].text, "Buy milk please");
    assert!(stored.last_modified > before);
}

#[tokio::test]
async fn acceptance_deleting_active_list_forgets_it_across_restarts() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let prefs = dir.path().join("prefs.json");

    let id = {
        let mut session = open_app(&store, &prefs, NoSpeechRecognizer);
        let keep = session.create_list("keep").await.unwrap();
        let doomed = session.create_list("doomed").await.unwrap();
        assert_eq!(JsonPreferences::open(&prefs).active_list_id(), Some(doomed));
        session.delete_list(doomed).await.unwrap();
        assert!(session.current_list().is_none());
        assert_eq!(session.active_list_id(), None);
        keep
    };

    assert_eq!(JsonPreferences::open(&prefs).active_list_id(), None);
    let mut reopened = open_app(&store, &prefs, NoSpeechRecognizer);
    assert_eq!(reopened.restore_active_list().await.unwrap(), None);
    assert!(reopened.current_list().is_none());
    assert_eq!(reopened.lists().await.unwrap().len(), 1);

    reopened.open_list(id).await.unwrap();
    let mut again = open_app(&store, &prefs, NoSpeechRecognizer);
    assert_eq!(again.restore_active_list().await.unwrap(), Some(id));
    assert_eq!(again.current_list().unwrap().title, "Keep");
}

#[tokio::test]
async fn acceptance_cancel_rolls_back_stored_record() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_app(&store, &dir.path().join("prefs.json"), NoSpeechRecognizer);
    let id = session.create_list("chores").await.unwrap();

    session.start_title_edit().await.unwrap();
    session.edit_title_text("house").await.unwrap();
    assert_eq!(store.get(id).await.unwrap().title, "House");
    session.cancel_title_edit().await.unwrap();

    assert_eq!(store.get(id).await.unwrap().title, "Chores");
    assert_eq!(session.current_list().unwrap().title, "Chores");
}

#[tokio::test]
async fn acceptance_swipe_past_threshold_toggles_once() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_app(&store, &dir.path().join("prefs.json"), NoSpeechRecognizer);
    let id = session.create_list("chores").await.unwrap();
    session.add_task(Some("sweep")).await.unwrap();
    session.add_task(Some("mop")).await.unwrap();

    let config = GestureConfig::default();
    let mut swipe = SwipeTracker::new(config);
    let now = std::time::Instant::now();

    swipe.press(0, 0.0, now);
    let (row, action) = swipe.release(config.swipe_threshold).unwrap();
    assert_eq!(action, GestureAction::SnapBack);
    session.apply_gesture(row, action).await.unwrap();

    swipe.press(0, 0.0, now);
    let (row, action) = swipe.release(config.swipe_threshold + 1.0).unwrap();
    session.apply_gesture(row, action).await.unwrap();

    let stored = store.get(id).await.unwrap();
    assert_eq!(stored.tasks.len(), 2);
    assert!(stored.tasks[0].completed);
    assert!(!stored.tasks[1].completed);
}

#[tokio::test]
async fn acceptance_settings_persist_between_runs() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let prefs = dir.path().join("prefs.json");

    let mut session = open_app(&store, &prefs, NoSpeechRecognizer);
    assert_eq!(session.settings().drawer_position, DrawerPosition::Right);
    session.set_drawer_position(DrawerPosition::Left);

    let reopened = open_app(&store, &prefs, NoSpeechRecognizer);
    assert_eq!(reopened.settings().drawer_position, DrawerPosition::Left);
}
