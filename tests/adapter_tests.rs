use greenhouse_planner::adapters::inbound::InMemoryEventStore;
use greenhouse_planner::adapters::outbound::map_files::FilesystemMapStore;
use greenhouse_planner::common::{DomainError, EventEnvelope, EventStore};
use greenhouse_planner::domains::editor::{EditorEvent, EditorMode, GreenhouseEditor, MapStore};
use greenhouse_planner::common::AggregateRoot;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_filesystem_map_store_save_load_list() {
    let dir = tempdir().unwrap();
    let mut base = dir.path().to_path_buf();
    base.push("nested");
    let store = FilesystemMapStore::new(Some(base.clone()));

    // nothing saved yet, directory does not exist
    assert!(store.list_maps().unwrap().is_empty());

    let json = GreenhouseEditor::default().export_map().to_json().unwrap();
    store.save_map("north house", &json).unwrap();
    store.save_map("annex-2", "{}").unwrap();
    fs::write(base.join("notes.txt"), "not a map").unwrap();

    assert_eq!(store.load_map("north house").unwrap(), json);
    assert_eq!(store.list_maps().unwrap(), vec!["annex-2".to_string(), "north house".to_string()]);

    store.save_map("annex-2", "[]").unwrap();
    assert_eq!(store.load_map("annex-2").unwrap(), "[]");
}

#[test]
fn test_filesystem_map_store_rejects_bad_names() {
    let dir = tempdir().unwrap();
    let store = FilesystemMapStore::new(Some(dir.path().to_path_buf()));

    for name in ["", "../escape", ".hidden", "a/b", "semi;colon"] {
        let err = store.save_map(name, "{}").unwrap_err();
        assert!(matches!(err, DomainError::InvalidCommand { .. }), "name {:?}", name);
    }
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn test_filesystem_map_store_missing_map() {
    let dir = tempdir().unwrap();
    let store = FilesystemMapStore::new(Some(dir.path().to_path_buf()));
    assert!(matches!(
        store.load_map("absent").unwrap_err(),
        DomainError::InfrastructureError(_)
    ));
}

fn envelopes(editor: &mut GreenhouseEditor) -> Vec<EventEnvelope> {
    let events = editor.take_uncommitted_events();
    let base = editor.version() - events.len() as u64;
    events
        .iter()
        .enumerate()
        .map(|(i, e)| {
            EventEnvelope::seal(e, GreenhouseEditor::AGGREGATE_TYPE, base + i as u64 + 1, "test").unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_in_memory_event_store_versions() {
    let store = InMemoryEventStore::new();
    let mut editor = GreenhouseEditor::default();
    editor.set_mode(EditorMode::Robot);
    editor.set_mode(EditorMode::Path);
    let id = editor.id.clone();

    store.append_events(&id, 0, envelopes(&mut editor)).await.unwrap();
    assert_eq!(store.stream_len(&id).await, 2);

    editor.set_mode(EditorMode::Zone);
    let next = envelopes(&mut editor);
    let stale = store.append_events(&id, 0, next.clone()).await;
    assert!(stale.is_err());
    assert_eq!(store.stream_len(&id).await, 2);
    store.append_events(&id, 2, next).await.unwrap();

    // sequence numbers must continue the stream
    let mut other = GreenhouseEditor::default();
    other.set_mode(EditorMode::Edit);
    assert!(store.append_events(&id, 3, envelopes(&mut other)).await.is_err());

    let tail = store.load_events(&id, 1).await.unwrap();
    assert_eq!(tail.iter().map(|e| e.sequence).collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(tail[0].payload["ModeChanged"]["mode"], "path");
    let decoded: EditorEvent = tail[1].decode().unwrap();
    assert!(matches!(decoded, EditorEvent::ModeChanged { mode: EditorMode::Zone, .. }));
    assert!(store.load_events("unknown", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_in_memory_event_store_by_type() {
    let store = InMemoryEventStore::new();

    let mut first = GreenhouseEditor::new("first".to_string());
    first.set_mode(EditorMode::Robot);
    first.toggle_dimensions();
    first.reset_all();
    let mut second = GreenhouseEditor::new("second".to_string());
    second.set_mode(EditorMode::Zone);

    store.append_events("first", 0, envelopes(&mut first)).await.unwrap();
    store.append_events("second", 0, envelopes(&mut second)).await.unwrap();

    let modes = store.load_events_by_type("ModeChanged", None).await.unwrap();
    assert_eq!(modes.len(), 2);
    assert!(modes.windows(2).all(|w| w[0].occurred_at <= w[1].occurred_at));

    assert_eq!(
        store.event_types("first").await,
        vec!["ModeChanged".to_string(), "EditorReset".to_string()]
    );

    let future = chrono::Utc::now() + chrono::Duration::hours(1);
    assert!(store.load_events_by_type("ModeChanged", Some(future)).await.unwrap().is_empty());

    assert!(modes.iter().all(|e| e.source == "test"));
}
