use crate::common::{ApplicationError, ApplicationResult, EventEnvelope, EventStore};
use crate::config::Config;
use crate::domains::editor::{
    EditorActor, EditorCommandActor, EditorController, EditorEvent, GreenhouseEditor, MapStore,
    DEFAULT_EDITOR_ID,
};
use crate::domains::logger::DynLogger;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Entry point for hosts: runs the editor actor and connects it to map storage
/// and the event journal.
pub struct EditorService {
    commands: EditorCommandActor,
    map_store: Arc<dyn MapStore>,
    event_store: Arc<dyn EventStore>,
    editor_id: String,
}

impl EditorService {
    pub fn new(
        commands: EditorCommandActor,
        map_store: Arc<dyn MapStore>,
        event_store: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            commands,
            map_store,
            event_store,
            editor_id: DEFAULT_EDITOR_ID.to_string(),
        }
    }

    /// Build the editor from configuration and spawn its actor.
    pub fn start(
        config: &Config,
        logger: DynLogger,
        map_store: Arc<dyn MapStore>,
        event_store: Arc<dyn EventStore>,
    ) -> (Self, JoinHandle<()>) {
        let editor = GreenhouseEditor::with_config(DEFAULT_EDITOR_ID.to_string(), config.greenhouse);
        let controller = EditorController::new(editor, config.editor.clone(), logger);
        let (commands, handle) =
            EditorActor::spawn(controller, event_store.clone(), config.storage.command_buffer);
        (Self::new(commands, map_store, event_store), handle)
    }

    pub fn commands(&self) -> &EditorCommandActor {
        &self.commands
    }

    /// Export the current map and store it under `name`.
    pub async fn save_map(&self, name: &str) -> ApplicationResult<()> {
        let json = self.commands.export_json().await?;
        self.map_store.save_map(name, &json)?;
        tracing::info!("Saved map {}", name);
        Ok(())
    }

    /// Load a stored map into the editor. A bad file leaves the editor as it was.
    pub async fn load_map(&self, name: &str) -> ApplicationResult<()> {
        let json = self.map_store.load_map(name)?;
        self.commands.import_json(json).await?;
        tracing::info!("Loaded map {}", name);
        Ok(())
    }

    pub fn list_maps(&self) -> ApplicationResult<Vec<String>> {
        Ok(self.map_store.list_maps()?)
    }

    /// Journalled editor changes after sequence `after`, oldest first.
    pub async fn journal(&self, after: u64) -> ApplicationResult<Vec<EventEnvelope>> {
        self.event_store
            .load_events(&self.editor_id, after)
            .await
            .map_err(ApplicationError::EventStore)
    }

    /// Same as [`journal`](Self::journal), decoded back into editor events.
    pub async fn history(&self, after: u64) -> ApplicationResult<Vec<EditorEvent>> {
        self.journal(after)
            .await?
            .iter()
            .map(|envelope| envelope.decode::<EditorEvent>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApplicationError::Domain(e.into()))
    }

    pub async fn shutdown(&self) -> ApplicationResult<()> {
        self.commands.shutdown().await
    }
}
