use super::aggregate::{GreenhouseEditor, RobotPatch, ZonePatch};
use super::controller::{ActionOutcome, EditorController, EditorSettings, FloorClick};
use super::projections::{SceneProjection, StatusProjection};
use super::shortcuts::KeyInput;
use super::state::{EditorMode, PanelTab};
use crate::common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainResult, EventEnvelope, EventStore,
};
use crate::domains::greenhouse::{GreenhouseConfig, Robot, RobotPosition, WorkZone};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

type Reply<T> = oneshot::Sender<T>;

const JOURNAL_SOURCE: &str = "EditorActor";

/// Everything the editor runtime accepts. Commands are handled strictly in
/// arrival order, interleaved with display frames while playing.
pub enum EditorCommand {
    UpdateConfig { config: GreenhouseConfig, reply: Reply<DomainResult<()>> },
    UpdateSettings { settings: EditorSettings, reply: Reply<DomainResult<()>> },
    SetMode { mode: EditorMode, reply: Reply<()> },
    SelectRobot { robot_id: Option<String>, reply: Reply<()> },
    SelectZone { zone_id: Option<String>, reply: Reply<()> },
    SetActivePanel { panel: PanelTab, reply: Reply<()> },
    ToggleGrid { reply: Reply<bool> },
    ToggleDimensions { reply: Reply<bool> },

    AddRobot { robot: Robot, reply: Reply<DomainResult<String>> },
    UpdateRobot { robot_id: String, patch: RobotPatch, reply: Reply<DomainResult<()>> },
    DragRobot { robot_id: String, x: f64, z: f64, reply: Reply<DomainResult<RobotPosition>> },
    DeleteRobot { robot_id: String, reply: Reply<DomainResult<usize>> },

    AddWaypoint { robot_id: String, x: f64, z: f64, reply: Reply<DomainResult<Option<String>>> },
    DeleteWaypoint { waypoint_id: String, reply: Reply<DomainResult<()>> },
    MoveWaypointUp { waypoint_id: String, reply: Reply<DomainResult<bool>> },
    MoveWaypointDown { waypoint_id: String, reply: Reply<DomainResult<bool>> },
    ClearPath { robot_id: String, reply: Reply<DomainResult<usize>> },

    AddZone { zone: WorkZone, reply: Reply<DomainResult<String>> },
    UpdateZone { zone_id: String, patch: ZonePatch, reply: Reply<DomainResult<()>> },
    ToggleZoneAssignment { zone_id: String, robot_id: String, reply: Reply<DomainResult<bool>> },
    DeleteZone { zone_id: String, reply: Reply<DomainResult<()>> },

    FloorClick { x: f64, z: f64, reply: Reply<DomainResult<FloorClick>> },
    PointerMove { x: f64, z: f64 },
    PointerLeave,
    CancelDrawing { reply: Reply<bool> },
    Key { input: KeyInput, reply: Reply<DomainResult<Option<ActionOutcome>>> },

    SetPlaying { playing: bool, reply: Reply<()> },
    /// Run frames immediately, without waiting for the frame clock.
    AdvanceFrames { count: usize, reply: Reply<usize> },

    ExportJson { reply: Reply<DomainResult<String>> },
    ImportJson { json: String, reply: Reply<DomainResult<()>> },
    ResetAll { reply: Reply<()> },

    Scene { reply: Reply<SceneProjection> },
    Status { reply: Reply<StatusProjection> },
    Snapshot { reply: Reply<GreenhouseEditor> },
    Progress { robot_id: String, reply: Reply<Option<f64>> },

    Shutdown,
}

/// Owns the controller and serialises commands with display frames.
pub struct EditorActor {
    controller: EditorController,
    event_store: Arc<dyn EventStore>,
    receiver: mpsc::Receiver<EditorCommand>,
    /// Editor versions missing from the journal after failed commits.
    journal_gap: u64,
}

impl EditorActor {
    pub fn new(
        controller: EditorController,
        event_store: Arc<dyn EventStore>,
        receiver: mpsc::Receiver<EditorCommand>,
    ) -> Self {
        Self {
            controller,
            event_store,
            receiver,
            journal_gap: 0,
        }
    }

    /// Spawn the actor on the current runtime and return its handle.
    pub fn spawn(
        controller: EditorController,
        event_store: Arc<dyn EventStore>,
        buffer: usize,
    ) -> (EditorCommandActor, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let actor = Self::new(controller, event_store, receiver);
        let handle = tokio::spawn(actor.run());
        (EditorCommandActor::new(sender), handle)
    }

    pub async fn run(mut self) {
        let mut interval_ms = self.controller.settings().frame_interval_ms;
        let mut ticker = frame_clock(interval_ms);
        tracing::info!("Editor actor started ({} ms frames)", interval_ms);

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(EditorCommand::Shutdown) | None => break,
                    Some(command) => {
                        self.handle(command);
                        self.commit().await;
                    }
                },
                _ = ticker.tick(), if self.controller.is_playing() => {
                    self.controller.frame();
                }
            }

            if self.controller.settings().frame_interval_ms != interval_ms {
                interval_ms = self.controller.settings().frame_interval_ms;
                ticker = frame_clock(interval_ms);
            }
        }

        self.controller.set_playing(false);
        self.commit().await;
        tracing::info!("Editor actor stopped");
    }

    fn handle(&mut self, command: EditorCommand) {
        let c = &mut self.controller;
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            EditorCommand::UpdateConfig { config, reply } => {
                let _ = reply.send(c.edit(|e| e.update_config(config)));
            }
            EditorCommand::UpdateSettings { settings, reply } => {
                let _ = reply.send(c.update_settings(settings));
            }
            EditorCommand::SetMode { mode, reply } => {
                c.set_mode(mode);
                let _ = reply.send(());
            }
            EditorCommand::SelectRobot { robot_id, reply } => {
                let _ = c.edit(|e| {
                    e.select_robot(robot_id);
                    Ok(())
                });
                let _ = reply.send(());
            }
            EditorCommand::SelectZone { zone_id, reply } => {
                let _ = c.edit(|e| {
                    e.select_zone(zone_id);
                    Ok(())
                });
                let _ = reply.send(());
            }
            EditorCommand::SetActivePanel { panel, reply } => {
                let _ = c.edit(|e| {
                    e.set_active_panel(panel);
                    Ok(())
                });
                let _ = reply.send(());
            }
            EditorCommand::ToggleGrid { reply } => {
                let shown = c.edit(|e| {
                    e.toggle_grid();
                    Ok(e.ui.show_grid)
                });
                let _ = reply.send(shown.unwrap_or_default());
            }
            EditorCommand::ToggleDimensions { reply } => {
                let shown = c.edit(|e| {
                    e.toggle_dimensions();
                    Ok(e.ui.show_dimensions)
                });
                let _ = reply.send(shown.unwrap_or_default());
            }
            EditorCommand::AddRobot { robot, reply } => {
                let _ = reply.send(c.edit(|e| e.add_robot(robot)));
            }
            EditorCommand::UpdateRobot { robot_id, patch, reply } => {
                let _ = reply.send(c.edit(|e| e.update_robot(&robot_id, patch)));
            }
            EditorCommand::DragRobot { robot_id, x, z, reply } => {
                let _ = reply.send(c.edit(|e| e.drag_robot(&robot_id, x, z)));
            }
            EditorCommand::DeleteRobot { robot_id, reply } => {
                let _ = reply.send(c.delete_robot(&robot_id));
            }
            EditorCommand::AddWaypoint { robot_id, x, z, reply } => {
                let _ = reply.send(c.edit(|e| e.add_waypoint(&robot_id, x, z)));
            }
            EditorCommand::DeleteWaypoint { waypoint_id, reply } => {
                let _ = reply.send(c.edit(|e| e.delete_waypoint(&waypoint_id)));
            }
            EditorCommand::MoveWaypointUp { waypoint_id, reply } => {
                let _ = reply.send(c.edit(|e| e.move_waypoint_up(&waypoint_id)));
            }
            EditorCommand::MoveWaypointDown { waypoint_id, reply } => {
                let _ = reply.send(c.edit(|e| e.move_waypoint_down(&waypoint_id)));
            }
            EditorCommand::ClearPath { robot_id, reply } => {
                let _ = reply.send(c.edit(|e| e.clear_path(&robot_id)));
            }
            EditorCommand::AddZone { zone, reply } => {
                let _ = reply.send(c.edit(|e| e.add_zone(zone)));
            }
            EditorCommand::UpdateZone { zone_id, patch, reply } => {
                let _ = reply.send(c.edit(|e| e.update_zone(&zone_id, patch)));
            }
            EditorCommand::ToggleZoneAssignment { zone_id, robot_id, reply } => {
                let _ = reply.send(c.edit(|e| e.toggle_zone_assignment(&zone_id, &robot_id)));
            }
            EditorCommand::DeleteZone { zone_id, reply } => {
                let _ = reply.send(c.edit(|e| e.delete_zone(&zone_id)));
            }
            EditorCommand::FloorClick { x, z, reply } => {
                let _ = reply.send(c.floor_click(x, z));
            }
            EditorCommand::PointerMove { x, z } => c.pointer_move(x, z),
            EditorCommand::PointerLeave => c.pointer_leave(),
            EditorCommand::CancelDrawing { reply } => {
                let _ = reply.send(c.cancel_drawing());
            }
            EditorCommand::Key { input, reply } => {
                let _ = reply.send(c.handle_key(&input));
            }
            EditorCommand::SetPlaying { playing, reply } => {
                c.set_playing(playing);
                let _ = reply.send(());
            }
            EditorCommand::AdvanceFrames { count, reply } => {
                let moved: usize = (0..count).map(|_| c.frame()).sum();
                let _ = reply.send(moved);
            }
            EditorCommand::ExportJson { reply } => {
                let _ = reply.send(c.export_json());
            }
            EditorCommand::ImportJson { json, reply } => {
                let _ = reply.send(c.import_json(&json));
            }
            EditorCommand::ResetAll { reply } => {
                c.reset_all();
                let _ = reply.send(());
            }
            EditorCommand::Scene { reply } => {
                let _ = reply.send(c.scene());
            }
            EditorCommand::Status { reply } => {
                let _ = reply.send(c.status());
            }
            EditorCommand::Snapshot { reply } => {
                let _ = reply.send(c.editor().clone());
            }
            EditorCommand::Progress { robot_id, reply } => {
                let _ = reply.send(c.progress_of(&robot_id));
            }
            EditorCommand::Shutdown => {}
        }
    }

    /// Persist pending events. Failures are logged; the editor keeps going.
    async fn commit(&mut self) {
        let events = self.controller.take_uncommitted_events();
        if events.is_empty() {
            return;
        }

        let editor = self.controller.editor();
        let aggregate_id = editor.aggregate_id().to_string();
        let local_base = editor.version().saturating_sub(events.len() as u64);

        // Continue from what the journal actually holds, so one lost batch
        // does not fail every later append.
        let expected_version = match self.event_store.stream_version(&aggregate_id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Failed to read editor journal version: {}", e);
                return;
            }
        };
        let gap = local_base.saturating_sub(expected_version);
        if gap != self.journal_gap {
            tracing::warn!(
                "Editor journal is {} events behind the editor, continuing at {}",
                gap,
                expected_version
            );
            self.journal_gap = gap;
        }

        let mut envelopes = Vec::with_capacity(events.len());
        for (offset, event) in events.iter().enumerate() {
            let sequence = expected_version + offset as u64 + 1;
            match EventEnvelope::seal(event, GreenhouseEditor::AGGREGATE_TYPE, sequence, JOURNAL_SOURCE) {
                Ok(envelope) => envelopes.push(envelope),
                Err(e) => {
                    tracing::error!("Failed to serialize editor event: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = self
            .event_store
            .append_events(&aggregate_id, expected_version, envelopes)
            .await
        {
            tracing::error!("Failed to append editor events: {}", e);
        } else {
            tracing::debug!("Committed {} editor events", events.len());
        }
    }
}

fn frame_clock(interval_ms: u64) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Cloneable handle for sending commands to a running [`EditorActor`].
#[derive(Clone)]
pub struct EditorCommandActor {
    sender: mpsc::Sender<EditorCommand>,
}

impl EditorCommandActor {
    pub fn new(sender: mpsc::Sender<EditorCommand>) -> Self {
        Self { sender }
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> EditorCommand) -> ApplicationResult<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|e| ApplicationError::Runtime(format!("Failed to send command: {}", e)))?;
        response
            .await
            .map_err(|e| ApplicationError::Runtime(format!("Editor dropped the reply: {}", e)))
    }

    async fn notify(&self, command: EditorCommand) -> ApplicationResult<()> {
        self.sender
            .send(command)
            .await
            .map_err(|e| ApplicationError::Runtime(format!("Failed to send command: {}", e)))
    }

    pub async fn update_config(&self, config: GreenhouseConfig) -> ApplicationResult<()> {
        Ok(self.request(|reply| EditorCommand::UpdateConfig { config, reply }).await??)
    }

    pub async fn update_settings(&self, settings: EditorSettings) -> ApplicationResult<()> {
        Ok(self.request(|reply| EditorCommand::UpdateSettings { settings, reply }).await??)
    }

    pub async fn set_mode(&self, mode: EditorMode) -> ApplicationResult<()> {
        self.request(|reply| EditorCommand::SetMode { mode, reply }).await
    }

    pub async fn select_robot(&self, robot_id: Option<String>) -> ApplicationResult<()> {
        self.request(|reply| EditorCommand::SelectRobot { robot_id, reply }).await
    }

    pub async fn select_zone(&self, zone_id: Option<String>) -> ApplicationResult<()> {
        self.request(|reply| EditorCommand::SelectZone { zone_id, reply }).await
    }

    pub async fn set_active_panel(&self, panel: PanelTab) -> ApplicationResult<()> {
        self.request(|reply| EditorCommand::SetActivePanel { panel, reply }).await
    }

    pub async fn toggle_grid(&self) -> ApplicationResult<bool> {
        self.request(|reply| EditorCommand::ToggleGrid { reply }).await
    }

    pub async fn toggle_dimensions(&self) -> ApplicationResult<bool> {
        self.request(|reply| EditorCommand::ToggleDimensions { reply }).await
    }

    pub async fn add_robot(&self, robot: Robot) -> ApplicationResult<String> {
        Ok(self.request(|reply| EditorCommand::AddRobot { robot, reply }).await??)
    }

    pub async fn update_robot(&self, robot_id: &str, patch: RobotPatch) -> ApplicationResult<()> {
        let robot_id = robot_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::UpdateRobot { robot_id, patch, reply })
            .await??)
    }

    pub async fn drag_robot(&self, robot_id: &str, x: f64, z: f64) -> ApplicationResult<RobotPosition> {
        let robot_id = robot_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::DragRobot { robot_id, x, z, reply })
            .await??)
    }

    pub async fn delete_robot(&self, robot_id: &str) -> ApplicationResult<usize> {
        let robot_id = robot_id.to_string();
        Ok(self.request(|reply| EditorCommand::DeleteRobot { robot_id, reply }).await??)
    }

    pub async fn add_waypoint(&self, robot_id: &str, x: f64, z: f64) -> ApplicationResult<Option<String>> {
        let robot_id = robot_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::AddWaypoint { robot_id, x, z, reply })
            .await??)
    }

    pub async fn delete_waypoint(&self, waypoint_id: &str) -> ApplicationResult<()> {
        let waypoint_id = waypoint_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::DeleteWaypoint { waypoint_id, reply })
            .await??)
    }

    pub async fn move_waypoint_up(&self, waypoint_id: &str) -> ApplicationResult<bool> {
        let waypoint_id = waypoint_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::MoveWaypointUp { waypoint_id, reply })
            .await??)
    }

    pub async fn move_waypoint_down(&self, waypoint_id: &str) -> ApplicationResult<bool> {
        let waypoint_id = waypoint_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::MoveWaypointDown { waypoint_id, reply })
            .await??)
    }

    pub async fn clear_path(&self, robot_id: &str) -> ApplicationResult<usize> {
        let robot_id = robot_id.to_string();
        Ok(self.request(|reply| EditorCommand::ClearPath { robot_id, reply }).await??)
    }

    pub async fn add_zone(&self, zone: WorkZone) -> ApplicationResult<String> {
        Ok(self.request(|reply| EditorCommand::AddZone { zone, reply }).await??)
    }

    pub async fn update_zone(&self, zone_id: &str, patch: ZonePatch) -> ApplicationResult<()> {
        let zone_id = zone_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::UpdateZone { zone_id, patch, reply })
            .await??)
    }

    pub async fn toggle_zone_assignment(&self, zone_id: &str, robot_id: &str) -> ApplicationResult<bool> {
        let zone_id = zone_id.to_string();
        let robot_id = robot_id.to_string();
        Ok(self
            .request(|reply| EditorCommand::ToggleZoneAssignment { zone_id, robot_id, reply })
            .await??)
    }

    pub async fn delete_zone(&self, zone_id: &str) -> ApplicationResult<()> {
        let zone_id = zone_id.to_string();
        Ok(self.request(|reply| EditorCommand::DeleteZone { zone_id, reply }).await??)
    }

    pub async fn floor_click(&self, x: f64, z: f64) -> ApplicationResult<FloorClick> {
        Ok(self.request(|reply| EditorCommand::FloorClick { x, z, reply }).await??)
    }

    pub async fn pointer_move(&self, x: f64, z: f64) -> ApplicationResult<()> {
        self.notify(EditorCommand::PointerMove { x, z }).await
    }

    pub async fn pointer_leave(&self) -> ApplicationResult<()> {
        self.notify(EditorCommand::PointerLeave).await
    }

    pub async fn cancel_drawing(&self) -> ApplicationResult<bool> {
        self.request(|reply| EditorCommand::CancelDrawing { reply }).await
    }

    pub async fn key(&self, input: KeyInput) -> ApplicationResult<Option<ActionOutcome>> {
        Ok(self.request(|reply| EditorCommand::Key { input, reply }).await??)
    }

    pub async fn set_playing(&self, playing: bool) -> ApplicationResult<()> {
        self.request(|reply| EditorCommand::SetPlaying { playing, reply }).await
    }

    pub async fn advance_frames(&self, count: usize) -> ApplicationResult<usize> {
        self.request(|reply| EditorCommand::AdvanceFrames { count, reply }).await
    }

    pub async fn export_json(&self) -> ApplicationResult<String> {
        Ok(self.request(|reply| EditorCommand::ExportJson { reply }).await??)
    }

    pub async fn import_json(&self, json: String) -> ApplicationResult<()> {
        Ok(self.request(|reply| EditorCommand::ImportJson { json, reply }).await??)
    }

    pub async fn reset_all(&self) -> ApplicationResult<()> {
        self.request(|reply| EditorCommand::ResetAll { reply }).await
    }

    pub async fn scene(&self) -> ApplicationResult<SceneProjection> {
        self.request(|reply| EditorCommand::Scene { reply }).await
    }

    pub async fn status(&self) -> ApplicationResult<StatusProjection> {
        self.request(|reply| EditorCommand::Status { reply }).await
    }

    pub async fn snapshot(&self) -> ApplicationResult<GreenhouseEditor> {
        self.request(|reply| EditorCommand::Snapshot { reply }).await
    }

    pub async fn progress(&self, robot_id: &str) -> ApplicationResult<Option<f64>> {
        let robot_id = robot_id.to_string();
        self.request(|reply| EditorCommand::Progress { robot_id, reply }).await
    }

    pub async fn shutdown(&self) -> ApplicationResult<()> {
        self.notify(EditorCommand::Shutdown).await
    }
}
