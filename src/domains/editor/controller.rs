use super::aggregate::{GreenhouseEditor, PLACEMENT_HEIGHT};
use super::events::EditorEvent;
use super::map_data::MapData;
use super::projections::{SceneProjection, StatusProjection};
use super::shortcuts::{dispatch_key, EditorAction, KeyInput};
use super::state::EditorMode;
use crate::common::{AggregateRoot, DomainError, DomainResult};
use crate::domains::greenhouse::RobotPosition;
use crate::domains::logger::DynLogger;
use crate::domains::path_curve::CurveSettings;
use crate::domains::simulation::{PathSimulator, DEFAULT_STEP_SIZE};
use crate::domains::zone_drawing::{ClickOutcome, ZoneDrawing, DEFAULT_CLOSE_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Tunables for interaction, curve display and simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub close_threshold: f64,
    /// Segments advanced per frame. Speed is tied to the frame rate.
    pub step_size: f64,
    pub frame_interval_ms: u64,
    pub path_lift: f64,
    pub curve_samples: usize,
    pub max_arrows: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            close_threshold: DEFAULT_CLOSE_THRESHOLD,
            step_size: DEFAULT_STEP_SIZE,
            frame_interval_ms: 16,
            path_lift: 0.5,
            curve_samples: 50,
            max_arrows: 5,
        }
    }
}

impl EditorSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.close_threshold.is_finite() || self.close_threshold <= 0.0 {
            return Err(format!("close_threshold must be positive, got {}", self.close_threshold));
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(format!("step_size must be positive, got {}", self.step_size));
        }
        if self.frame_interval_ms == 0 {
            return Err("frame_interval_ms must be at least 1".to_string());
        }
        if !self.path_lift.is_finite() {
            return Err("path_lift must be finite".to_string());
        }
        if self.curve_samples == 0 {
            return Err("curve_samples must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn curve(&self) -> CurveSettings {
        CurveSettings {
            lift: self.path_lift,
            samples: self.curve_samples,
            max_arrows: self.max_arrows,
        }
    }
}

/// What a floor click did, depending on the editor mode.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorClick {
    Ignored,
    RobotPlaced(String),
    WaypointAdded(String),
    ZonePointAdded { count: usize },
    ZoneStarted,
    ZoneCreated(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied(EditorAction),
    Exported(String),
    ImportRequested,
}

/// The editor aggregate together with its interaction session and simulator.
///
/// Every change to the model goes through here so that the drawing session
/// and the simulator's per-robot progress stay consistent with it.
pub struct EditorController {
    editor: GreenhouseEditor,
    drawing: ZoneDrawing,
    simulator: PathSimulator,
    waypoint_preview: Option<RobotPosition>,
    settings: EditorSettings,
    logger: DynLogger,
}

impl EditorController {
    pub fn new(editor: GreenhouseEditor, settings: EditorSettings, logger: DynLogger) -> Self {
        Self {
            drawing: ZoneDrawing::new(settings.close_threshold),
            simulator: PathSimulator::new(settings.step_size),
            editor,
            waypoint_preview: None,
            settings,
            logger,
        }
    }

    pub fn editor(&self) -> &GreenhouseEditor {
        &self.editor
    }

    pub fn drawing(&self) -> &ZoneDrawing {
        &self.drawing
    }

    pub fn simulator(&self) -> &PathSimulator {
        &self.simulator
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn is_playing(&self) -> bool {
        self.editor.ui.is_playing
    }

    /// Run a mutation against the aggregate. Progress of robots that no
    /// longer exist is dropped afterwards.
    pub fn edit<T, F>(&mut self, f: F) -> DomainResult<T>
    where
        F: FnOnce(&mut GreenhouseEditor) -> DomainResult<T>,
    {
        let result = f(&mut self.editor);
        self.sync_simulator();
        if let Err(e) = &result {
            self.logger.warn(&format!("Editor command rejected: {}", e));
        }
        result
    }

    pub fn take_uncommitted_events(&mut self) -> Vec<EditorEvent> {
        self.editor.take_uncommitted_events()
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        if self.editor.ui.mode == EditorMode::Zone && mode != EditorMode::Zone && self.drawing.cancel() {
            self.logger.info("Zone drawing cancelled by mode change");
        }
        if mode != EditorMode::Path {
            self.waypoint_preview = None;
        }
        self.editor.set_mode(mode);
    }

    pub fn floor_click(&mut self, x: f64, z: f64) -> DomainResult<FloorClick> {
        match self.editor.ui.mode {
            EditorMode::Robot => Ok(self
                .edit(|editor| editor.place_robot(x, z))?
                .map_or(FloorClick::Ignored, FloorClick::RobotPlaced)),
            EditorMode::Path => Ok(self
                .edit(|editor| editor.add_waypoint_for_selected(x, z))?
                .map_or(FloorClick::Ignored, FloorClick::WaypointAdded)),
            EditorMode::Zone => match self.drawing.floor_click(x, z, &self.editor.config) {
                ClickOutcome::Ignored => Ok(FloorClick::Ignored),
                ClickOutcome::Started => Ok(FloorClick::ZoneStarted),
                ClickOutcome::PointAdded { count } => Ok(FloorClick::ZonePointAdded { count }),
                ClickOutcome::Closed { points } => {
                    let zone_id = self.edit(|editor| editor.create_zone_from_points(points))?;
                    self.logger.info(&format!("Zone {} created", zone_id));
                    Ok(FloorClick::ZoneCreated(zone_id))
                }
            },
            EditorMode::View | EditorMode::Edit => Ok(FloorClick::Ignored),
        }
    }

    pub fn pointer_move(&mut self, x: f64, z: f64) {
        match self.editor.ui.mode {
            EditorMode::Zone => self.drawing.pointer_move(x, z, &self.editor.config),
            EditorMode::Path if self.editor.selected_robot().is_some() => {
                let point = RobotPosition::new(x, PLACEMENT_HEIGHT, z);
                self.waypoint_preview = self.editor.config.contains(&point).then_some(point);
            }
            _ => self.waypoint_preview = None,
        }
    }

    pub fn pointer_leave(&mut self) {
        self.drawing.pointer_leave();
        self.waypoint_preview = None;
    }

    pub fn cancel_drawing(&mut self) -> bool {
        self.drawing.cancel()
    }

    pub fn delete_robot(&mut self, robot_id: &str) -> DomainResult<usize> {
        let removed = self.edit(|editor| editor.delete_robot(robot_id))?;
        self.simulator.forget(robot_id);
        Ok(removed)
    }

    pub fn set_playing(&mut self, playing: bool) {
        let was_playing = self.editor.ui.is_playing;
        if playing {
            self.editor.start_simulation(&mut self.simulator);
            if !was_playing {
                self.logger.info("Simulation started");
            }
        } else {
            self.editor.stop_simulation(&mut self.simulator);
            if was_playing {
                self.logger.info("Simulation stopped");
            }
        }
    }

    /// One display frame. Does nothing unless playback is on.
    pub fn frame(&mut self) -> usize {
        if !self.editor.ui.is_playing {
            return 0;
        }
        self.editor.simulation_frame(&mut self.simulator)
    }

    pub fn progress_of(&self, robot_id: &str) -> Option<f64> {
        self.simulator.progress_of(robot_id)
    }

    pub fn export_map(&self) -> MapData {
        self.editor.export_map()
    }

    pub fn export_json(&self) -> DomainResult<String> {
        self.editor.export_map().to_json()
    }

    /// Replace the model from a snapshot. On error nothing changes.
    pub fn import_json(&mut self, json: &str) -> DomainResult<()> {
        let data = match MapData::from_json(json) {
            Ok(data) => data,
            Err(e) => {
                self.logger.error(&format!("Map import failed: {}", e));
                return Err(e);
            }
        };
        self.load_map(data)
    }

    pub fn load_map(&mut self, data: MapData) -> DomainResult<()> {
        if let Err(e) = data.validate() {
            self.logger.error(&format!("Map rejected: {}", e));
            return Err(e);
        }
        self.stop_for_replace();
        self.edit(|editor| editor.load_map_data(data))?;
        self.logger.info(&format!(
            "Map loaded: {} robots, {} waypoints, {} zones",
            self.editor.robots.len(),
            self.editor.waypoints.len(),
            self.editor.zones.len()
        ));
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.stop_for_replace();
        self.editor.reset_all();
        self.simulator.reset();
        self.logger.info("Editor reset");
    }

    pub fn update_settings(&mut self, settings: EditorSettings) -> DomainResult<()> {
        if let Err(reason) = settings.validate() {
            self.logger.warn(&format!("Editor settings rejected: {}", reason));
            return Err(DomainError::invalid(reason));
        }
        self.drawing.set_close_threshold(settings.close_threshold);
        self.simulator.set_step_size(settings.step_size);
        self.settings = settings;
        Ok(())
    }

    pub fn handle_key(&mut self, input: &KeyInput) -> DomainResult<Option<ActionOutcome>> {
        match dispatch_key(input, &self.editor.ui) {
            Some(action) => self.apply_action(action).map(Some),
            None => Ok(None),
        }
    }

    pub fn apply_action(&mut self, action: EditorAction) -> DomainResult<ActionOutcome> {
        match &action {
            EditorAction::SetMode(mode) => self.set_mode(*mode),
            EditorAction::DeleteRobot(robot_id) => {
                self.delete_robot(robot_id)?;
            }
            EditorAction::DeleteZone(zone_id) => {
                self.edit(|editor| editor.delete_zone(zone_id))?;
            }
            EditorAction::TogglePlayback => {
                let playing = self.editor.ui.is_playing;
                self.set_playing(!playing);
            }
            EditorAction::Escape => {
                if !self.drawing.cancel() {
                    self.editor.clear_selection();
                }
            }
            EditorAction::Export => return self.export_json().map(ActionOutcome::Exported),
            EditorAction::RequestImport => return Ok(ActionOutcome::ImportRequested),
        }
        Ok(ActionOutcome::Applied(action))
    }

    pub fn scene(&self) -> SceneProjection {
        SceneProjection::build(
            &self.editor,
            &self.drawing,
            self.waypoint_preview,
            &self.settings.curve(),
        )
    }

    pub fn status(&self) -> StatusProjection {
        StatusProjection::from_editor(&self.editor)
    }

    fn stop_for_replace(&mut self) {
        if self.editor.ui.is_playing || self.simulator.is_running() {
            self.editor.stop_simulation(&mut self.simulator);
        }
        self.drawing.cancel();
        self.waypoint_preview = None;
    }

    fn sync_simulator(&mut self) {
        let ids = self.editor.robots.iter().map(|r| r.id.as_str());
        self.simulator.retain_robots(ids);
    }
}
