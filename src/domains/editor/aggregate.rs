use super::events::EditorEvent;
use super::map_data::MapData;
use super::state::{EditorMode, EditorUiState, PanelTab};
use crate::common::{AggregateRoot, DomainError, DomainResult};
use crate::domains::greenhouse::{
    ordered_waypoints, GreenhouseConfig, Robot, RobotPosition, RobotStatus, Waypoint, WorkZone,
};
use crate::domains::path_curve::{curve_for, CurveSettings, PathGeometry};
use crate::domains::simulation::{PathSimulator, RobotTransform};
use crate::domains::zone_drawing::zone_color;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EDITOR_ID: &str = "greenhouse-editor";

/// Height at which robots and waypoints are placed on the floor.
pub const PLACEMENT_HEIGHT: f64 = 0.5;

/// Partial robot edit from the properties panel. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotPatch {
    pub name: Option<String>,
    pub position: Option<RobotPosition>,
    pub rotation: Option<f64>,
    pub robot_type: Option<String>,
    pub status: Option<RobotStatus>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub points: Option<Vec<RobotPosition>>,
}

/// The single owner of the spatial model and editor UI state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreenhouseEditor {
    pub id: String,
    pub config: GreenhouseConfig,
    pub robots: Vec<Robot>,
    pub waypoints: Vec<Waypoint>,
    pub zones: Vec<WorkZone>,
    pub ui: EditorUiState,
    pub version: u64,
    #[serde(skip)]
    uncommitted_events: Vec<EditorEvent>,
}

impl Default for GreenhouseEditor {
    fn default() -> Self {
        Self::new(DEFAULT_EDITOR_ID.to_string())
    }
}

impl GreenhouseEditor {
    pub fn new(id: String) -> Self {
        Self::with_config(id, GreenhouseConfig::default())
    }

    pub fn with_config(id: String, config: GreenhouseConfig) -> Self {
        Self {
            id,
            config,
            robots: Vec::new(),
            waypoints: Vec::new(),
            zones: Vec::new(),
            ui: EditorUiState::default(),
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    // --- queries -------------------------------------------------------

    pub fn robot(&self, robot_id: &str) -> Option<&Robot> {
        self.robots.iter().find(|r| r.id == robot_id)
    }

    pub fn zone(&self, zone_id: &str) -> Option<&WorkZone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    pub fn waypoint(&self, waypoint_id: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == waypoint_id)
    }

    pub fn selected_robot(&self) -> Option<&Robot> {
        self.ui.selected_robot_id.as_deref().and_then(|id| self.robot(id))
    }

    pub fn selected_zone(&self) -> Option<&WorkZone> {
        self.ui.selected_zone_id.as_deref().and_then(|id| self.zone(id))
    }

    /// A robot's waypoints sorted by order.
    pub fn robot_waypoints(&self, robot_id: &str) -> Vec<&Waypoint> {
        ordered_waypoints(self.waypoints.iter().filter(|wp| wp.robot_id == robot_id))
    }

    pub fn path_geometry(&self, robot_id: &str, settings: &CurveSettings) -> PathGeometry {
        curve_for(self.waypoints.iter().filter(|wp| wp.robot_id == robot_id), settings)
    }

    pub fn export_map(&self) -> MapData {
        MapData::new(
            self.config,
            self.robots.clone(),
            self.waypoints.clone(),
            self.zones.clone(),
        )
    }

    // --- configuration -------------------------------------------------

    /// Replace the greenhouse configuration. Invalid values are rejected and
    /// the previous configuration is kept.
    pub fn update_config(&mut self, config: GreenhouseConfig) -> DomainResult<()> {
        config.validate().map_err(DomainError::invalid)?;
        self.config = config;
        self.record(|editor_id, timestamp| EditorEvent::ConfigUpdated {
            editor_id,
            config,
            timestamp,
        });
        Ok(())
    }

    // --- UI state --------------------------------------------------------

    pub fn set_mode(&mut self, mode: EditorMode) {
        if self.ui.mode == mode {
            return;
        }
        self.ui.mode = mode;
        self.record(|editor_id, timestamp| EditorEvent::ModeChanged {
            editor_id,
            mode,
            timestamp,
        });
    }

    pub fn select_robot(&mut self, robot_id: Option<String>) {
        self.ui.select_robot(robot_id);
    }

    pub fn select_zone(&mut self, zone_id: Option<String>) {
        self.ui.select_zone(zone_id);
    }

    pub fn clear_selection(&mut self) {
        self.ui.clear_selection();
    }

    pub fn set_active_panel(&mut self, panel: PanelTab) {
        self.ui.active_panel = panel;
    }

    pub fn toggle_grid(&mut self) {
        self.ui.show_grid = !self.ui.show_grid;
    }

    pub fn toggle_dimensions(&mut self) {
        self.ui.show_dimensions = !self.ui.show_dimensions;
    }

    // --- robots --------------------------------------------------------

    /// Add a robot and select it.
    pub fn add_robot(&mut self, robot: Robot) -> DomainResult<String> {
        if robot.id.is_empty() {
            return Err(DomainError::invalid("robot id must not be empty"));
        }
        if self.robot(&robot.id).is_some() {
            return Err(DomainError::invalid(format!("robot {} already exists", robot.id)));
        }
        if !robot.position.is_finite() || !robot.rotation.is_finite() {
            return Err(DomainError::invalid("robot transform must be finite"));
        }

        let id = robot.id.clone();
        self.robots.push(robot.clone());
        self.record(|editor_id, timestamp| EditorEvent::RobotAdded {
            editor_id,
            robot,
            timestamp,
        });
        self.select_robot(Some(id.clone()));
        Ok(id)
    }

    /// Floor click in robot mode. Out-of-bounds clicks are ignored.
    pub fn place_robot(&mut self, x: f64, z: f64) -> DomainResult<Option<String>> {
        let position = RobotPosition::new(x, PLACEMENT_HEIGHT, z);
        if !self.config.contains(&position) {
            return Ok(None);
        }
        let name = format!("Robot-{}", rand::thread_rng().gen_range(0..1000));
        let robot = Robot::new(new_id("robot"), name, position);
        self.add_robot(robot).map(Some)
    }

    pub fn update_robot(&mut self, robot_id: &str, patch: RobotPatch) -> DomainResult<()> {
        if let Some(position) = &patch.position {
            if !position.is_finite() {
                return Err(DomainError::invalid("robot position must be finite"));
            }
        }
        if let Some(rotation) = patch.rotation {
            if !rotation.is_finite() {
                return Err(DomainError::invalid("robot rotation must be finite"));
            }
        }

        let robot = self.robot_mut(robot_id)?;
        if let Some(name) = patch.name {
            robot.name = name;
        }
        if let Some(position) = patch.position {
            robot.position = position;
        }
        if let Some(rotation) = patch.rotation {
            robot.rotation = rotation;
        }
        if let Some(robot_type) = patch.robot_type {
            robot.robot_type = robot_type;
        }
        if let Some(status) = patch.status {
            robot.status = status;
        }
        if let Some(color) = patch.color {
            robot.color = Some(color);
        }

        let robot = robot.clone();
        self.record(|editor_id, timestamp| EditorEvent::RobotUpdated {
            editor_id,
            robot,
            timestamp,
        });
        Ok(())
    }

    /// Drag on the floor. Only x and z change; the result is clamped into the greenhouse.
    pub fn drag_robot(&mut self, robot_id: &str, x: f64, z: f64) -> DomainResult<RobotPosition> {
        if !x.is_finite() || !z.is_finite() {
            return Err(DomainError::invalid("drag target must be finite"));
        }
        let config = self.config;
        let robot = self.robot_mut(robot_id)?;
        robot.position = config.clamp(RobotPosition::new(x, robot.position.y, z));
        let position = robot.position;

        let robot = robot.clone();
        self.record(|editor_id, timestamp| EditorEvent::RobotUpdated {
            editor_id,
            robot,
            timestamp,
        });
        Ok(position)
    }

    /// Remove a robot together with its waypoints and zone assignments.
    /// Returns the number of waypoints removed.
    pub fn delete_robot(&mut self, robot_id: &str) -> DomainResult<usize> {
        let index = self
            .robots
            .iter()
            .position(|r| r.id == robot_id)
            .ok_or_else(|| DomainError::RobotNotFound { id: robot_id.to_string() })?;
        self.robots.remove(index);

        let before = self.waypoints.len();
        self.waypoints.retain(|wp| wp.robot_id != robot_id);
        let removed_waypoints = before - self.waypoints.len();

        for zone in &mut self.zones {
            zone.assigned_robot_ids.retain(|id| id != robot_id);
        }

        if self.ui.selected_robot_id.as_deref() == Some(robot_id) {
            self.select_robot(None);
        }

        let robot_id = robot_id.to_string();
        self.record(|editor_id, timestamp| EditorEvent::RobotDeleted {
            editor_id,
            robot_id,
            removed_waypoints,
            timestamp,
        });
        Ok(removed_waypoints)
    }

    // --- waypoints -----------------------------------------------------

    /// Append a waypoint to the end of a robot's path.
    /// Out-of-bounds points are ignored and yield `None`.
    pub fn add_waypoint(&mut self, robot_id: &str, x: f64, z: f64) -> DomainResult<Option<String>> {
        if self.robot(robot_id).is_none() {
            return Err(DomainError::RobotNotFound { id: robot_id.to_string() });
        }
        let position = RobotPosition::new(x, PLACEMENT_HEIGHT, z);
        if !self.config.contains(&position) {
            return Ok(None);
        }

        let order = self
            .waypoints
            .iter()
            .filter(|wp| wp.robot_id == robot_id)
            .map(|wp| wp.order)
            .max()
            .unwrap_or(0)
            + 1;

        let waypoint = Waypoint {
            id: new_id("waypoint"),
            position,
            robot_id: robot_id.to_string(),
            order,
        };
        let id = waypoint.id.clone();
        self.waypoints.push(waypoint.clone());
        self.record(|editor_id, timestamp| EditorEvent::WaypointAdded {
            editor_id,
            waypoint,
            timestamp,
        });
        Ok(Some(id))
    }

    /// Floor click in path mode: adds to the selected robot's path.
    pub fn add_waypoint_for_selected(&mut self, x: f64, z: f64) -> DomainResult<Option<String>> {
        match self.ui.selected_robot_id.clone() {
            Some(robot_id) if self.robot(&robot_id).is_some() => self.add_waypoint(&robot_id, x, z),
            _ => Ok(None),
        }
    }

    /// Delete a waypoint and renumber the robot's remaining waypoints `1..N-1`,
    /// keeping their relative order.
    pub fn delete_waypoint(&mut self, waypoint_id: &str) -> DomainResult<()> {
        let index = self
            .waypoints
            .iter()
            .position(|wp| wp.id == waypoint_id)
            .ok_or_else(|| DomainError::WaypointNotFound { id: waypoint_id.to_string() })?;
        let removed = self.waypoints.remove(index);

        let waypoint_id = removed.id.clone();
        let robot_id = removed.robot_id.clone();
        self.record(|editor_id, timestamp| EditorEvent::WaypointDeleted {
            editor_id,
            waypoint_id,
            robot_id,
            timestamp,
        });

        self.renumber(&removed.robot_id);
        Ok(())
    }

    /// Swap with the waypoint one position earlier. Returns whether anything moved.
    pub fn move_waypoint_up(&mut self, waypoint_id: &str) -> DomainResult<bool> {
        self.swap_with_neighbour(waypoint_id, -1)
    }

    /// Swap with the waypoint one position later. Returns whether anything moved.
    pub fn move_waypoint_down(&mut self, waypoint_id: &str) -> DomainResult<bool> {
        self.swap_with_neighbour(waypoint_id, 1)
    }

    /// Remove every waypoint of a robot.
    pub fn clear_path(&mut self, robot_id: &str) -> DomainResult<usize> {
        if self.robot(robot_id).is_none() {
            return Err(DomainError::RobotNotFound { id: robot_id.to_string() });
        }
        let before = self.waypoints.len();
        self.waypoints.retain(|wp| wp.robot_id != robot_id);
        let removed_waypoints = before - self.waypoints.len();

        let robot_id = robot_id.to_string();
        self.record(|editor_id, timestamp| EditorEvent::PathCleared {
            editor_id,
            robot_id,
            removed_waypoints,
            timestamp,
        });
        Ok(removed_waypoints)
    }

    fn swap_with_neighbour(&mut self, waypoint_id: &str, offset: i64) -> DomainResult<bool> {
        let waypoint = self
            .waypoint(waypoint_id)
            .ok_or_else(|| DomainError::WaypointNotFound { id: waypoint_id.to_string() })?;
        let robot_id = waypoint.robot_id.clone();
        let current = waypoint.order;

        let target = current as i64 + offset;
        let count = self.waypoints.iter().filter(|wp| wp.robot_id == robot_id).count() as i64;
        if target < 1 || target > count {
            return Ok(false);
        }
        let target = target as u32;

        let Some(neighbour) = self
            .waypoints
            .iter()
            .position(|wp| wp.robot_id == robot_id && wp.order == target)
        else {
            return Ok(false);
        };
        let Some(moved) = self.waypoints.iter().position(|wp| wp.id == waypoint_id) else {
            return Ok(false);
        };

        self.waypoints[moved].order = target;
        self.waypoints[neighbour].order = current;
        self.record_reorder(&robot_id);
        Ok(true)
    }

    fn renumber(&mut self, robot_id: &str) {
        let ids: Vec<String> = self
            .robot_waypoints(robot_id)
            .into_iter()
            .map(|wp| wp.id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }
        for (index, id) in ids.iter().enumerate() {
            if let Some(wp) = self.waypoints.iter_mut().find(|wp| &wp.id == id) {
                wp.order = index as u32 + 1;
            }
        }
        self.record_reorder(robot_id);
    }

    fn record_reorder(&mut self, robot_id: &str) {
        let waypoint_ids: Vec<String> = self
            .robot_waypoints(robot_id)
            .into_iter()
            .map(|wp| wp.id.clone())
            .collect();
        let robot_id = robot_id.to_string();
        self.record(|editor_id, timestamp| EditorEvent::WaypointsReordered {
            editor_id,
            robot_id,
            waypoint_ids,
            timestamp,
        });
    }

    // --- zones ---------------------------------------------------------

    /// Add a zone and select it. Assignment ids are de-duplicated.
    pub fn add_zone(&mut self, mut zone: WorkZone) -> DomainResult<String> {
        if zone.id.is_empty() {
            return Err(DomainError::invalid("zone id must not be empty"));
        }
        if self.zone(&zone.id).is_some() {
            return Err(DomainError::invalid(format!("zone {} already exists", zone.id)));
        }
        dedupe(&mut zone.assigned_robot_ids);

        let id = zone.id.clone();
        self.zones.push(zone.clone());
        self.record(|editor_id, timestamp| EditorEvent::ZoneAdded {
            editor_id,
            zone,
            timestamp,
        });
        self.select_zone(Some(id.clone()));
        Ok(id)
    }

    /// Turn the vertices of a closed drawing session into a zone.
    pub fn create_zone_from_points(&mut self, points: Vec<RobotPosition>) -> DomainResult<String> {
        if points.len() < 3 {
            return Err(DomainError::invalid("a zone needs at least 3 points"));
        }
        let index = self.zones.len();
        let zone = WorkZone {
            id: new_id("zone"),
            name: format!("Zone {}", index + 1),
            color: zone_color(index).to_string(),
            points: points.into_iter().map(|p| p.with_y(0.0)).collect(),
            assigned_robot_ids: Vec::new(),
        };
        self.add_zone(zone)
    }

    pub fn update_zone(&mut self, zone_id: &str, patch: ZonePatch) -> DomainResult<()> {
        let zone = self.zone_mut(zone_id)?;
        if let Some(name) = patch.name {
            zone.name = name;
        }
        if let Some(color) = patch.color {
            zone.color = color;
        }
        if let Some(points) = patch.points {
            zone.points = points;
        }
        let zone = zone.clone();
        self.record(|editor_id, timestamp| EditorEvent::ZoneUpdated {
            editor_id,
            zone,
            timestamp,
        });
        Ok(())
    }

    pub fn set_zone_color(&mut self, zone_id: &str, color: String) -> DomainResult<()> {
        self.update_zone(
            zone_id,
            ZonePatch {
                color: Some(color),
                ..ZonePatch::default()
            },
        )
    }

    /// Assign or unassign a robot. Returns `true` if the robot is now assigned.
    pub fn toggle_zone_assignment(&mut self, zone_id: &str, robot_id: &str) -> DomainResult<bool> {
        if self.robot(robot_id).is_none() {
            return Err(DomainError::RobotNotFound { id: robot_id.to_string() });
        }
        let zone = self.zone_mut(zone_id)?;
        let assigned = if zone.is_assigned(robot_id) {
            zone.assigned_robot_ids.retain(|id| id != robot_id);
            false
        } else {
            zone.assigned_robot_ids.push(robot_id.to_string());
            true
        };
        dedupe(&mut zone.assigned_robot_ids);

        let zone = zone.clone();
        self.record(|editor_id, timestamp| EditorEvent::ZoneUpdated {
            editor_id,
            zone,
            timestamp,
        });
        Ok(assigned)
    }

    pub fn delete_zone(&mut self, zone_id: &str) -> DomainResult<()> {
        let index = self
            .zones
            .iter()
            .position(|z| z.id == zone_id)
            .ok_or_else(|| DomainError::ZoneNotFound { id: zone_id.to_string() })?;
        self.zones.remove(index);

        if self.ui.selected_zone_id.as_deref() == Some(zone_id) {
            self.select_zone(None);
        }

        let zone_id = zone_id.to_string();
        self.record(|editor_id, timestamp| EditorEvent::ZoneDeleted {
            editor_id,
            zone_id,
            timestamp,
        });
        Ok(())
    }

    // --- simulation ----------------------------------------------------

    pub fn start_simulation(&mut self, simulator: &mut PathSimulator) {
        if self.ui.is_playing && simulator.is_running() {
            return;
        }
        self.ui.is_playing = true;
        simulator.start();
        self.record(|editor_id, timestamp| EditorEvent::SimulationStarted { editor_id, timestamp });
    }

    /// Idle every robot and stop playback. A second call changes nothing.
    pub fn stop_simulation(&mut self, simulator: &mut PathSimulator) {
        let was_playing = self.ui.is_playing || simulator.is_running();
        simulator.stop(&mut self.robots);
        self.ui.is_playing = false;
        if was_playing {
            self.record(|editor_id, timestamp| EditorEvent::SimulationStopped { editor_id, timestamp });
        }
    }

    /// Advance one frame and write the poses back. Not journalled.
    pub fn simulation_frame(&mut self, simulator: &mut PathSimulator) -> usize {
        let transforms = simulator.tick(&self.robots, &self.waypoints);
        transforms
            .iter()
            .filter(|transform| self.apply_robot_transform(transform))
            .count()
    }

    /// Write a transient pose. Unknown robots are skipped.
    pub fn apply_robot_transform(&mut self, transform: &RobotTransform) -> bool {
        match self.robots.iter_mut().find(|r| r.id == transform.robot_id) {
            Some(robot) => {
                robot.position = transform.position;
                robot.rotation = transform.rotation;
                robot.status = transform.status;
                true
            }
            None => false,
        }
    }

    // --- whole-model operations ----------------------------------------

    /// Replace the spatial model with a validated snapshot and reset the
    /// transient UI state.
    pub fn load_map_data(&mut self, data: MapData) -> DomainResult<()> {
        data.validate()?;

        let MapData {
            config,
            robots,
            waypoints,
            zones,
            version,
            ..
        } = data;

        let counts = (robots.len(), waypoints.len(), zones.len());
        self.config = config;
        self.robots = robots;
        self.waypoints = waypoints;
        self.zones = zones;
        self.ui.mode = EditorMode::View;
        self.ui.clear_selection();
        self.ui.is_playing = false;

        self.record(|editor_id, timestamp| EditorEvent::MapLoaded {
            editor_id,
            version,
            robots: counts.0,
            waypoints: counts.1,
            zones: counts.2,
            timestamp,
        });
        Ok(())
    }

    pub fn import_json(&mut self, json: &str) -> DomainResult<()> {
        let data = MapData::from_json(json)?;
        self.load_map_data(data)
    }

    pub fn reset_all(&mut self) {
        self.config = GreenhouseConfig::default();
        self.robots.clear();
        self.waypoints.clear();
        self.zones.clear();
        self.ui = EditorUiState::default();
        self.record(|editor_id, timestamp| EditorEvent::EditorReset { editor_id, timestamp });
    }

    // --- helpers -------------------------------------------------------

    fn robot_mut(&mut self, robot_id: &str) -> DomainResult<&mut Robot> {
        self.robots
            .iter_mut()
            .find(|r| r.id == robot_id)
            .ok_or_else(|| DomainError::RobotNotFound { id: robot_id.to_string() })
    }

    fn zone_mut(&mut self, zone_id: &str) -> DomainResult<&mut WorkZone> {
        self.zones
            .iter_mut()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| DomainError::ZoneNotFound { id: zone_id.to_string() })
    }

    fn record<F>(&mut self, build: F)
    where
        F: FnOnce(String, chrono::DateTime<Utc>) -> EditorEvent,
    {
        let event = build(self.id.clone(), Utc::now());
        self.add_event(event);
    }
}

fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

fn dedupe(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

impl AggregateRoot for GreenhouseEditor {
    type Event = EditorEvent;

    const AGGREGATE_TYPE: &'static str = "GreenhouseEditor";

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
        self.version += 1;
    }
}
