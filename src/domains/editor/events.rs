use super::state::EditorMode;
use crate::common::DomainEvent;
use crate::domains::greenhouse::{GreenhouseConfig, Robot, Waypoint, WorkZone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Journal of authoring changes made through the editor.
/// Simulation frames are transient and never recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditorEvent {
    ConfigUpdated {
        editor_id: String,
        config: GreenhouseConfig,
        timestamp: DateTime<Utc>,
    },
    ModeChanged {
        editor_id: String,
        mode: EditorMode,
        timestamp: DateTime<Utc>,
    },
    RobotAdded {
        editor_id: String,
        robot: Robot,
        timestamp: DateTime<Utc>,
    },
    RobotUpdated {
        editor_id: String,
        robot: Robot,
        timestamp: DateTime<Utc>,
    },
    RobotDeleted {
        editor_id: String,
        robot_id: String,
        removed_waypoints: usize,
        timestamp: DateTime<Utc>,
    },
    WaypointAdded {
        editor_id: String,
        waypoint: Waypoint,
        timestamp: DateTime<Utc>,
    },
    WaypointDeleted {
        editor_id: String,
        waypoint_id: String,
        robot_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Waypoint ids of one robot in their new order, after a move or renumbering.
    WaypointsReordered {
        editor_id: String,
        robot_id: String,
        waypoint_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    PathCleared {
        editor_id: String,
        robot_id: String,
        removed_waypoints: usize,
        timestamp: DateTime<Utc>,
    },
    ZoneAdded {
        editor_id: String,
        zone: WorkZone,
        timestamp: DateTime<Utc>,
    },
    ZoneUpdated {
        editor_id: String,
        zone: WorkZone,
        timestamp: DateTime<Utc>,
    },
    ZoneDeleted {
        editor_id: String,
        zone_id: String,
        timestamp: DateTime<Utc>,
    },
    SimulationStarted {
        editor_id: String,
        timestamp: DateTime<Utc>,
    },
    SimulationStopped {
        editor_id: String,
        timestamp: DateTime<Utc>,
    },
    MapLoaded {
        editor_id: String,
        version: String,
        robots: usize,
        waypoints: usize,
        zones: usize,
        timestamp: DateTime<Utc>,
    },
    EditorReset {
        editor_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for EditorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EditorEvent::ConfigUpdated { .. } => "ConfigUpdated",
            EditorEvent::ModeChanged { .. } => "ModeChanged",
            EditorEvent::RobotAdded { .. } => "RobotAdded",
            EditorEvent::RobotUpdated { .. } => "RobotUpdated",
            EditorEvent::RobotDeleted { .. } => "RobotDeleted",
            EditorEvent::WaypointAdded { .. } => "WaypointAdded",
            EditorEvent::WaypointDeleted { .. } => "WaypointDeleted",
            EditorEvent::WaypointsReordered { .. } => "WaypointsReordered",
            EditorEvent::PathCleared { .. } => "PathCleared",
            EditorEvent::ZoneAdded { .. } => "ZoneAdded",
            EditorEvent::ZoneUpdated { .. } => "ZoneUpdated",
            EditorEvent::ZoneDeleted { .. } => "ZoneDeleted",
            EditorEvent::SimulationStarted { .. } => "SimulationStarted",
            EditorEvent::SimulationStopped { .. } => "SimulationStopped",
            EditorEvent::MapLoaded { .. } => "MapLoaded",
            EditorEvent::EditorReset { .. } => "EditorReset",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            EditorEvent::ConfigUpdated { editor_id, .. }
            | EditorEvent::ModeChanged { editor_id, .. }
            | EditorEvent::RobotAdded { editor_id, .. }
            | EditorEvent::RobotUpdated { editor_id, .. }
            | EditorEvent::RobotDeleted { editor_id, .. }
            | EditorEvent::WaypointAdded { editor_id, .. }
            | EditorEvent::WaypointDeleted { editor_id, .. }
            | EditorEvent::WaypointsReordered { editor_id, .. }
            | EditorEvent::PathCleared { editor_id, .. }
            | EditorEvent::ZoneAdded { editor_id, .. }
            | EditorEvent::ZoneUpdated { editor_id, .. }
            | EditorEvent::ZoneDeleted { editor_id, .. }
            | EditorEvent::SimulationStarted { editor_id, .. }
            | EditorEvent::SimulationStopped { editor_id, .. }
            | EditorEvent::MapLoaded { editor_id, .. }
            | EditorEvent::EditorReset { editor_id, .. } => editor_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EditorEvent::ConfigUpdated { timestamp, .. }
            | EditorEvent::ModeChanged { timestamp, .. }
            | EditorEvent::RobotAdded { timestamp, .. }
            | EditorEvent::RobotUpdated { timestamp, .. }
            | EditorEvent::RobotDeleted { timestamp, .. }
            | EditorEvent::WaypointAdded { timestamp, .. }
            | EditorEvent::WaypointDeleted { timestamp, .. }
            | EditorEvent::WaypointsReordered { timestamp, .. }
            | EditorEvent::PathCleared { timestamp, .. }
            | EditorEvent::ZoneAdded { timestamp, .. }
            | EditorEvent::ZoneUpdated { timestamp, .. }
            | EditorEvent::ZoneDeleted { timestamp, .. }
            | EditorEvent::SimulationStarted { timestamp, .. }
            | EditorEvent::SimulationStopped { timestamp, .. }
            | EditorEvent::MapLoaded { timestamp, .. }
            | EditorEvent::EditorReset { timestamp, .. } => *timestamp,
        }
    }
}
