use super::aggregate::GreenhouseEditor;
use super::state::EditorMode;
use crate::domains::greenhouse::{GreenhouseDimensions, Robot, RobotPosition, WorkZone};
use crate::domains::path_curve::{CurveSettings, PathGeometry};
use crate::domains::zone_drawing::ZoneDrawing;
use serde::{Deserialize, Serialize};

/// Figures shown in the status bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusProjection {
    pub mode: EditorMode,
    pub robot_count: usize,
    pub zone_count: usize,
    pub waypoint_count: usize,
    pub dimensions: GreenhouseDimensions,
    pub is_playing: bool,
    pub selected_robot_name: Option<String>,
    pub selected_zone_name: Option<String>,
}

impl StatusProjection {
    pub fn from_editor(editor: &GreenhouseEditor) -> Self {
        Self {
            mode: editor.ui.mode,
            robot_count: editor.robots.len(),
            zone_count: editor.zones.len(),
            waypoint_count: editor.waypoints.len(),
            dimensions: editor.config.dimensions,
            is_playing: editor.ui.is_playing,
            selected_robot_name: editor.selected_robot().map(|r| r.name.clone()),
            selected_zone_name: editor.selected_zone().map(|z| z.name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotPath {
    pub robot_id: String,
    pub color: Option<String>,
    pub geometry: PathGeometry,
    /// Horizontal length of the straight polyline through the waypoints.
    pub estimated_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOverlay {
    pub zone: WorkZone,
    pub label_anchor: RobotPosition,
    pub closed: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawingOverlay {
    pub polyline: Vec<RobotPosition>,
    pub committed_points: usize,
    /// Enough points that a click near the first one closes the zone.
    pub can_close: bool,
    pub preview: Option<RobotPosition>,
}

/// Everything the render layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneProjection {
    pub robots: Vec<Robot>,
    pub paths: Vec<RobotPath>,
    pub zones: Vec<ZoneOverlay>,
    pub bed_positions: Vec<RobotPosition>,
    pub drawing: Option<DrawingOverlay>,
    pub waypoint_preview: Option<RobotPosition>,
    pub status: StatusProjection,
}

impl SceneProjection {
    pub fn build(
        editor: &GreenhouseEditor,
        drawing: &ZoneDrawing,
        waypoint_preview: Option<RobotPosition>,
        curve: &CurveSettings,
    ) -> Self {
        let paths = editor
            .robots
            .iter()
            .filter_map(|robot| {
                let ordered = editor.robot_waypoints(&robot.id);
                if ordered.len() < 2 {
                    return None;
                }
                Some(RobotPath {
                    robot_id: robot.id.clone(),
                    color: robot.color.clone(),
                    geometry: editor.path_geometry(&robot.id, curve),
                    estimated_distance: crate::domains::greenhouse::path_length(&ordered),
                })
            })
            .collect();

        let selected_zone = editor.ui.selected_zone_id.as_deref();
        let zones = editor
            .zones
            .iter()
            .map(|zone| ZoneOverlay {
                label_anchor: zone.label_anchor(),
                closed: zone.is_closed_polygon(),
                selected: selected_zone == Some(zone.id.as_str()),
                zone: zone.clone(),
            })
            .collect();

        let drawing = (editor.ui.mode == EditorMode::Zone).then(|| DrawingOverlay {
            polyline: drawing.preview_polyline(),
            committed_points: drawing.points().len(),
            can_close: drawing.can_close(),
            preview: drawing.preview(),
        });

        let waypoint_preview = waypoint_preview
            .filter(|_| editor.ui.mode == EditorMode::Path && editor.selected_robot().is_some());

        Self {
            robots: editor.robots.clone(),
            paths,
            zones,
            bed_positions: editor.config.beds.bed_positions(),
            drawing,
            waypoint_preview,
            status: StatusProjection::from_editor(editor),
        }
    }
}
