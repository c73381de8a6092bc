use crate::domains::greenhouse::{GreenhouseConfig, RobotPosition};
use serde::{Deserialize, Serialize};

/// Clicking closer than this to the first vertex closes the polygon (metres, x/z plane).
pub const DEFAULT_CLOSE_THRESHOLD: f64 = 2.0;

/// Minimum committed vertices before a closing click is accepted.
pub const MIN_ZONE_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing { points: Vec<RobotPosition> },
}

/// What a floor click did to the drawing session.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Outside the greenhouse floor; nothing changed.
    Ignored,
    Started,
    PointAdded { count: usize },
    /// The polygon was closed. `points` excludes the closing click.
    Closed { points: Vec<RobotPosition> },
}

/// In-progress polygon authoring for work zones.
///
/// Only committed vertices end up in a zone. The preview point follows the
/// pointer and is appended to the rendered polyline while drawing, never to
/// the committed sequence.
#[derive(Debug, Clone)]
pub struct ZoneDrawing {
    state: DrawingState,
    preview: Option<RobotPosition>,
    close_threshold: f64,
}

impl Default for ZoneDrawing {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_THRESHOLD)
    }
}

impl ZoneDrawing {
    pub fn new(close_threshold: f64) -> Self {
        Self {
            state: DrawingState::Idle,
            preview: None,
            close_threshold,
        }
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing { .. })
    }

    pub fn points(&self) -> &[RobotPosition] {
        match &self.state {
            DrawingState::Idle => &[],
            DrawingState::Drawing { points } => points,
        }
    }

    pub fn preview(&self) -> Option<RobotPosition> {
        self.preview
    }

    pub fn close_threshold(&self) -> f64 {
        self.close_threshold
    }

    /// Applies to the next click; a drawing in progress is kept.
    pub fn set_close_threshold(&mut self, close_threshold: f64) {
        self.close_threshold = close_threshold;
    }

    /// True once a click near the first vertex would close the polygon.
    pub fn can_close(&self) -> bool {
        self.points().len() >= MIN_ZONE_POINTS
    }

    pub fn floor_click(&mut self, x: f64, z: f64, greenhouse: &GreenhouseConfig) -> ClickOutcome {
        let point = RobotPosition::on_floor(x, z);
        if !greenhouse.contains(&point) {
            return ClickOutcome::Ignored;
        }

        match &mut self.state {
            DrawingState::Idle => {
                self.state = DrawingState::Drawing { points: vec![point] };
                ClickOutcome::Started
            }
            DrawingState::Drawing { points } => {
                let closes = points.len() >= MIN_ZONE_POINTS
                    && point.horizontal_distance(&points[0]) < self.close_threshold;
                if closes {
                    let points = std::mem::take(points);
                    self.state = DrawingState::Idle;
                    self.preview = None;
                    ClickOutcome::Closed { points }
                } else {
                    points.push(point);
                    ClickOutcome::PointAdded { count: points.len() }
                }
            }
        }
    }

    pub fn pointer_move(&mut self, x: f64, z: f64, greenhouse: &GreenhouseConfig) {
        let point = RobotPosition::on_floor(x, z);
        self.preview = greenhouse.contains(&point).then_some(point);
    }

    pub fn pointer_leave(&mut self) {
        self.preview = None;
    }

    /// Discard the session. Returns whether a drawing was in progress.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.state = DrawingState::Idle;
        self.preview = None;
        was_drawing
    }

    /// Committed vertices plus the live preview point, for rendering only.
    pub fn preview_polyline(&self) -> Vec<RobotPosition> {
        let mut line = self.points().to_vec();
        if let (true, Some(preview)) = (self.is_drawing(), self.preview) {
            line.push(preview);
        }
        line
    }
}
