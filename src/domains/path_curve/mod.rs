pub mod catmull_rom;
pub mod markers;

pub use catmull_rom::CentripetalCatmullRom;
pub use markers::{arrow_markers, ArrowMarker};

use crate::domains::greenhouse::{ordered_waypoints, RobotPosition, Waypoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSettings {
    /// Height added to every waypoint before fitting, metres.
    pub lift: f64,
    /// Number of divisions; the sampled polyline has `samples + 1` points.
    pub samples: usize,
    pub max_arrows: usize,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            lift: 0.5,
            samples: 50,
            max_arrows: 5,
        }
    }
}

/// Renderable geometry for one robot's path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    pub curve_points: Vec<RobotPosition>,
    pub arrows: Vec<ArrowMarker>,
    pub start: Option<RobotPosition>,
    pub end: Option<RobotPosition>,
    pub length: f64,
}

impl PathGeometry {
    pub fn is_empty(&self) -> bool {
        self.curve_points.is_empty()
    }
}

/// Smooth path through a robot's waypoints.
///
/// Waypoints are sorted by `order` first. Fewer than two yields empty
/// geometry. The result depends only on the inputs.
pub fn curve_for<'a, I>(waypoints: I, settings: &CurveSettings) -> PathGeometry
where
    I: IntoIterator<Item = &'a Waypoint>,
{
    let ordered = ordered_waypoints(waypoints);
    let lifted: Vec<RobotPosition> = ordered
        .iter()
        .map(|wp| wp.position.with_y(wp.position.y + settings.lift))
        .collect();

    let count = lifted.len();
    let start = lifted.first().copied();
    let end = lifted.last().copied();

    let Some(curve) = CentripetalCatmullRom::new(lifted) else {
        return PathGeometry::default();
    };

    PathGeometry {
        curve_points: curve.sample(settings.samples),
        arrows: arrow_markers(&curve, count, settings.max_arrows),
        start,
        end,
        length: curve.length(),
    }
}
