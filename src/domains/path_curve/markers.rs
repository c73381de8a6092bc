use super::catmull_rom::CentripetalCatmullRom;
use crate::domains::greenhouse::RobotPosition;
use serde::{Deserialize, Serialize};

/// Direction cone placed along a path curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowMarker {
    pub position: RobotPosition,
    /// Rotation about Y, `atan2(t.x, t.z)`.
    pub yaw: f64,
    /// Rotation about the marker's local X, `atan2(-t.y, |t_xz|)`.
    pub pitch: f64,
}

impl ArrowMarker {
    pub fn from_tangent(position: RobotPosition, tangent: RobotPosition) -> Self {
        let horizontal = (tangent.x * tangent.x + tangent.z * tangent.z).sqrt();
        Self {
            position,
            yaw: tangent.x.atan2(tangent.z),
            pitch: (-tangent.y).atan2(horizontal),
        }
    }
}

/// `min(waypoint_count - 1, max_arrows)` markers at arc-length fractions `i / (k + 1)`.
pub fn arrow_markers(
    curve: &CentripetalCatmullRom,
    waypoint_count: usize,
    max_arrows: usize,
) -> Vec<ArrowMarker> {
    let k = waypoint_count.saturating_sub(1).min(max_arrows);
    (1..=k)
        .map(|i| {
            let u = i as f64 / (k + 1) as f64;
            ArrowMarker::from_tangent(curve.point_at(u), curve.tangent_at(u))
        })
        .collect()
}
