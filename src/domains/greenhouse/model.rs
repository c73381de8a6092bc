use serde::{Deserialize, Serialize};

/// A point in greenhouse space, in metres. `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotStatus {
    #[default]
    Idle,
    Moving,
    Working,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Robot {
    pub id: String,
    pub name: String,
    pub position: RobotPosition,
    /// Heading about the Y axis, radians.
    pub rotation: f64,
    #[serde(rename = "type")]
    pub robot_type: String,
    pub status: RobotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

pub const DEFAULT_ROBOT_TYPE: &str = "default";
pub const DEFAULT_ROBOT_COLOR: &str = "#3366ff";

impl Robot {
    pub fn new(id: String, name: String, position: RobotPosition) -> Self {
        Self {
            id,
            name,
            position,
            rotation: 0.0,
            robot_type: DEFAULT_ROBOT_TYPE.to_string(),
            status: RobotStatus::Idle,
            color: Some(DEFAULT_ROBOT_COLOR.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    pub position: RobotPosition,
    /// Weak reference to the owning robot.
    pub robot_id: String,
    /// 1-based sort key, unique per robot after renumbering.
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkZone {
    pub id: String,
    pub name: String,
    pub color: String,
    pub points: Vec<RobotPosition>,
    pub assigned_robot_ids: Vec<String>,
}

impl WorkZone {
    /// Fewer than three vertices is a legal but incomplete zone.
    pub fn is_closed_polygon(&self) -> bool {
        self.points.len() >= 3
    }

    /// Closed-polygon edges `p[i] -> p[(i + 1) % n]`.
    pub fn edges(&self) -> impl Iterator<Item = (RobotPosition, RobotPosition)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Vertex centroid lifted 2 m for the floating zone label.
    pub fn label_anchor(&self) -> RobotPosition {
        if self.points.is_empty() {
            return RobotPosition::ZERO;
        }
        let n = self.points.len() as f64;
        let sum = self
            .points
            .iter()
            .fold(RobotPosition::ZERO, |acc, p| acc + *p);
        RobotPosition::new(sum.x / n, sum.y / n + 2.0, sum.z / n)
    }

    pub fn is_assigned(&self, robot_id: &str) -> bool {
        self.assigned_robot_ids.iter().any(|id| id == robot_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseDimensions {
    /// Extent along Z.
    pub length: f64,
    /// Extent along X.
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HangingBedConfig {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub count: u32,
    pub spacing: f64,
    // The layered config loader may hand over lower-cased keys.
    #[serde(alias = "heightfromground")]
    pub height_from_ground: f64,
}

impl HangingBedConfig {
    /// Centre of every bed, spread evenly along Z around the origin.
    pub fn bed_positions(&self) -> Vec<RobotPosition> {
        let total = self.count.saturating_sub(1) as f64 * self.spacing;
        let start_z = -total / 2.0;
        (0..self.count)
            .map(|i| RobotPosition::new(0.0, self.height_from_ground, start_z + i as f64 * self.spacing))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseConfig {
    pub dimensions: GreenhouseDimensions,
    pub beds: HangingBedConfig,
}

impl Default for GreenhouseConfig {
    fn default() -> Self {
        Self {
            dimensions: GreenhouseDimensions {
                length: 100.0,
                width: 40.0,
                height: 8.0,
            },
            beds: HangingBedConfig {
                length: 30.0,
                width: 2.0,
                height: 0.4,
                count: 20,
                spacing: 4.0,
                height_from_ground: 4.0,
            },
        }
    }
}

impl GreenhouseConfig {
    /// Floor bounds test on the horizontal plane; `y` is ignored.
    pub fn contains(&self, point: &RobotPosition) -> bool {
        point.x.abs() <= self.dimensions.width / 2.0 && point.z.abs() <= self.dimensions.length / 2.0
    }

    /// Clamp a point into the floor bounds, keeping its height.
    pub fn clamp(&self, point: RobotPosition) -> RobotPosition {
        let half_x = self.dimensions.width / 2.0;
        let half_z = self.dimensions.length / 2.0;
        RobotPosition::new(point.x.clamp(-half_x, half_x), point.y, point.z.clamp(-half_z, half_z))
    }

    pub fn validate(&self) -> Result<(), String> {
        let d = &self.dimensions;
        let b = &self.beds;
        let positive = [
            ("dimensions.length", d.length),
            ("dimensions.width", d.width),
            ("dimensions.height", d.height),
            ("beds.length", b.length),
            ("beds.width", b.width),
            ("beds.height", b.height),
            ("beds.spacing", b.spacing),
            ("beds.heightFromGround", b.height_from_ground),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be a positive number, got {}", name, value));
            }
        }
        if b.count < 1 {
            return Err("beds.count must be at least 1".to_string());
        }
        Ok(())
    }
}
