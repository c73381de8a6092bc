// Vector helpers on RobotPosition, shared by the curve engine and the simulator.
use super::model::{RobotPosition, Waypoint};
use std::ops::{Add, Mul, Sub};

impl RobotPosition {
    pub const ZERO: RobotPosition = RobotPosition { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Point on the floor plane at the given horizontal coordinates.
    pub const fn on_floor(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }

    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_squared(&self, other: &RobotPosition) -> f64 {
        let d = *self - *other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// Distance on the x/z plane. All boundary and closing tests use this.
    pub fn horizontal_distance(&self, other: &RobotPosition) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalize(&self) -> RobotPosition {
        let length = self.length();
        if length == 0.0 {
            RobotPosition::ZERO
        } else {
            *self * (1.0 / length)
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for RobotPosition {
    type Output = RobotPosition;

    fn add(self, other: RobotPosition) -> Self::Output {
        RobotPosition::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for RobotPosition {
    type Output = RobotPosition;

    fn sub(self, other: RobotPosition) -> Self::Output {
        RobotPosition::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for RobotPosition {
    type Output = RobotPosition;

    fn mul(self, factor: f64) -> Self::Output {
        RobotPosition::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl From<(f64, f64, f64)> for RobotPosition {
    fn from(value: (f64, f64, f64)) -> Self {
        RobotPosition::new(value.0, value.1, value.2)
    }
}

/// Waypoints of one robot sorted ascending by `order`.
///
/// The sort is stable, so waypoints sharing an order value keep their input
/// order. Which of them comes first is not otherwise defined.
pub fn ordered_waypoints<'a, I>(waypoints: I) -> Vec<&'a Waypoint>
where
    I: IntoIterator<Item = &'a Waypoint>,
{
    let mut sorted: Vec<&Waypoint> = waypoints.into_iter().collect();
    sorted.sort_by_key(|wp| wp.order);
    sorted
}

/// Horizontal length of the polyline through the ordered waypoints.
pub fn path_length(ordered: &[&Waypoint]) -> f64 {
    ordered
        .windows(2)
        .map(|pair| pair[0].position.horizontal_distance(&pair[1].position))
        .sum()
}
