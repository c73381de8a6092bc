use crate::domains::greenhouse::{ordered_waypoints, Robot, RobotPosition, RobotStatus, Waypoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Progress added per frame, in waypoint segments.
pub const DEFAULT_STEP_SIZE: f64 = 0.005;

/// Slack on the wrap test so accumulated rounding in `step_size` cannot
/// delay the wrap by a frame.
const WRAP_EPSILON: f64 = 1e-9;

/// Transient pose written back to a robot by one simulation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotTransform {
    pub robot_id: String,
    pub position: RobotPosition,
    pub rotation: f64,
    pub status: RobotStatus,
}

/// Moves every robot with a path along its waypoints, one frame at a time.
///
/// Progress is measured in segments: `1.5` is halfway between the second and
/// third waypoint. It survives stop/start and is only dropped for deleted robots.
#[derive(Debug, Clone)]
pub struct PathSimulator {
    progress: HashMap<String, f64>,
    step_size: f64,
    running: bool,
}

impl Default for PathSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_SIZE)
    }
}

impl PathSimulator {
    pub fn new(step_size: f64) -> Self {
        Self {
            progress: HashMap::new(),
            step_size,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn set_step_size(&mut self, step_size: f64) {
        self.step_size = step_size;
    }

    pub fn progress_of(&self, robot_id: &str) -> Option<f64> {
        self.progress.get(robot_id).copied()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Advance one frame and return the pose of every robot that has waypoints.
    /// Robots without waypoints get no transform and keep their state.
    pub fn tick(&mut self, robots: &[Robot], waypoints: &[Waypoint]) -> Vec<RobotTransform> {
        let mut transforms = Vec::new();

        for robot in robots {
            let path = ordered_waypoints(waypoints.iter().filter(|wp| wp.robot_id == robot.id));
            if path.is_empty() {
                continue;
            }
            let n = path.len();

            let entry = self.progress.entry(robot.id.clone()).or_insert(0.0);
            *entry += self.step_size;
            if *entry >= (n - 1) as f64 - WRAP_EPSILON {
                *entry = 0.0;
            }
            let progress = *entry;

            let segment = (progress.floor() as usize).min(n - 1);
            let next = (segment + 1).min(n - 1);
            let t = progress - segment as f64;

            let current = path[segment].position;
            let target = path[next].position;
            let dx = target.x - current.x;
            let dz = target.z - current.z;

            transforms.push(RobotTransform {
                robot_id: robot.id.clone(),
                position: RobotPosition::new(current.x + dx * t, robot.position.y, current.z + dz * t),
                rotation: dx.atan2(dz),
                status: RobotStatus::Moving,
            });
        }

        transforms
    }

    /// Stop playback. Every robot goes idle; positions and progress stay.
    /// Calling it again is harmless.
    pub fn stop(&mut self, robots: &mut [Robot]) {
        self.running = false;
        for robot in robots.iter_mut() {
            robot.status = RobotStatus::Idle;
        }
    }

    /// Drop progress for a robot that no longer exists.
    pub fn forget(&mut self, robot_id: &str) {
        self.progress.remove(robot_id);
    }

    /// Drop progress for every id not in `robot_ids`.
    pub fn retain_robots<'a, I>(&mut self, robot_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: std::collections::HashSet<&str> = robot_ids.into_iter().collect();
        self.progress.retain(|id, _| keep.contains(id.as_str()));
    }

    pub fn reset(&mut self) {
        self.progress.clear();
    }
}
