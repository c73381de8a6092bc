use greenhouse_planner::adapters::outbound::init_noop_logger;
use greenhouse_planner::domains::editor::{EditorController, EditorSettings, GreenhouseEditor};
use greenhouse_planner::domains::greenhouse::{Robot, RobotPosition, RobotStatus, Waypoint};
use greenhouse_planner::domains::simulation::*;
use std::f64::consts::FRAC_PI_2;

const EPS: f64 = 1e-9;

fn robot(id: &str, x: f64, z: f64) -> Robot {
    Robot::new(id.to_string(), id.to_uppercase(), RobotPosition::new(x, 0.5, z))
}

fn wp(id: &str, robot_id: &str, order: u32, x: f64, z: f64) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        position: RobotPosition::new(x, 0.5, z),
        robot_id: robot_id.to_string(),
        order,
    }
}

fn apply(robots: &mut [Robot], transforms: &[RobotTransform]) {
    for t in transforms {
        if let Some(r) = robots.iter_mut().find(|r| r.id == t.robot_id) {
            r.position = t.position;
            r.rotation = t.rotation;
            r.status = t.status;
        }
    }
}

#[test]
fn test_first_tick_end_to_end() {
    let robots = vec![robot("r", 0.0, 0.0)];
    let waypoints = vec![wp("w1", "r", 1, 0.0, 0.0), wp("w2", "r", 2, 10.0, 0.0)];
    let mut simulator = PathSimulator::default();

    let transforms = simulator.tick(&robots, &waypoints);

    assert_eq!(transforms.len(), 1);
    let t = &transforms[0];
    assert!((simulator.progress_of("r").unwrap() - 0.005).abs() < EPS);
    assert!((t.position.x - 0.05).abs() < EPS);
    assert!(t.position.z.abs() < EPS);
    assert_eq!(t.position.y, 0.5);
    assert!((t.rotation - FRAC_PI_2).abs() < EPS);
    assert_eq!(t.status, RobotStatus::Moving);
}

#[test]
fn test_progress_wraps_within_400_ticks() {
    let robots = vec![robot("r", 0.0, 0.0)];
    let waypoints = vec![
        wp("w1", "r", 1, 0.0, 0.0),
        wp("w2", "r", 2, 10.0, 0.0),
        wp("w3", "r", 3, 10.0, 10.0),
    ];
    let mut simulator = PathSimulator::new(0.005);

    let mut previous = 0.0;
    let mut wrapped = false;
    for _ in 0..400 {
        simulator.tick(&robots, &waypoints);
        let progress = simulator.progress_of("r").unwrap();
        if progress < previous {
            wrapped = true;
        }
        previous = progress;
    }

    let progress = simulator.progress_of("r").unwrap();
    assert!(wrapped, "progress never wrapped, now {}", progress);
    assert!((0.0..2.0).contains(&progress));
}

#[test]
fn test_heading_is_fixed_per_segment() {
    let robots = vec![robot("r", 0.0, 0.0)];
    let waypoints = vec![
        wp("w1", "r", 1, 0.0, 0.0),
        wp("w2", "r", 2, 0.0, 10.0),
        wp("w3", "r", 3, -10.0, 10.0),
    ];
    let mut simulator = PathSimulator::default();

    let mut headings = Vec::new();
    for _ in 0..150 {
        headings.push(simulator.tick(&robots, &waypoints)[0].rotation);
    }
    // first segment heads +z
    assert!(headings.iter().all(|h| h.abs() < EPS));

    for _ in 0..100 {
        headings.push(simulator.tick(&robots, &waypoints)[0].rotation);
    }
    // tick 201 onwards runs along the second segment, towards -x
    assert!((headings[210] + FRAC_PI_2).abs() < EPS);
}

#[test]
fn test_waypoints_sorted_by_order() {
    let robots = vec![robot("r", 0.0, 0.0)];
    let waypoints = vec![wp("late", "r", 2, 10.0, 0.0), wp("early", "r", 1, 0.0, 0.0)];
    let mut simulator = PathSimulator::default();

    let t = simulator.tick(&robots, &waypoints).remove(0);
    assert!((t.position.x - 0.05).abs() < EPS);
}

#[test]
fn test_robot_without_waypoints_is_untouched() {
    let mut robots = vec![robot("moving", 0.0, 0.0), robot("parked", 3.0, 4.0)];
    robots[1].rotation = 1.25;
    robots[1].status = RobotStatus::Working;
    let waypoints = vec![wp("w1", "moving", 1, 0.0, 0.0), wp("w2", "moving", 2, 10.0, 0.0)];
    let mut simulator = PathSimulator::default();

    for _ in 0..10 {
        let transforms = simulator.tick(&robots, &waypoints);
        assert!(transforms.iter().all(|t| t.robot_id == "moving"));
        apply(&mut robots, &transforms);
    }

    assert_eq!(robots[1].position, RobotPosition::new(3.0, 0.5, 4.0));
    assert_eq!(robots[1].rotation, 1.25);
    assert_eq!(robots[1].status, RobotStatus::Working);
    assert_eq!(simulator.progress_of("parked"), None);
}

#[test]
fn test_single_waypoint_holds_position() {
    let robots = vec![robot("r", 5.0, 5.0)];
    let waypoints = vec![wp("w1", "r", 1, 2.0, 3.0)];
    let mut simulator = PathSimulator::default();

    for _ in 0..5 {
        let t = simulator.tick(&robots, &waypoints).remove(0);
        assert_eq!(t.position, RobotPosition::new(2.0, 0.5, 3.0));
        assert_eq!(simulator.progress_of("r"), Some(0.0));
    }
}

#[test]
fn test_stop_idles_robots_and_keeps_transforms() {
    let mut robots = vec![robot("r", 0.0, 0.0)];
    let waypoints = vec![wp("w1", "r", 1, 0.0, 0.0), wp("w2", "r", 2, 10.0, 0.0)];
    let mut simulator = PathSimulator::default();
    simulator.start();

    for _ in 0..20 {
        let transforms = simulator.tick(&robots, &waypoints);
        apply(&mut robots, &transforms);
    }
    let position = robots[0].position;
    let rotation = robots[0].rotation;
    assert_eq!(robots[0].status, RobotStatus::Moving);

    simulator.stop(&mut robots);
    assert!(!simulator.is_running());
    assert_eq!(robots[0].status, RobotStatus::Idle);
    assert_eq!(robots[0].position, position);
    assert_eq!(robots[0].rotation, rotation);

    // stopping again changes nothing
    simulator.stop(&mut robots);
    assert_eq!(robots[0].status, RobotStatus::Idle);
    assert_eq!(robots[0].position, position);
}

#[test]
fn test_progress_survives_restart() {
    let robots = vec![robot("r", 0.0, 0.0)];
    let waypoints = vec![wp("w1", "r", 1, 0.0, 0.0), wp("w2", "r", 2, 10.0, 0.0)];
    let mut simulator = PathSimulator::default();
    let mut idle = robots.clone();

    simulator.start();
    for _ in 0..10 {
        simulator.tick(&robots, &waypoints);
    }
    simulator.stop(&mut idle);
    simulator.start();
    simulator.tick(&robots, &waypoints);

    assert!((simulator.progress_of("r").unwrap() - 0.055).abs() < EPS);
}

#[test]
fn test_forget_drops_progress() {
    let robots = vec![robot("a", 0.0, 0.0), robot("b", 0.0, 0.0)];
    let waypoints = vec![
        wp("a1", "a", 1, 0.0, 0.0),
        wp("a2", "a", 2, 1.0, 0.0),
        wp("b1", "b", 1, 0.0, 0.0),
        wp("b2", "b", 2, 1.0, 0.0),
    ];
    let mut simulator = PathSimulator::default();
    simulator.tick(&robots, &waypoints);

    simulator.forget("a");
    assert_eq!(simulator.progress_of("a"), None);
    assert!(simulator.progress_of("b").is_some());

    simulator.retain_robots(["a"]);
    assert_eq!(simulator.progress_of("b"), None);
}

fn controller() -> EditorController {
    EditorController::new(GreenhouseEditor::default(), EditorSettings::default(), init_noop_logger())
}

#[test]
fn test_controller_end_to_end_scenario() {
    let mut c = controller();
    c.edit(|e| e.add_robot(robot("R", 0.0, 0.0))).unwrap();
    c.edit(|e| e.add_waypoint("R", 0.0, 0.0)).unwrap();
    c.edit(|e| e.add_waypoint("R", 10.0, 0.0)).unwrap();

    // frames do nothing until playback starts
    assert_eq!(c.frame(), 0);

    c.set_playing(true);
    assert_eq!(c.frame(), 1);

    let r = c.editor().robot("R").unwrap();
    assert!((c.progress_of("R").unwrap() - 0.005).abs() < EPS);
    assert!((r.position.x - 0.05).abs() < EPS);
    assert!(r.position.z.abs() < EPS);
    assert!((r.rotation - FRAC_PI_2).abs() < EPS);
    assert_eq!(r.status, RobotStatus::Moving);

    c.set_playing(false);
    let r = c.editor().robot("R").unwrap();
    assert_eq!(r.status, RobotStatus::Idle);
    assert!((r.position.x - 0.05).abs() < EPS);
    assert!(!c.is_playing());
}

#[test]
fn test_deleting_robot_forgets_progress() {
    let mut c = controller();
    c.edit(|e| e.add_robot(robot("R", 0.0, 0.0))).unwrap();
    c.edit(|e| e.add_waypoint("R", 0.0, 0.0)).unwrap();
    c.edit(|e| e.add_waypoint("R", 10.0, 0.0)).unwrap();
    c.set_playing(true);
    c.frame();
    assert!(c.progress_of("R").is_some());

    c.delete_robot("R").unwrap();
    assert_eq!(c.progress_of("R"), None);

    // a robot re-added under the same id starts over
    c.edit(|e| e.add_robot(robot("R", 0.0, 0.0))).unwrap();
    c.edit(|e| e.add_waypoint("R", 0.0, 0.0)).unwrap();
    c.edit(|e| e.add_waypoint("R", 10.0, 0.0)).unwrap();
    c.frame();
    assert!((c.progress_of("R").unwrap() - 0.005).abs() < EPS);
}
