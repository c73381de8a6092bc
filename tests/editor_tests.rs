use greenhouse_planner::adapters::outbound::{init_noop_logger, MemoryLogger};
use greenhouse_planner::common::{AggregateRoot, DomainError, DomainEvent};
use greenhouse_planner::domains::editor::*;
use greenhouse_planner::domains::greenhouse::{GreenhouseConfig, Robot, RobotPosition, WorkZone};
use greenhouse_planner::domains::logger::LogLevel;

fn robot(id: &str, x: f64, z: f64) -> Robot {
    Robot::new(id.to_string(), format!("Robot {}", id), RobotPosition::new(x, 0.5, z))
}

fn zone(id: &str, assigned: &[&str]) -> WorkZone {
    WorkZone {
        id: id.to_string(),
        name: id.to_uppercase(),
        color: "#10b981".to_string(),
        points: vec![
            RobotPosition::new(0.0, 0.0, 0.0),
            RobotPosition::new(4.0, 0.0, 0.0),
            RobotPosition::new(4.0, 0.0, 4.0),
        ],
        assigned_robot_ids: assigned.iter().map(|s| s.to_string()).collect(),
    }
}

fn editor_with_path(points: &[(f64, f64)]) -> (GreenhouseEditor, Vec<String>) {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();
    let ids = points
        .iter()
        .map(|(x, z)| editor.add_waypoint("r1", *x, *z).unwrap().unwrap())
        .collect();
    (editor, ids)
}

fn order_of(editor: &GreenhouseEditor, id: &str) -> u32 {
    editor.waypoint(id).unwrap().order
}

fn path_ids(editor: &GreenhouseEditor, robot_id: &str) -> Vec<String> {
    editor
        .robot_waypoints(robot_id)
        .into_iter()
        .map(|wp| wp.id.clone())
        .collect()
}

#[test]
fn test_new_waypoints_get_increasing_orders() {
    let (editor, ids) = editor_with_path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    let orders: Vec<u32> = ids.iter().map(|id| order_of(&editor, id)).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert!(ids.iter().all(|id| id.starts_with("waypoint-")));
    assert_eq!(editor.waypoint(&ids[0]).unwrap().position.y, PLACEMENT_HEIGHT);
}

#[test]
fn test_delete_waypoint_renumbers_remaining() {
    let (mut editor, ids) = editor_with_path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);

    editor.delete_waypoint(&ids[1]).unwrap();

    assert_eq!(path_ids(&editor, "r1"), vec![ids[0].clone(), ids[2].clone(), ids[3].clone()]);
    let orders: Vec<u32> = editor.robot_waypoints("r1").iter().map(|wp| wp.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn test_order_after_gap_is_max_plus_one() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();
    editor.waypoints.push(greenhouse_planner::domains::greenhouse::Waypoint {
        id: "imported".to_string(),
        position: RobotPosition::new(1.0, 0.5, 1.0),
        robot_id: "r1".to_string(),
        order: 7,
    });

    let id = editor.add_waypoint("r1", 2.0, 2.0).unwrap().unwrap();
    assert_eq!(order_of(&editor, &id), 8);
}

#[test]
fn test_add_waypoint_out_of_bounds_is_ignored() {
    let (mut editor, _) = editor_with_path(&[(0.0, 0.0)]);
    assert_eq!(editor.add_waypoint("r1", 25.0, 0.0).unwrap(), None);
    assert_eq!(editor.waypoints.len(), 1);

    let err = editor.add_waypoint("ghost", 0.0, 0.0).unwrap_err();
    assert!(matches!(err, DomainError::RobotNotFound { .. }));
}

#[test]
fn test_move_waypoint_up_and_down() {
    let (mut editor, ids) = editor_with_path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);

    assert!(!editor.move_waypoint_up(&ids[0]).unwrap());
    assert!(!editor.move_waypoint_down(&ids[2]).unwrap());
    assert_eq!(path_ids(&editor, "r1"), ids);

    assert!(editor.move_waypoint_up(&ids[2]).unwrap());
    assert_eq!(path_ids(&editor, "r1"), vec![ids[0].clone(), ids[2].clone(), ids[1].clone()]);

    assert!(editor.move_waypoint_down(&ids[0]).unwrap());
    assert_eq!(path_ids(&editor, "r1"), vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);

    let orders: Vec<u32> = editor.robot_waypoints("r1").iter().map(|wp| wp.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn test_delete_robot_cascades() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();
    editor.add_robot(robot("r2", 5.0, 5.0)).unwrap();
    editor.add_waypoint("r1", 0.0, 0.0).unwrap();
    editor.add_waypoint("r1", 1.0, 0.0).unwrap();
    editor.add_waypoint("r2", 3.0, 3.0).unwrap();
    editor.add_zone(zone("z1", &["r1", "r2"])).unwrap();
    editor.select_robot(Some("r1".to_string()));

    let removed = editor.delete_robot("r1").unwrap();

    assert_eq!(removed, 2);
    assert!(editor.robot("r1").is_none());
    assert!(editor.waypoints.iter().all(|wp| wp.robot_id == "r2"));
    assert_eq!(editor.zone("z1").unwrap().assigned_robot_ids, vec!["r2".to_string()]);
    assert_eq!(editor.ui.selected_robot_id, None);

    let err = editor.delete_robot("r1").unwrap_err();
    assert!(matches!(err, DomainError::RobotNotFound { .. }));
}

#[test]
fn test_selection_is_exclusive_and_opens_panel() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();
    editor.add_zone(zone("z1", &[])).unwrap();
    editor.set_active_panel(PanelTab::Settings);

    editor.select_robot(Some("r1".to_string()));
    assert_eq!(editor.ui.selected_robot_id.as_deref(), Some("r1"));
    assert_eq!(editor.ui.selected_zone_id, None);
    assert_eq!(editor.ui.active_panel, PanelTab::Robots);

    editor.select_zone(Some("z1".to_string()));
    assert_eq!(editor.ui.selected_zone_id.as_deref(), Some("z1"));
    assert_eq!(editor.ui.selected_robot_id, None);
    assert_eq!(editor.ui.active_panel, PanelTab::Zones);

    editor.select_zone(None);
    assert_eq!(editor.ui.selected_zone_id, None);
    assert_eq!(editor.ui.active_panel, PanelTab::Zones);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut editor = GreenhouseEditor::default();
    let before = editor.config;

    let mut bad = GreenhouseConfig::default();
    bad.dimensions.width = -3.0;
    let err = editor.update_config(bad).unwrap_err();
    assert!(matches!(err, DomainError::InvalidCommand { .. }));
    assert_eq!(editor.config, before);

    let mut bad = GreenhouseConfig::default();
    bad.beds.count = 0;
    assert!(editor.update_config(bad).is_err());

    let mut good = GreenhouseConfig::default();
    good.dimensions.width = 60.0;
    editor.update_config(good).unwrap();
    assert_eq!(editor.config.dimensions.width, 60.0);
}

#[test]
fn test_add_robot_validation() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();

    assert!(editor.add_robot(robot("r1", 1.0, 1.0)).is_err());
    assert!(editor.add_robot(robot("", 1.0, 1.0)).is_err());
    assert!(editor.add_robot(robot("r2", f64::NAN, 1.0)).is_err());
    assert_eq!(editor.robots.len(), 1);
}

#[test]
fn test_place_robot() {
    let mut editor = GreenhouseEditor::default();

    assert_eq!(editor.place_robot(30.0, 0.0).unwrap(), None);
    assert!(editor.robots.is_empty());

    let id = editor.place_robot(3.0, -4.0).unwrap().unwrap();
    let placed = editor.robot(&id).unwrap();
    assert!(id.starts_with("robot-"));
    assert!(placed.name.starts_with("Robot-"));
    assert_eq!(placed.position, RobotPosition::new(3.0, 0.5, -4.0));
    assert_eq!(editor.ui.selected_robot_id.as_deref(), Some(id.as_str()));
}

#[test]
fn test_drag_robot_clamps_to_floor() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();

    let position = editor.drag_robot("r1", 100.0, -80.0).unwrap();
    assert_eq!(position, RobotPosition::new(20.0, 0.5, -50.0));
    assert_eq!(editor.robot("r1").unwrap().position, position);
}

#[test]
fn test_update_robot_patch() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();

    editor
        .update_robot(
            "r1",
            RobotPatch {
                name: Some("Picker".to_string()),
                rotation: Some(1.0),
                ..RobotPatch::default()
            },
        )
        .unwrap();

    let r = editor.robot("r1").unwrap();
    assert_eq!(r.name, "Picker");
    assert_eq!(r.rotation, 1.0);
    assert_eq!(r.position, RobotPosition::new(0.0, 0.5, 0.0));

    let bad = RobotPatch {
        rotation: Some(f64::INFINITY),
        ..RobotPatch::default()
    };
    assert!(editor.update_robot("r1", bad).is_err());
    assert_eq!(editor.robot("r1").unwrap().rotation, 1.0);
}

#[test]
fn test_zone_assignments_are_deduplicated() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();
    editor.add_zone(zone("z1", &["r1", "r1"])).unwrap();
    assert_eq!(editor.zone("z1").unwrap().assigned_robot_ids, vec!["r1".to_string()]);

    assert!(!editor.toggle_zone_assignment("z1", "r1").unwrap());
    assert!(editor.zone("z1").unwrap().assigned_robot_ids.is_empty());
    assert!(editor.toggle_zone_assignment("z1", "r1").unwrap());
    assert_eq!(editor.zone("z1").unwrap().assigned_robot_ids, vec!["r1".to_string()]);

    assert!(editor.toggle_zone_assignment("z1", "ghost").is_err());
}

#[test]
fn test_delete_zone_clears_selection() {
    let mut editor = GreenhouseEditor::default();
    editor.add_zone(zone("z1", &[])).unwrap();
    assert_eq!(editor.ui.selected_zone_id.as_deref(), Some("z1"));

    editor.delete_zone("z1").unwrap();
    assert!(editor.zones.is_empty());
    assert_eq!(editor.ui.selected_zone_id, None);
    assert!(matches!(
        editor.delete_zone("z1").unwrap_err(),
        DomainError::ZoneNotFound { .. }
    ));
}

#[test]
fn test_changes_are_recorded_as_events() {
    let mut editor = GreenhouseEditor::default();
    editor.add_robot(robot("r1", 0.0, 0.0)).unwrap();
    editor.add_waypoint("r1", 1.0, 1.0).unwrap();
    editor.set_mode(EditorMode::Path);
    editor.set_mode(EditorMode::Path);
    editor.toggle_grid();

    let types: Vec<&str> = editor
        .uncommitted_events()
        .iter()
        .map(|e| e.event_type())
        .collect();
    assert_eq!(types.len(), 3);
    assert_eq!(editor.version(), 3);
    assert!(editor.uncommitted_events().iter().all(|e| e.aggregate_id() == DEFAULT_EDITOR_ID));

    let drained = editor.take_uncommitted_events();
    assert_eq!(drained.len(), 3);
    assert!(editor.uncommitted_events().is_empty());
    assert_eq!(editor.version(), 3);
}

fn controller() -> EditorController {
    EditorController::new(GreenhouseEditor::default(), EditorSettings::default(), init_noop_logger())
}

#[test]
fn test_zone_drawing_through_controller() {
    let mut c = controller();
    c.set_mode(EditorMode::Zone);

    assert_eq!(c.floor_click(0.0, 0.0).unwrap(), FloorClick::ZoneStarted);
    assert_eq!(c.floor_click(10.0, 0.0).unwrap(), FloorClick::ZonePointAdded { count: 2 });
    assert_eq!(c.floor_click(10.0, 10.0).unwrap(), FloorClick::ZonePointAdded { count: 3 });

    let FloorClick::ZoneCreated(zone_id) = c.floor_click(0.5, 0.5).unwrap() else {
        panic!("expected the click near the start to close the zone");
    };

    let zone = c.editor().zone(&zone_id).unwrap();
    assert_eq!(zone.points.len(), 3);
    assert_eq!(zone.color, "#3366ff");
    assert_eq!(zone.name, "Zone 1");
    assert!(zone.points.iter().all(|p| p.y == 0.0));
    assert!(!c.drawing().is_drawing());
    assert_eq!(c.editor().ui.selected_zone_id.as_deref(), Some(zone_id.as_str()));

    // the second zone takes the next palette colour
    for (x, z) in [(-10.0, -10.0), (-5.0, -10.0), (-5.0, -5.0), (-10.0, -10.0)] {
        c.floor_click(x, z).unwrap();
    }
    let second = c.editor().zones.last().unwrap();
    assert_eq!(second.color, "#10b981");
    assert_eq!(second.name, "Zone 2");
}

#[test]
fn test_leaving_zone_mode_cancels_drawing() {
    let mut c = controller();
    c.set_mode(EditorMode::Zone);
    c.floor_click(0.0, 0.0).unwrap();
    c.floor_click(5.0, 0.0).unwrap();
    assert!(c.drawing().is_drawing());

    c.set_mode(EditorMode::View);
    assert!(!c.drawing().is_drawing());
    assert!(c.editor().zones.is_empty());
    assert!(c.scene().drawing.is_none());
}

#[test]
fn test_floor_click_by_mode() {
    let mut c = controller();
    assert_eq!(c.floor_click(1.0, 1.0).unwrap(), FloorClick::Ignored);

    c.set_mode(EditorMode::Robot);
    let FloorClick::RobotPlaced(robot_id) = c.floor_click(1.0, 1.0).unwrap() else {
        panic!("expected a robot");
    };

    c.set_mode(EditorMode::Path);
    assert!(matches!(c.floor_click(2.0, 2.0).unwrap(), FloorClick::WaypointAdded(_)));
    assert!(matches!(c.floor_click(4.0, 2.0).unwrap(), FloorClick::WaypointAdded(_)));
    assert_eq!(c.floor_click(400.0, 2.0).unwrap(), FloorClick::Ignored);

    let scene = c.scene();
    assert_eq!(scene.paths.len(), 1);
    assert_eq!(scene.paths[0].robot_id, robot_id);
    assert!((scene.paths[0].estimated_distance - 2.0).abs() < 1e-9);
}

#[test]
fn test_escape_cancels_drawing_before_clearing_selection() {
    let mut c = controller();
    c.edit(|e| e.add_robot(robot("r1", 0.0, 0.0))).unwrap();
    c.set_mode(EditorMode::Zone);
    c.floor_click(0.0, 0.0).unwrap();
    c.edit(|e| {
        e.select_robot(Some("r1".to_string()));
        Ok(())
    })
    .unwrap();

    c.handle_key(&KeyInput::plain("Escape")).unwrap();
    assert!(!c.drawing().is_drawing());
    assert_eq!(c.editor().ui.selected_robot_id.as_deref(), Some("r1"));

    c.handle_key(&KeyInput::plain("Escape")).unwrap();
    assert_eq!(c.editor().ui.selected_robot_id, None);
}

#[test]
fn test_delete_key_removes_selected_robot() {
    let mut c = controller();
    c.edit(|e| e.add_robot(robot("r1", 0.0, 0.0))).unwrap();
    c.edit(|e| e.add_waypoint("r1", 1.0, 1.0)).unwrap();
    c.set_mode(EditorMode::Robot);

    let outcome = c.handle_key(&KeyInput::plain("Delete")).unwrap();
    assert_eq!(
        outcome,
        Some(ActionOutcome::Applied(EditorAction::DeleteRobot("r1".to_string())))
    );
    assert!(c.editor().robots.is_empty());
    assert!(c.editor().waypoints.is_empty());
}

#[test]
fn test_ctrl_s_exports_json() {
    let mut c = controller();
    c.edit(|e| e.add_robot(robot("r1", 0.0, 0.0))).unwrap();

    let Some(ActionOutcome::Exported(json)) = c.handle_key(&KeyInput::with_ctrl("s")).unwrap() else {
        panic!("expected an export");
    };
    assert!(json.contains("\"r1\""));
    assert_eq!(
        c.handle_key(&KeyInput::with_ctrl("o")).unwrap(),
        Some(ActionOutcome::ImportRequested)
    );
}

#[test]
fn test_rejected_edits_are_logged() {
    let logger = MemoryLogger::new();
    let mut c = EditorController::new(GreenhouseEditor::default(), EditorSettings::default(), logger.clone());

    assert!(c.delete_robot("ghost").is_err());
    assert_eq!(logger.messages_at(LogLevel::Warn).len(), 1);
}

#[test]
fn test_invalid_settings_are_rejected() {
    let mut c = controller();
    let bad = EditorSettings {
        step_size: 0.0,
        ..EditorSettings::default()
    };
    assert!(c.update_settings(bad).is_err());
    assert_eq!(c.settings().step_size, 0.005);

    let faster = EditorSettings {
        step_size: 0.01,
        close_threshold: 1.0,
        ..EditorSettings::default()
    };
    c.update_settings(faster).unwrap();
    assert_eq!(c.simulator().step_size(), 0.01);
    assert_eq!(c.drawing().close_threshold(), 1.0);
}

#[test]
fn test_settings_change_keeps_drawing() {
    let mut c = controller();
    c.set_mode(EditorMode::Zone);
    c.floor_click(0.0, 0.0).unwrap();
    c.floor_click(5.0, 0.0).unwrap();

    let settings = EditorSettings {
        step_size: 0.01,
        ..EditorSettings::default()
    };
    c.update_settings(settings).unwrap();
    assert!(c.drawing().is_drawing());
    assert_eq!(c.drawing().points().len(), 2);

    // a wider threshold applies to the very next click
    let settings = EditorSettings {
        close_threshold: 3.0,
        ..EditorSettings::default()
    };
    c.update_settings(settings).unwrap();
    assert_eq!(c.drawing().points().len(), 2);
    assert_eq!(c.floor_click(5.0, 5.0).unwrap(), FloorClick::ZonePointAdded { count: 3 });

    let FloorClick::ZoneCreated(zone_id) = c.floor_click(2.0, 0.0).unwrap() else {
        panic!("expected the click within the new threshold to close the zone");
    };
    assert_eq!(c.editor().zone(&zone_id).unwrap().points.len(), 3);
}

#[test]
fn test_status_projection() {
    let mut c = controller();
    c.edit(|e| e.add_robot(robot("r1", 0.0, 0.0))).unwrap();
    c.edit(|e| e.add_zone(zone("z1", &[]))).unwrap();

    let status = c.status();
    assert_eq!(status.robot_count, 1);
    assert_eq!(status.zone_count, 1);
    assert_eq!(status.selected_zone_name.as_deref(), Some("Z1"));
    assert_eq!(status.selected_robot_name, None);
    assert!(!status.is_playing);
}
