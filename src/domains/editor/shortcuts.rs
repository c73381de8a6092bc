use super::state::{EditorMode, EditorUiState};

/// A key press as delivered by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    /// The focus was in a text input or text area.
    pub in_text_field: bool,
}

impl KeyInput {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    fn has_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    SetMode(EditorMode),
    DeleteRobot(String),
    DeleteZone(String),
    TogglePlayback,
    /// Cancel an in-progress zone drawing, or clear the selection if none.
    Escape,
    Export,
    RequestImport,
}

/// Map a key press to an editor action given the current UI state.
pub fn dispatch_key(input: &KeyInput, ui: &EditorUiState) -> Option<EditorAction> {
    if input.in_text_field {
        return None;
    }

    let key = input.key.to_lowercase();

    // Delete, playback and escape fire whether or not a modifier is held.
    match key.as_str() {
        "delete" | "backspace" => return delete_target(ui),
        " " | "space" => return Some(EditorAction::TogglePlayback),
        "escape" => return Some(EditorAction::Escape),
        _ => {}
    }

    if input.has_modifier() {
        return match key.as_str() {
            "s" => Some(EditorAction::Export),
            "o" => Some(EditorAction::RequestImport),
            _ => None,
        };
    }

    match key.as_str() {
        "v" => Some(EditorAction::SetMode(EditorMode::View)),
        "e" => Some(EditorAction::SetMode(EditorMode::Edit)),
        "r" => Some(EditorAction::SetMode(EditorMode::Robot)),
        "p" => Some(EditorAction::SetMode(EditorMode::Path)),
        "z" => Some(EditorAction::SetMode(EditorMode::Zone)),
        _ => None,
    }
}

fn delete_target(ui: &EditorUiState) -> Option<EditorAction> {
    match (ui.mode, &ui.selected_robot_id, &ui.selected_zone_id) {
        (EditorMode::Robot | EditorMode::Edit, Some(robot_id), _) => {
            Some(EditorAction::DeleteRobot(robot_id.clone()))
        }
        (EditorMode::Zone, _, Some(zone_id)) => Some(EditorAction::DeleteZone(zone_id.clone())),
        _ => None,
    }
}
