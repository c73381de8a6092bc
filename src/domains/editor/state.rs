use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    View,
    Edit,
    Robot,
    Path,
    Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelTab {
    #[default]
    Properties,
    Robots,
    Paths,
    Zones,
    Settings,
}

/// Transient editor UI state. Never part of a map snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorUiState {
    pub mode: EditorMode,
    pub selected_robot_id: Option<String>,
    pub selected_zone_id: Option<String>,
    pub is_playing: bool,
    pub show_grid: bool,
    pub show_dimensions: bool,
    pub active_panel: PanelTab,
}

impl Default for EditorUiState {
    fn default() -> Self {
        Self {
            mode: EditorMode::View,
            selected_robot_id: None,
            selected_zone_id: None,
            is_playing: false,
            show_grid: true,
            show_dimensions: false,
            active_panel: PanelTab::Properties,
        }
    }
}

impl EditorUiState {
    /// Robot and zone selection are mutually exclusive. Selecting something
    /// opens its panel; clearing keeps the current panel.
    pub fn select_robot(&mut self, robot_id: Option<String>) {
        if robot_id.is_some() {
            self.active_panel = PanelTab::Robots;
        }
        self.selected_robot_id = robot_id;
        self.selected_zone_id = None;
    }

    pub fn select_zone(&mut self, zone_id: Option<String>) {
        if zone_id.is_some() {
            self.active_panel = PanelTab::Zones;
        }
        self.selected_zone_id = zone_id;
        self.selected_robot_id = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected_robot_id = None;
        self.selected_zone_id = None;
    }
}
