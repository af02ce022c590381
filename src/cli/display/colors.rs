//! Color theme for CLI output

use super::icons::StateClass;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color for a lifecycle state or request status
    pub fn get_state_color(&self, state: &str) -> TableColor {
        match StateClass::of(state) {
            StateClass::Ready => self.success,
            StateClass::Busy => self.warning,
            StateClass::Failed => self.error,
            StateClass::Unknown => self.muted,
        }
    }
}
