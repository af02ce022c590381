//! Status icons for CLI output

use crate::domain::wait::is_failed_state;

/// Coarse classification of a lifecycle state or request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    Ready,
    Busy,
    Failed,
    Unknown,
}

impl StateClass {
    pub fn of(state: &str) -> Self {
        match state.to_ascii_uppercase().as_str() {
            "" => Self::Unknown,
            "AVAILABLE" | "ACTIVE" | "DONE" | "READY" => Self::Ready,
            s if is_failed_state(s) => Self::Failed,
            _ => Self::Busy,
        }
    }
}

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (resource ready, request done)
    pub const SUCCESS: &'static str = "✓";

    /// Error icon (failed state)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (busy, queued, provisioning)
    pub const PENDING: &'static str = "⏳";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    pub fn get_state_icon(state: &str) -> &'static str {
        match StateClass::of(state) {
            StateClass::Ready => Self::SUCCESS,
            StateClass::Busy => Self::PENDING,
            StateClass::Failed => Self::ERROR,
            StateClass::Unknown => Self::UNKNOWN,
        }
    }
}
