//! HUD text

use serde::Serialize;

use crate::session::GameSession;

/// Timer and best-time lines shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HudText {
    pub timer: String,
    pub best: String,
}

impl HudText {
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            timer: format_seconds(session.elapsed()),
            best: session
                .best_time()
                .map_or_else(|| "--".to_string(), format_seconds),
        }
    }
}

/// Seconds with two decimals, e.g. `12.34 s`
pub fn format_seconds(seconds: f32) -> String {
    format!("{:.2} s", seconds)
}
