//! Input controller
//!
//! Keyboard keys and on-screen buttons both turn into an [`Intent`], and every
//! intent goes through [`apply_intent`]. Invalid intents (moving past a lane
//! boundary, throwing away from the window) are silently ignored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sim::{GamePhase, GameState};

/// One discrete player action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    LaneUp,
    LaneDown,
    StrafeLeft,
    StrafeRight,
    Throw,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::LaneUp,
        Intent::LaneDown,
        Intent::StrafeLeft,
        Intent::StrafeRight,
        Intent::Throw,
    ];

    /// Keyboard binding, using `KeyboardEvent.key` names
    pub fn from_key(key: &str) -> Option<Self> {
        match normalize_key(key).as_str() {
            "ArrowUp" | "w" => Some(Intent::LaneUp),
            "ArrowDown" | "s" => Some(Intent::LaneDown),
            "ArrowLeft" | "a" => Some(Intent::StrafeLeft),
            "ArrowRight" | "d" => Some(Intent::StrafeRight),
            "Space" | "Enter" => Some(Intent::Throw),
            _ => None,
        }
    }

    /// On-screen control binding (`data-intent` attribute values)
    pub fn from_control(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.control_name() == name)
    }

    pub fn control_name(&self) -> &'static str {
        match self {
            Intent::LaneUp => "up",
            Intent::LaneDown => "down",
            Intent::StrafeLeft => "left",
            Intent::StrafeRight => "right",
            Intent::Throw => "throw",
        }
    }
}

/// Fold the names browsers report for the same physical key together
fn normalize_key(key: &str) -> String {
    match key {
        " " | "Spacebar" => "Space".to_string(),
        k if k.chars().count() == 1 => k.to_lowercase(),
        k => k.to_string(),
    }
}

/// Pressed-key set: a held key fires once, OS auto-repeat is ignored until
/// the key is released
#[derive(Default, Debug, Clone)]
pub struct KeyTracker {
    pressed: HashSet<String>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the intent only on the press edge of a bound key
    pub fn key_down(&mut self, key: &str) -> Option<Intent> {
        let intent = Intent::from_key(key)?;
        if self.pressed.insert(normalize_key(key)) {
            Some(intent)
        } else {
            None
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed.remove(&normalize_key(key));
    }

    /// Forget held keys (window blur drops key-up events)
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

/// Apply an intent to the session. Returns true if anything changed.
pub fn apply_intent(state: &mut GameState, intent: Intent) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }

    let step = state.tuning.player_step;
    match intent {
        Intent::LaneUp => state.player.move_lane(-1),
        Intent::LaneDown => state.player.move_lane(1),
        Intent::StrafeLeft => state.player.strafe(-step),
        Intent::StrafeRight => state.player.strafe(step),
        Intent::Throw => {
            if !state.player.at_serving_window() {
                return false;
            }
            state.spawn_empanada();
            true
        }
    }
}
