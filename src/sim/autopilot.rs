//! Idle/demo mode - a simple bot that plays the game
//!
//! Produces one intent per frame from the current state. It defends the most
//! advanced customer first and only goes after tips when nobody is close.

use super::state::{GamePhase, GameState};
use crate::consts::SERVE_BOUNDARY_X;
use crate::input::Intent;

/// Customers further along than this pull the bot back to the window
const THREAT_X: f32 = SERVE_BOUNDARY_X * 0.5;

/// Pick the next intent, or None to idle this frame
pub fn next_intent(state: &GameState) -> Option<Intent> {
    if state.phase != GamePhase::Playing {
        return None;
    }
    let player = state.player;

    // Most advanced walking customer that isn't already covered by an empanada
    let threat = state
        .customers
        .iter()
        .filter(|c| c.is_walking())
        .filter(|c| {
            let in_flight = state.empanadas.iter().filter(|e| e.lane == c.lane).count();
            in_flight < state.walking_in_lane(c.lane)
        })
        .max_by(|a, b| a.x.total_cmp(&b.x));

    let safe = threat.is_none_or(|c| c.x < THREAT_X);

    if safe {
        let nearest_tip = state.tips.iter().min_by(|a, b| {
            let da = a.lane.abs_diff(player.lane) as f32 * 100.0 + (a.x - player.x).abs();
            let db = b.lane.abs_diff(player.lane) as f32 * 100.0 + (b.x - player.x).abs();
            da.total_cmp(&db)
        });
        if let Some(tip) = nearest_tip {
            return Some(step_toward(player.lane, tip.lane).unwrap_or(
                if tip.x < player.x {
                    Intent::StrafeLeft
                } else {
                    Intent::StrafeRight
                },
            ));
        }
    }

    if !player.at_serving_window() {
        return Some(Intent::StrafeRight);
    }

    let target = threat?;
    step_toward(player.lane, target.lane).or(Some(Intent::Throw))
}

fn step_toward(from: usize, to: usize) -> Option<Intent> {
    match to.cmp(&from) {
        std::cmp::Ordering::Less => Some(Intent::LaneUp),
        std::cmp::Ordering::Greater => Some(Intent::LaneDown),
        std::cmp::Ordering::Equal => None,
    }
}
