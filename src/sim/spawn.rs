//! Customer spawning
//!
//! Best-effort: at most one customer per tick, and only into lanes that still
//! have room for another walking customer at the current level.

use rand::Rng;

use super::state::{Customer, GameState};
use crate::consts::LANE_COUNT;

/// Lanes holding fewer walking customers than the current level allows
pub fn eligible_lanes(state: &GameState) -> Vec<usize> {
    let capacity = state.level as usize;
    (0..LANE_COUNT)
        .filter(|&lane| state.walking_in_lane(lane) < capacity)
        .collect()
}

/// Spawn a customer if the spawn interval has elapsed and a lane has room.
/// Returns the new customer's (id, lane).
pub fn try_spawn(state: &mut GameState, now_ms: f64) -> Option<(u32, usize)> {
    if now_ms - state.last_spawn_ms <= state.tuning.spawn_interval_ms(state.level) {
        return None;
    }

    let lanes = eligible_lanes(state);
    if lanes.is_empty() {
        // Full lanes are backpressure, not an error; retry next tick
        return None;
    }

    let lane = lanes[state.rng.random_range(0..lanes.len())];
    let jitter = state
        .rng
        .random_range(state.tuning.speed_jitter_min..=state.tuning.speed_jitter_max);
    let speed = state.tuning.level_speed(state.level) * jitter;

    let id = state.next_entity_id();
    let customer = Customer::new(id, lane, speed);
    log::debug!(
        "Spawned customer {} in lane {} (speed {:.2}, {} pts)",
        id,
        lane,
        speed,
        customer.points
    );
    state.customers.push(customer);
    state.last_spawn_ms = now_ms;
    Some((id, lane))
}
