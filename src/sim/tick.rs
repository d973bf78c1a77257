//! Per-frame simulation step
//!
//! Core game loop that advances the simulation by one animation frame.
//! Step order is fixed: spawn, resolve empanadas, apply misses, collect tips,
//! move customers, move empanadas, expire tips, check for game over.

use std::collections::HashSet;

use rand::Rng;

use super::collision::{collect_tips, resolve_projectiles};
use super::spawn::try_spawn;
use super::state::{CustomerState, FloatingScore, GameEvent, GamePhase, GameState, Tip, TipKind};
use crate::consts::{MIN_X, SERVE_BOUNDARY_X, SPAWN_X};

/// Advance the game by one frame at host time `now_ms`.
///
/// Does nothing unless the session is playing. Returns what happened so the
/// host can play sounds or flash the HUD.
pub fn tick(state: &mut GameState, now_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    // 1. Spawn
    if let Some((id, lane)) = try_spawn(state, now_ms) {
        events.push(GameEvent::CustomerSpawned { id, lane });
    }

    // Input may move the player between frames; read it once per tick
    let player = state.player;

    // 2. Empanadas vs customers, planned against the current snapshot
    let resolution = resolve_projectiles(
        &state.empanadas,
        &state.customers,
        state.tuning.empanada_speed,
    );
    for hit in &resolution.hits {
        let Some(customer) = state.customers.iter_mut().find(|c| c.id == hit.customer_id) else {
            continue;
        };
        if !customer.satisfy() {
            continue;
        }
        let (id, points) = (customer.id, customer.points);
        state.score += points as u64;
        events.push(GameEvent::CustomerServed { id, points });
        if let Some(level) = state.serve_customer() {
            events.push(GameEvent::LevelUp { level });
        }
    }
    for &id in &resolution.missed {
        events.push(GameEvent::EmpanadaMissed { id });
    }

    // 3. Misses cost lives as one batch
    let lost = state.lose_lives(resolution.miss_count());
    if lost > 0 {
        events.push(GameEvent::LivesLost {
            count: lost,
            remaining: state.lives,
        });
    }

    // 4. Player vs tips
    let collected = collect_tips(&state.tips, player, state.tuning.pickup_radius);
    if !collected.is_empty() {
        let collected: HashSet<u32> = collected.into_iter().collect();
        let mut popups = Vec::new();
        for tip in state.tips.iter().filter(|t| collected.contains(&t.id)) {
            state.score += tip.value() as u64;
            events.push(GameEvent::TipCollected {
                id: tip.id,
                value: tip.value(),
            });
            popups.push((tip.lane, tip.x, tip.value()));
        }
        state.tips.retain(|t| !collected.contains(&t.id));
        for (lane, x, value) in popups {
            let id = state.next_entity_id();
            state.floating_scores.push(FloatingScore {
                id,
                lane,
                x,
                value,
                created_at_ms: now_ms,
            });
        }
    }

    // 5. Customers walk in or retreat
    let mut reached_counter = Vec::new();
    let mut departed = Vec::new();
    let mut dropped_tips = Vec::new();
    let drop_chance = state.tuning.tip_drop_chance;
    let retreat_speed = state.tuning.retreat_speed;
    // Left of this the player can never reach a tip
    let reachable_x = MIN_X - state.tuning.pickup_radius;
    for customer in &mut state.customers {
        match customer.state {
            CustomerState::Walking => {
                customer.x += customer.speed;
                if customer.x >= SERVE_BOUNDARY_X {
                    reached_counter.push(customer.id);
                }
            }
            CustomerState::Satisfied => {
                customer.x -= retreat_speed;
                if !customer.dropped_tip
                    && customer.x >= reachable_x
                    && state.rng.random_bool(drop_chance)
                {
                    customer.dropped_tip = true;
                    let kind = TipKind::ALL[state.rng.random_range(0..TipKind::ALL.len())];
                    dropped_tips.push((customer.lane, customer.x, kind));
                }
                if customer.x < SPAWN_X {
                    departed.push(customer.id);
                }
            }
        }
    }
    for (lane, x, kind) in dropped_tips {
        let id = state.next_entity_id();
        state.tips.push(Tip {
            id,
            lane,
            x,
            kind,
            created_at_ms: now_ms,
        });
        events.push(GameEvent::TipDropped {
            id,
            value: kind.value(),
        });
    }
    if !reached_counter.is_empty() || !departed.is_empty() {
        state
            .customers
            .retain(|c| !reached_counter.contains(&c.id) && !departed.contains(&c.id));
    }
    for &id in &reached_counter {
        events.push(GameEvent::CustomerReachedCounter { id });
    }
    let lost = state.lose_lives(reached_counter.len() as u32);
    if lost > 0 {
        events.push(GameEvent::LivesLost {
            count: lost,
            remaining: state.lives,
        });
    }

    // 6. Empanadas still in flight keep sliding
    let spent = resolution.spent();
    let empanada_speed = state.tuning.empanada_speed;
    state.empanadas.retain(|e| !spent.contains(&e.id));
    for empanada in &mut state.empanadas {
        empanada.x -= empanada_speed;
    }

    // 7. Timed expiry
    let tip_lifetime = state.tuning.tip_lifetime_ms;
    state.tips.retain(|t| !t.is_expired(now_ms, tip_lifetime));
    let popup_duration = state.tuning.floating_score_duration_ms;
    state
        .floating_scores
        .retain(|f| now_ms - f.created_at_ms < popup_duration);

    // 8. Game over
    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over: score {}, level {}, {} served",
            state.score,
            state.level,
            state.customers_served
        );
        events.push(GameEvent::GameOver { score: state.score });
    }

    events
}
