//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host time is passed in, never read
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{ProjectileHit, ProjectileResolution, collect_tips, resolve_projectiles};
pub use spawn::{eligible_lanes, try_spawn};
pub use state::{
    Customer, CustomerState, Empanada, EmpanadaFlavor, FloatingScore, GameEvent, GamePhase,
    GameState, Player, Tip, TipKind,
};
pub use tick::tick;
