//! Empanada Rush - a lane-based food truck arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, game state)
//! - `input`: Key/button intents feeding the simulation
//! - `snapshot`: Read-only view consumed by the presentation layer
//! - `game`: Host-facing driver for the animation-frame loop
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `audio`: Sound cues for simulation events

pub mod audio;
pub mod error;
pub mod game;
pub mod highscores;
pub mod input;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::{GameError, Result};
pub use game::{FrameOutcome, Game};
pub use highscores::{HighScores, ScoreSink, ScoreSubmission};
pub use input::{Intent, KeyTracker};
pub use settings::Settings;
pub use snapshot::{Playfield, Snapshot};
pub use tuning::Tuning;

/// Game configuration constants (logical playfield units, milliseconds)
pub mod consts {
    /// Number of service lanes
    pub const LANE_COUNT: usize = 4;
    /// Lane the player starts each session in
    pub const PLAYER_START_LANE: usize = 1;

    /// Logical playfield size
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT_DESKTOP: f32 = 480.0;
    pub const GAME_HEIGHT_MOBILE: f32 = 640.0;

    /// Player horizontal range; the serving window sits at MAX_X
    pub const MIN_X: f32 = 40.0;
    pub const MAX_X: f32 = 720.0;
    /// How far from MAX_X the player may stand and still throw
    pub const SERVE_TOLERANCE: f32 = 20.0;
    /// Horizontal distance per strafe
    pub const PLAYER_STEP: f32 = 40.0;

    /// Customers enter here and leave once they retreat past it
    pub const SPAWN_X: f32 = -60.0;
    /// A walking customer reaching this line costs a life
    pub const SERVE_BOUNDARY_X: f32 = 640.0;
    /// Base customer walk speed (units per frame)
    pub const BASE_SPEED: f32 = 1.5;
    /// Per-level speed multiplier step
    pub const LEVEL_SPEED_STEP: f32 = 0.12;
    /// Satisfied customers walk back at this rate (units per frame)
    pub const RETREAT_SPEED: f32 = 3.0;
    /// Width of a customer's hit box, measured from its x
    pub const CUSTOMER_HIT_WIDTH: f32 = 50.0;

    /// Spawn interval at level 0 and its floor (ms)
    pub const SPAWN_INTERVAL_BASE_MS: f64 = 2000.0;
    pub const SPAWN_INTERVAL_STEP_MS: f64 = 150.0;
    pub const SPAWN_INTERVAL_MIN_MS: f64 = 800.0;

    /// Empanada travel speed (units per frame, leftward)
    pub const EMPANADA_SPEED: f32 = 12.0;
    /// Empanadas spawn this far behind (left of) the player
    pub const THROW_OFFSET: f32 = 30.0;
    /// An empanada whose next position is left of this has missed
    pub const LEFT_EDGE_X: f32 = -40.0;

    /// Per-frame chance a retreating customer drops its tip
    pub const TIP_DROP_CHANCE: f64 = 0.02;
    pub const TIP_LIFETIME_MS: f64 = 5000.0;
    /// Tips start fading this long after being dropped
    pub const TIP_FADE_START_MS: f64 = 3500.0;
    pub const PICKUP_RADIUS: f32 = 40.0;
    pub const FLOATING_SCORE_DURATION_MS: f64 = 1000.0;

    /// Session defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const CUSTOMERS_PER_LEVEL: u32 = 10;
}
