//! Game state and core simulation types
//!
//! Everything a session needs lives on [`GameState`]: counters, entity
//! collections, the id counter, spawn clock and the seeded RNG.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::tuning::Tuning;

/// Top-level session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, rules on screen
    Start,
    /// Simulation running
    Playing,
    /// Simulation frozen, score entry
    GameOver,
}

/// The player's avatar behind the counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub lane: usize,
    pub x: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: PLAYER_START_LANE,
            x: MAX_X,
        }
    }
}

impl Player {
    /// Move up (negative) or down (positive) by `delta` lanes.
    /// Returns false when already at the boundary.
    pub fn move_lane(&mut self, delta: i32) -> bool {
        let target = (self.lane as i64 + delta as i64).clamp(0, LANE_COUNT as i64 - 1) as usize;
        let moved = target != self.lane;
        self.lane = target;
        moved
    }

    /// Move horizontally, clamped to [MIN_X, MAX_X]
    pub fn strafe(&mut self, dx: f32) -> bool {
        let target = (self.x + dx).clamp(MIN_X, MAX_X);
        let moved = target != self.x;
        self.x = target;
        moved
    }

    /// Close enough to the serving window to throw
    pub fn at_serving_window(&self) -> bool {
        (MAX_X - self.x).abs() <= SERVE_TOLERANCE
    }
}

/// Customer mood; Walking -> Satisfied is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerState {
    Walking,
    Satisfied,
}

/// A hungry customer walking toward the truck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub speed: f32,
    pub state: CustomerState,
    pub points: u32,
    /// Set once the customer has dropped its (only) tip
    pub dropped_tip: bool,
}

impl Customer {
    pub fn new(id: u32, lane: usize, speed: f32) -> Self {
        Self {
            id,
            lane,
            x: SPAWN_X,
            speed,
            state: CustomerState::Walking,
            points: points_for_speed(speed),
            dropped_tip: false,
        }
    }

    pub fn is_walking(&self) -> bool {
        self.state == CustomerState::Walking
    }

    /// Returns false if the customer was already satisfied
    pub fn satisfy(&mut self) -> bool {
        if self.is_walking() {
            self.state = CustomerState::Satisfied;
            true
        } else {
            false
        }
    }
}

/// Faster customers are worth more
pub fn points_for_speed(speed: f32) -> u32 {
    (10.0 + speed * 5.0).round().max(0.0) as u32
}

/// Cosmetic filling, cycles with the projectile id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmpanadaFlavor {
    Beef,
    Chicken,
    Cheese,
}

impl EmpanadaFlavor {
    pub fn for_id(id: u32) -> Self {
        match id % 3 {
            0 => EmpanadaFlavor::Beef,
            1 => EmpanadaFlavor::Chicken,
            _ => EmpanadaFlavor::Cheese,
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            EmpanadaFlavor::Beef => "empanada-beef.png",
            EmpanadaFlavor::Chicken => "empanada-chicken.png",
            EmpanadaFlavor::Cheese => "empanada-cheese.png",
        }
    }
}

/// A thrown empanada sliding down a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empanada {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub flavor: EmpanadaFlavor,
}

/// Tip denominations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipKind {
    Coin,
    Bill,
    Bag,
}

impl TipKind {
    pub const ALL: [TipKind; 3] = [TipKind::Coin, TipKind::Bill, TipKind::Bag];

    pub fn value(&self) -> u32 {
        match self {
            TipKind::Coin => 5,
            TipKind::Bill => 10,
            TipKind::Bag => 20,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TipKind::Coin => "🪙",
            TipKind::Bill => "💵",
            TipKind::Bag => "💰",
        }
    }
}

/// A tip left on the ground by a satisfied customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tip {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub kind: TipKind,
    pub created_at_ms: f64,
}

impl Tip {
    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    pub fn is_expired(&self, now_ms: f64, lifetime_ms: f64) -> bool {
        now_ms - self.created_at_ms >= lifetime_ms
    }

    /// 1.0 until the fade starts, then linear down to 0.0 at expiry
    pub fn opacity(&self, now_ms: f64, fade_start_ms: f64, lifetime_ms: f64) -> f32 {
        let age = now_ms - self.created_at_ms;
        if age <= fade_start_ms {
            return 1.0;
        }
        let fade_len = (lifetime_ms - fade_start_ms).max(f64::EPSILON);
        (1.0 - (age - fade_start_ms) / fade_len).clamp(0.0, 1.0) as f32
    }
}

/// "+10" popup shown where a tip was collected (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingScore {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub value: u32,
    pub created_at_ms: f64,
}

impl FloatingScore {
    /// Animation progress in [0, 1]
    pub fn progress(&self, now_ms: f64, duration_ms: f64) -> f32 {
        ((now_ms - self.created_at_ms) / duration_ms.max(f64::EPSILON)).clamp(0.0, 1.0) as f32
    }
}

/// Something that happened during input handling or a tick.
/// Hosts use these for audio and HUD effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    CustomerSpawned { id: u32, lane: usize },
    CustomerServed { id: u32, points: u32 },
    LevelUp { level: u32 },
    EmpanadaMissed { id: u32 },
    CustomerReachedCounter { id: u32 },
    LivesLost { count: u32, remaining: u32 },
    TipDropped { id: u32, value: u32 },
    TipCollected { id: u32, value: u32 },
    GameOver { score: u64 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Always validated; see [`GameState::with_tuning`]
    pub(crate) tuning: Tuning,
    /// Seed of the current session's RNG
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub customers_served: u32,
    pub player: Player,
    pub customers: Vec<Customer>,
    pub empanadas: Vec<Empanada>,
    pub tips: Vec<Tip>,
    pub floating_scores: Vec<FloatingScore>,
    /// Timestamp of the last successful spawn
    pub last_spawn_ms: f64,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create an idle session (phase `Start`) with default tuning
    pub fn new(seed: u64) -> Self {
        Self::fresh(seed, Tuning::default())
    }

    /// Create an idle session with custom balance. Rejects tuning the
    /// simulation cannot run with.
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self> {
        tuning.validate()?;
        Ok(Self::fresh(seed, tuning))
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    fn fresh(seed: u64, tuning: Tuning) -> Self {
        let lives = tuning.starting_lives;
        Self {
            tuning,
            seed,
            phase: GamePhase::Start,
            score: 0,
            lives,
            level: 1,
            customers_served: 0,
            player: Player::default(),
            customers: Vec::new(),
            empanadas: Vec::new(),
            tips: Vec::new(),
            floating_scores: Vec::new(),
            last_spawn_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start -> Playing. Ignored in any other phase.
    pub fn start(&mut self, seed: u64, now_ms: f64) -> bool {
        if self.phase != GamePhase::Start {
            return false;
        }
        self.reset(seed, now_ms);
        true
    }

    /// GameOver -> Playing with a full reset
    pub fn play_again(&mut self, seed: u64, now_ms: f64) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.reset(seed, now_ms);
        true
    }

    /// GameOver -> Start, back to the rules screen
    pub fn back_to_menu(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Start;
        true
    }

    fn reset(&mut self, seed: u64, now_ms: f64) {
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::fresh(seed, tuning);
        self.last_spawn_ms = now_ms;
        self.phase = GamePhase::Playing;
        log::info!("Session started (seed {})", seed);
    }

    /// Count a served customer. Returns the new level on a level-up.
    pub fn serve_customer(&mut self) -> Option<u32> {
        self.customers_served += 1;
        if self.customers_served % self.tuning.customers_per_level == 0 {
            self.level += 1;
            log::info!("Level up: {} ({} served)", self.level, self.customers_served);
            Some(self.level)
        } else {
            None
        }
    }

    /// Saturating life loss; returns how many lives were actually removed
    pub fn lose_lives(&mut self, count: u32) -> u32 {
        let lost = count.min(self.lives);
        self.lives -= lost;
        lost
    }

    /// Spawn an empanada behind the player. Callers gate on phase/position.
    pub fn spawn_empanada(&mut self) -> u32 {
        let id = self.next_entity_id();
        self.empanadas.push(Empanada {
            id,
            lane: self.player.lane,
            x: self.player.x - THROW_OFFSET,
            flavor: EmpanadaFlavor::for_id(id),
        });
        id
    }

    /// Walking customers currently in `lane`
    pub fn walking_in_lane(&self, lane: usize) -> usize {
        self.customers
            .iter()
            .filter(|c| c.lane == lane && c.is_walking())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_lane_clamps() {
        let mut player = Player::default();
        player.lane = 0;
        assert!(!player.move_lane(-1));
        assert_eq!(player.lane, 0);
        player.lane = LANE_COUNT - 1;
        assert!(!player.move_lane(1));
        assert_eq!(player.lane, LANE_COUNT - 1);
        assert!(player.move_lane(-1));
        assert_eq!(player.lane, LANE_COUNT - 2);
    }

    #[test]
    fn test_player_strafe_clamps() {
        let mut player = Player::default();
        assert!(!player.strafe(PLAYER_STEP));
        assert_eq!(player.x, MAX_X);
        assert!(player.strafe(-PLAYER_STEP));
        assert!(!player.at_serving_window());
        player.strafe(-10_000.0);
        assert_eq!(player.x, MIN_X);
    }

    #[test]
    fn test_points_scale_with_speed() {
        assert_eq!(points_for_speed(1.5), 18);
        assert_eq!(points_for_speed(2.0), 20);
        assert!(points_for_speed(3.0) > points_for_speed(1.0));
    }

    #[test]
    fn test_customer_satisfy_once() {
        let mut customer = Customer::new(1, 0, 1.5);
        assert!(customer.satisfy());
        assert!(!customer.satisfy());
        assert_eq!(customer.state, CustomerState::Satisfied);
    }

    #[test]
    fn test_tip_fade_and_expiry() {
        let tip = Tip {
            id: 1,
            lane: 0,
            x: 100.0,
            kind: TipKind::Bill,
            created_at_ms: 1000.0,
        };
        assert_eq!(tip.opacity(2000.0, 3500.0, 5000.0), 1.0);
        assert!((tip.opacity(5250.0, 3500.0, 5000.0) - 0.5).abs() < 1e-6);
        assert!(!tip.is_expired(5999.0, 5000.0));
        assert!(tip.is_expired(6000.0, 5000.0));
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Start);
        assert!(!state.play_again(7, 0.0));
        assert!(state.start(7, 500.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.last_spawn_ms, 500.0);
        assert!(!state.start(7, 0.0));

        state.score = 99;
        state.lives = 0;
        state.phase = GamePhase::GameOver;
        assert!(state.play_again(8, 1000.0));
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.level, 1);
        assert_eq!(state.player, Player::default());
        assert_eq!(state.seed, 8);

        state.phase = GamePhase::GameOver;
        assert!(state.back_to_menu());
        assert_eq!(state.phase, GamePhase::Start);
    }

    #[test]
    fn test_reset_keeps_tuning() {
        let tuning = Tuning {
            starting_lives: 5,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(1, tuning).unwrap();
        state.start(1, 0.0);
        assert_eq!(state.lives, 5);
        assert_eq!(state.tuning().starting_lives, 5);
    }

    #[test]
    fn test_unrunnable_tuning_rejected() {
        let no_levels = Tuning {
            customers_per_level: 0,
            ..Default::default()
        };
        assert!(matches!(
            GameState::with_tuning(1, no_levels),
            Err(crate::GameError::InvalidTuning(_))
        ));

        let inverted_jitter = Tuning {
            speed_jitter_min: 1.5,
            speed_jitter_max: 0.5,
            ..Default::default()
        };
        assert!(GameState::with_tuning(1, inverted_jitter).is_err());
    }

    #[test]
    fn test_level_every_ten_served() {
        let mut state = GameState::new(1);
        for _ in 0..9 {
            assert_eq!(state.serve_customer(), None);
        }
        assert_eq!(state.serve_customer(), Some(2));
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_lose_lives_saturates() {
        let mut state = GameState::new(1);
        assert_eq!(state.lose_lives(5), 3);
        assert_eq!(state.lives, 0);
        assert_eq!(state.lose_lives(1), 0);
    }
}
