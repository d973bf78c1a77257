//! Data-driven game balance
//!
//! Defaults come from [`crate::consts`]; a JSON override can be loaded for
//! playtesting without touching the simulation code (`empanada-rush <seed>
//! <tuning.json>` on native).

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};

/// Gameplay balance knobs read by the simulation every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Customer walk speed at level 1 (units per frame)
    pub base_speed: f32,
    /// Fractional speed increase per level above 1
    pub level_speed_step: f32,
    /// Speed jitter range applied at spawn
    pub speed_jitter_min: f32,
    pub speed_jitter_max: f32,
    pub retreat_speed: f32,

    pub spawn_interval_base_ms: f64,
    pub spawn_interval_step_ms: f64,
    pub spawn_interval_min_ms: f64,

    pub empanada_speed: f32,
    pub player_step: f32,

    pub tip_drop_chance: f64,
    pub tip_lifetime_ms: f64,
    pub tip_fade_start_ms: f64,
    pub pickup_radius: f32,
    pub floating_score_duration_ms: f64,

    pub starting_lives: u32,
    pub customers_per_level: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            level_speed_step: LEVEL_SPEED_STEP,
            speed_jitter_min: 0.8,
            speed_jitter_max: 1.2,
            retreat_speed: RETREAT_SPEED,

            spawn_interval_base_ms: SPAWN_INTERVAL_BASE_MS,
            spawn_interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            spawn_interval_min_ms: SPAWN_INTERVAL_MIN_MS,

            empanada_speed: EMPANADA_SPEED,
            player_step: PLAYER_STEP,

            tip_drop_chance: TIP_DROP_CHANCE,
            tip_lifetime_ms: TIP_LIFETIME_MS,
            tip_fade_start_ms: TIP_FADE_START_MS,
            pickup_radius: PICKUP_RADIUS,
            floating_score_duration_ms: FLOATING_SCORE_DURATION_MS,

            starting_lives: STARTING_LIVES,
            customers_per_level: CUSTOMERS_PER_LEVEL,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read an override file from disk
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(GameError::InvalidTuning(msg.to_string()));

        let positive = |v: f32| v > 0.0;
        if ![self.base_speed, self.retreat_speed, self.empanada_speed, self.player_step]
            .into_iter()
            .all(positive)
        {
            return invalid("speeds and steps must be positive");
        }
        if !(self.level_speed_step >= 0.0 && self.pickup_radius >= 0.0) {
            return invalid("level speed step and pickup radius cannot be negative");
        }
        if !(self.speed_jitter_min > 0.0 && self.speed_jitter_min <= self.speed_jitter_max) {
            return invalid("speed jitter range must be positive and ordered");
        }
        if !(self.spawn_interval_min_ms > 0.0
            && self.spawn_interval_min_ms <= self.spawn_interval_base_ms)
        {
            return invalid("spawn interval floor must be positive and below the base");
        }
        if !(0.0..=1.0).contains(&self.tip_drop_chance) {
            return invalid("tip drop chance must be a probability");
        }
        if !(self.tip_fade_start_ms >= 0.0 && self.tip_fade_start_ms < self.tip_lifetime_ms) {
            return invalid("tips must start fading before they expire");
        }
        if self.floating_score_duration_ms.is_nan() || self.floating_score_duration_ms <= 0.0 {
            return invalid("floating score duration must be positive");
        }
        if self.starting_lives == 0 {
            return invalid("a session needs at least one life");
        }
        if self.customers_per_level == 0 {
            return invalid("customers per level must be at least 1");
        }
        Ok(())
    }

    /// Time between spawn attempts at `level`, never below the floor
    pub fn spawn_interval_ms(&self, level: u32) -> f64 {
        (self.spawn_interval_base_ms - level as f64 * self.spawn_interval_step_ms)
            .max(self.spawn_interval_min_ms)
    }

    /// Level-scaled speed before jitter
    pub fn level_speed(&self, level: u32) -> f32 {
        self.base_speed * (1.0 + level.saturating_sub(1) as f32 * self.level_speed_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_interval_decreases_to_floor() {
        let tuning = Tuning::default();
        assert_eq!(tuning.spawn_interval_ms(1), 1850.0);
        assert_eq!(tuning.spawn_interval_ms(2), 1700.0);
        assert_eq!(tuning.spawn_interval_ms(8), 800.0);
        assert_eq!(tuning.spawn_interval_ms(30), 800.0);
    }

    #[test]
    fn test_level_speed() {
        let tuning = Tuning::default();
        assert!((tuning.level_speed(1) - 1.5).abs() < 1e-6);
        assert!((tuning.level_speed(2) - 1.68).abs() < 1e-5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 5 }"#).unwrap();
        assert_eq!(tuning.starting_lives, 5);
        assert_eq!(tuning.customers_per_level, CUSTOMERS_PER_LEVEL);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/nonexistent/empanada-tuning.json").unwrap_err();
        assert!(matches!(err, GameError::IoError(_)));
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let err = Tuning::from_json(r#"{ "tip_drop_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTuning(_)));

        let err = Tuning::from_json(r#"{ "speed_jitter_min": 2.0 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTuning(_)));

        let err = Tuning::from_json(r#"{ "customers_per_level": 0 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTuning(_)));

        let nan = Tuning {
            base_speed: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
        assert!(Tuning::default().validate().is_ok());

        let err = Tuning::from_json("not json").unwrap_err();
        assert!(matches!(err, GameError::SerdeError(_)));
    }
}
