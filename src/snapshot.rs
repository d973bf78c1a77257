//! Read-only view of a session for the presentation layer
//!
//! Positions stay in logical playfield units; [`Playfield::to_percent`] maps
//! them onto a percentage layout so the renderer never deals in pixels.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::sim::{CustomerState, GamePhase, GameState, Player};

/// Logical playfield size; height depends on the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(mobile: bool) -> Self {
        Self {
            width: GAME_WIDTH,
            height: if mobile {
                GAME_HEIGHT_MOBILE
            } else {
                GAME_HEIGHT_DESKTOP
            },
        }
    }

    pub fn lane_height(&self) -> f32 {
        self.height / LANE_COUNT as f32
    }

    /// Logical y of a lane's center line
    pub fn lane_center_y(&self, lane: usize) -> f32 {
        (lane as f32 + 0.5) * self.lane_height()
    }

    /// (left %, top %) for an entity at `x` in `lane`
    pub fn to_percent(&self, lane: usize, x: f32) -> Vec2 {
        Vec2::new(
            x / self.width * 100.0,
            self.lane_center_y(lane) / self.height * 100.0,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub satisfied: bool,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmpanadaView {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub image: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TipView {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub value: u32,
    pub emoji: &'static str,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatingScoreView {
    pub id: u32,
    pub lane: usize,
    pub x: f32,
    pub value: u32,
    /// 0 when spawned, 1 when gone
    pub progress: f32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub playfield: Playfield,
    pub phase: GamePhase,
    pub player: Player,
    pub customers: Vec<CustomerView>,
    pub empanadas: Vec<EmpanadaView>,
    pub tips: Vec<TipView>,
    pub floating_scores: Vec<FloatingScoreView>,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub customers_served: u32,
}

impl Snapshot {
    pub fn capture(state: &GameState, playfield: Playfield, now_ms: f64) -> Self {
        let tuning = &state.tuning;
        Self {
            playfield,
            phase: state.phase,
            player: state.player,
            customers: state
                .customers
                .iter()
                .map(|c| CustomerView {
                    id: c.id,
                    lane: c.lane,
                    x: c.x,
                    satisfied: c.state == CustomerState::Satisfied,
                    points: c.points,
                })
                .collect(),
            empanadas: state
                .empanadas
                .iter()
                .map(|e| EmpanadaView {
                    id: e.id,
                    lane: e.lane,
                    x: e.x,
                    image: e.flavor.image(),
                })
                .collect(),
            tips: state
                .tips
                .iter()
                // The tick removes expired tips; frames rendered between
                // ticks must not show them either
                .filter(|t| !t.is_expired(now_ms, tuning.tip_lifetime_ms))
                .map(|t| TipView {
                    id: t.id,
                    lane: t.lane,
                    x: t.x,
                    value: t.value(),
                    emoji: t.kind.emoji(),
                    opacity: t.opacity(now_ms, tuning.tip_fade_start_ms, tuning.tip_lifetime_ms),
                })
                .collect(),
            floating_scores: state
                .floating_scores
                .iter()
                .map(|f| FloatingScoreView {
                    id: f.id,
                    lane: f.lane,
                    x: f.x,
                    value: f.value,
                    progress: f.progress(now_ms, tuning.floating_score_duration_ms),
                })
                .collect(),
            score: state.score,
            lives: state.lives,
            level: state.level,
            customers_served: state.customers_served,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Tip, TipKind};

    #[test]
    fn test_percent_layout() {
        let field = Playfield::new(false);
        let pos = field.to_percent(0, GAME_WIDTH / 2.0);
        assert!((pos.x - 50.0).abs() < 1e-4);
        assert!((pos.y - 12.5).abs() < 1e-4);

        let mobile = Playfield::new(true);
        assert_eq!(mobile.height, GAME_HEIGHT_MOBILE);
        assert!((mobile.to_percent(LANE_COUNT - 1, 0.0).y - 87.5).abs() < 1e-4);
    }

    #[test]
    fn test_snapshot_hides_expired_tips() {
        let mut state = GameState::new(1);
        state.start(1, 0.0);
        state.tips.push(Tip {
            id: 1,
            lane: 0,
            x: 10.0,
            kind: TipKind::Bag,
            created_at_ms: 0.0,
        });
        let field = Playfield::new(false);

        let snap = Snapshot::capture(&state, field, 4000.0);
        assert_eq!(snap.tips.len(), 1);
        assert_eq!(snap.tips[0].emoji, "💰");
        assert!(snap.tips[0].opacity < 1.0);

        let snap = Snapshot::capture(&state, field, TIP_LIFETIME_MS);
        assert!(snap.tips.is_empty());
    }

    #[test]
    fn test_snapshot_json() {
        let mut state = GameState::new(1);
        state.start(1, 0.0);
        let json = Snapshot::capture(&state, Playfield::new(true), 0.0)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "Playing");
        assert_eq!(value["lives"], 3);
        assert_eq!(value["player"]["lane"], PLAYER_START_LANE);
    }
}
