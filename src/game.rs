//! Host-facing game driver
//!
//! Wraps a [`GameState`] with everything the animation-frame loop needs:
//! key tracking, idle mode, FPS, the leaderboard, and the stop/teardown rules
//! that tell the host when to stop requesting frames.

use crate::error::{GameError, Result};
use crate::highscores::{HighScores, ScoreSink, ScoreSubmission};
use crate::input::{Intent, KeyTracker, apply_intent};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, autopilot, tick};
use crate::snapshot::Snapshot;
use crate::tuning::Tuning;

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

/// Game instance holding all session state
pub struct Game {
    pub state: GameState,
    pub settings: Settings,
    pub highscores: HighScores,
    /// Idle/demo mode - the autopilot plays
    pub idle_mode: bool,
    keys: KeyTracker,
    events: Vec<GameEvent>,
    torn_down: bool,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Game {
    pub fn new(seed: u64, settings: Settings) -> Self {
        Self::from_state(GameState::new(seed), settings)
    }

    /// Game with custom balance; fails on tuning the simulation cannot run
    pub fn with_tuning(seed: u64, settings: Settings, tuning: Tuning) -> Result<Self> {
        Ok(Self::from_state(GameState::with_tuning(seed, tuning)?, settings))
    }

    fn from_state(state: GameState, settings: Settings) -> Self {
        Self {
            state,
            settings,
            highscores: HighScores::new(),
            idle_mode: false,
            keys: KeyTracker::new(),
            events: Vec::new(),
            torn_down: false,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Start screen -> playing. The host starts its frame loop on `true`.
    pub fn start(&mut self, seed: u64, now_ms: f64) -> bool {
        self.keys.clear();
        !self.torn_down && self.state.start(seed, now_ms)
    }

    /// "Play again" from the game-over screen
    pub fn play_again(&mut self, seed: u64, now_ms: f64) -> bool {
        self.keys.clear();
        !self.torn_down && self.state.play_again(seed, now_ms)
    }

    pub fn back_to_menu(&mut self) -> bool {
        self.state.back_to_menu()
    }

    /// Keyboard press. Returns true if the resulting intent changed state.
    pub fn key_down(&mut self, key: &str) -> bool {
        match self.keys.key_down(key) {
            Some(intent) => self.apply(intent),
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.key_up(key);
    }

    /// On-screen button tap, by control name
    pub fn control_pressed(&mut self, name: &str) -> bool {
        match Intent::from_control(name) {
            Some(intent) => self.apply(intent),
            None => false,
        }
    }

    /// Window lost focus; key-up events will never arrive
    pub fn blur(&mut self) {
        self.keys.clear();
    }

    pub fn apply(&mut self, intent: Intent) -> bool {
        if self.torn_down {
            return false;
        }
        apply_intent(&mut self.state, intent)
    }

    /// Run one simulation step for the animation frame at `now_ms`
    pub fn on_frame(&mut self, now_ms: f64) -> FrameOutcome {
        if self.torn_down || self.state.phase != GamePhase::Playing {
            return FrameOutcome::Stop;
        }

        if self.idle_mode {
            if let Some(intent) = autopilot::next_intent(&self.state) {
                apply_intent(&mut self.state, intent);
            }
        }

        let events = tick(&mut self.state, now_ms);
        self.events.extend(events);
        self.record_frame_time(now_ms);

        if self.state.phase == GamePhase::Playing {
            FrameOutcome::Continue
        } else {
            FrameOutcome::Stop
        }
    }

    /// Events since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stop the loop for good (view torn down). Later frames and input are ignored.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            log::info!("Game torn down in phase {:?}", self.state.phase);
        }
        self.torn_down = true;
        self.keys.clear();
    }

    pub fn snapshot(&self, now_ms: f64) -> Snapshot {
        let mut snapshot = Snapshot::capture(&self.state, self.settings.playfield(), now_ms);
        if !self.settings.effective_floating_scores() {
            snapshot.floating_scores.clear();
        }
        snapshot
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    fn record_frame_time(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample is the one we'll overwrite next
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    /// Hand the finished run to `sink`. Sink failures are logged, not returned:
    /// the game never waits on a submission.
    pub fn submit_score(
        &self,
        name: &str,
        sink: &mut dyn ScoreSink,
        timestamp_ms: f64,
    ) -> Result<ScoreSubmission> {
        if self.state.phase != GamePhase::GameOver {
            return Err(GameError::NotGameOver(self.state.phase));
        }
        let submission = ScoreSubmission::from_state(name, &self.state);
        if let Err(e) = sink.submit(&submission, timestamp_ms) {
            log::warn!("Score submission for {} failed: {}", submission.name, e);
        }
        Ok(submission)
    }

    /// Record the finished run on the local leaderboard
    pub fn submit_local(&mut self, name: &str, timestamp_ms: f64) -> Result<ScoreSubmission> {
        if self.state.phase != GamePhase::GameOver {
            return Err(GameError::NotGameOver(self.state.phase));
        }
        let submission = ScoreSubmission::from_state(name, &self.state);
        if let Err(e) = self.highscores.submit(&submission, timestamp_ms) {
            log::warn!("Could not record local high score: {}", e);
        }
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::Customer;

    struct FailingSink {
        calls: u32,
    }

    impl ScoreSink for FailingSink {
        fn submit(&mut self, _submission: &ScoreSubmission, _timestamp_ms: f64) -> Result<()> {
            self.calls += 1;
            Err(GameError::Submission("offline".to_string()))
        }
    }

    fn playing_game() -> Game {
        let mut game = Game::new(11, Settings::default());
        assert!(game.start(11, 0.0));
        game
    }

    fn force_game_over(game: &mut Game) {
        game.state.lives = 1;
        let id = game.state.next_entity_id();
        let mut customer = Customer::new(id, 0, 10.0);
        customer.x = SERVE_BOUNDARY_X - 1.0;
        game.state.customers.push(customer);
    }

    #[test]
    fn test_unrunnable_tuning_rejected() {
        let inverted_jitter = Tuning {
            speed_jitter_min: 2.0,
            speed_jitter_max: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            Game::with_tuning(1, Settings::default(), inverted_jitter),
            Err(GameError::InvalidTuning(_))
        ));

        let fast_levels = Tuning {
            customers_per_level: 1,
            ..Default::default()
        };
        let mut game = Game::with_tuning(1, Settings::default(), fast_levels).unwrap();
        game.start(1, 0.0);
        assert_eq!(game.state.serve_customer(), Some(2));
    }

    #[test]
    fn test_frames_stop_before_start() {
        let mut game = Game::new(1, Settings::default());
        assert_eq!(game.on_frame(16.0), FrameOutcome::Stop);
    }

    #[test]
    fn test_frame_loop_stops_at_game_over() {
        let mut game = playing_game();
        assert_eq!(game.on_frame(16.0), FrameOutcome::Continue);
        force_game_over(&mut game);
        assert_eq!(game.on_frame(32.0), FrameOutcome::Stop);
        assert_eq!(game.state.phase, GamePhase::GameOver);

        let events = game.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert_eq!(game.on_frame(48.0), FrameOutcome::Stop);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn test_teardown_revokes_loop() {
        let mut game = playing_game();
        game.teardown();
        assert_eq!(game.on_frame(10_000.0), FrameOutcome::Stop);
        assert!(game.state.customers.is_empty());
        assert!(!game.key_down("Enter"));
        assert!(game.state.empanadas.is_empty());
        assert!(!game.play_again(2, 0.0));
    }

    #[test]
    fn test_keyboard_and_buttons_share_logic() {
        let mut game = playing_game();
        assert!(game.key_down("ArrowUp"));
        assert_eq!(game.state.player.lane, PLAYER_START_LANE - 1);
        // Auto-repeat swallowed
        assert!(!game.key_down("ArrowUp"));
        game.key_up("ArrowUp");

        assert!(game.control_pressed("down"));
        assert_eq!(game.state.player.lane, PLAYER_START_LANE);
        assert!(game.control_pressed("throw"));
        assert!(game.key_down(" "));
        assert_eq!(game.state.empanadas.len(), 2);
        assert!(!game.control_pressed("nope"));
    }

    #[test]
    fn test_blur_releases_keys() {
        let mut game = playing_game();
        assert!(game.key_down("Enter"));
        game.blur();
        assert!(game.key_down("Enter"));
    }

    #[test]
    fn test_idle_mode_plays() {
        let mut game = playing_game();
        game.idle_mode = true;
        for frame in 1..2000 {
            if game.on_frame(frame as f64 * 16.0) == FrameOutcome::Stop {
                break;
            }
        }
        assert!(game.state.customers_served > 0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut game = playing_game();
        for frame in 1..=120 {
            game.on_frame(frame as f64 * 1000.0 / 60.0);
        }
        assert!((59..=61).contains(&game.fps()));
    }

    #[test]
    fn test_snapshot_respects_reduced_motion() {
        let mut game = playing_game();
        game.state.floating_scores.push(crate::sim::FloatingScore {
            id: 99,
            lane: 0,
            x: 0.0,
            value: 5,
            created_at_ms: 0.0,
        });
        assert_eq!(game.snapshot(0.0).floating_scores.len(), 1);
        game.settings.reduced_motion = true;
        assert!(game.snapshot(0.0).floating_scores.is_empty());
    }

    #[test]
    fn test_submission_only_after_game_over() {
        let mut game = playing_game();
        let mut sink = FailingSink { calls: 0 };
        let err = game.submit_score("Nito", &mut sink, 0.0).unwrap_err();
        assert!(matches!(err, GameError::NotGameOver(GamePhase::Playing)));
        assert_eq!(sink.calls, 0);

        game.state.score = 40;
        force_game_over(&mut game);
        game.on_frame(16.0);

        // Sink failure does not surface
        let sub = game.submit_score("Nito", &mut sink, 1000.0).unwrap();
        assert_eq!(sink.calls, 1);
        assert_eq!(sub.score, 40);

        game.submit_local("Nito", 1234.0).unwrap();
        assert_eq!(game.highscores.top_score(), Some(40));
        assert_eq!(game.highscores.entries[0].timestamp, 1234.0);

        assert!(game.play_again(12, 2000.0));
        assert_eq!(game.state.score, 0);
    }
}
