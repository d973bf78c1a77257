//! Audio cues
//!
//! Sound effects are procedurally generated with the Web Audio API - no
//! external files needed. The event mapping is platform independent; the
//! player only exists on wasm32.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Empanada leaves the window
    Throw,
    /// Customer served
    Serve,
    /// Tip lands on the ground
    TipDrop,
    /// Tip picked up
    TipCollect,
    /// Empanada slid off the end of the lane
    Miss,
    /// Customer reached the counter unserved
    LifeLost,
    LevelUp,
    GameOver,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CustomerServed { .. } => Some(SoundEffect::Serve),
            GameEvent::TipDropped { .. } => Some(SoundEffect::TipDrop),
            GameEvent::TipCollected { .. } => Some(SoundEffect::TipCollect),
            GameEvent::EmpanadaMissed { .. } => Some(SoundEffect::Miss),
            GameEvent::CustomerReachedCounter { .. } => Some(SoundEffect::LifeLost),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::CustomerSpawned { .. } | GameEvent::LivesLost { .. } => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::settings::Settings;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 0.8 }
        }

        /// Pick up volume/mute changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        pub fn set_muted(&mut self, muted: bool, settings: &Settings) {
            self.volume = if muted { 0.0 } else { settings.effective_volume() };
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Throw => self.sweep(
                    ctx,
                    vol * 0.3,
                    500.0,
                    250.0,
                    0.08,
                    OscillatorType::Triangle,
                ),
                SoundEffect::Serve => {
                    self.blip(ctx, vol * 0.4, 660.0, 0.0, 0.08);
                    self.blip(ctx, vol * 0.4, 880.0, 0.07, 0.1);
                }
                SoundEffect::TipDrop => self.blip(ctx, vol * 0.2, 1200.0, 0.0, 0.05),
                SoundEffect::TipCollect => {
                    for (i, freq) in [988.0, 1319.0].into_iter().enumerate() {
                        self.blip(ctx, vol * 0.35, freq, i as f64 * 0.06, 0.12);
                    }
                }
                SoundEffect::Miss => self.sweep(
                    ctx,
                    vol * 0.3,
                    300.0,
                    120.0,
                    0.2,
                    OscillatorType::Sawtooth,
                ),
                SoundEffect::LifeLost => self.sweep(
                    ctx,
                    vol * 0.5,
                    220.0,
                    55.0,
                    0.4,
                    OscillatorType::Square,
                ),
                SoundEffect::LevelUp => {
                    for (i, freq) in [523.0, 659.0, 784.0, 1047.0].into_iter().enumerate() {
                        self.blip(ctx, vol * 0.35, freq, i as f64 * 0.08, 0.15);
                    }
                }
                SoundEffect::GameOver => {
                    for (i, freq) in [392.0, 330.0, 262.0].into_iter().enumerate() {
                        self.blip(ctx, vol * 0.4, freq, i as f64 * 0.25, 0.35);
                    }
                }
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short sine note starting `delay` seconds from now
        fn blip(&self, ctx: &AudioContext, vol: f32, freq: f32, delay: f64, len: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + len)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + len + 0.02).ok();
        }

        /// Pitch sweep from `from` to `to` Hz
        fn sweep(
            &self,
            ctx: &AudioContext,
            vol: f32,
            from: f32,
            to: f32,
            len: f64,
            osc_type: OscillatorType,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + len)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + len)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + len + 0.05).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_cues() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::CustomerServed { id: 1, points: 18 }),
            Some(SoundEffect::Serve)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver { score: 0 }),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::CustomerSpawned { id: 1, lane: 0 }),
            None
        );
    }
}
