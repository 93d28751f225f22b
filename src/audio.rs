//! Audio triggers
//!
//! The simulation never waits on audio; the game loop fires effects as
//! side effects of `GameEvent`s. On wasm32 the sounds are synthesised with
//! the Web Audio API, so no sound files are needed. Elsewhere a logging
//! sink stands in.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player jumped
    Jump,
    /// Coin picked up
    CoinCollect,
}

impl SoundEffect {
    /// Effect for a simulation event
    pub fn for_event(event: GameEvent) -> Self {
        match event {
            GameEvent::Jump => SoundEffect::Jump,
            GameEvent::CoinCollected => SoundEffect::CoinCollect,
        }
    }
}

/// Background theme control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    /// Start the looping theme from the beginning
    Play,
    Pause,
}

/// Fire-and-forget audio output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    fn theme(&mut self, action: ThemeAction);
}

/// Sink that only logs what it would play
#[derive(Debug, Default)]
pub struct NullAudio {
    muted: bool,
}

impl NullAudio {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            muted: settings.muted,
        }
    }
}

impl AudioSink for NullAudio {
    fn play(&mut self, effect: SoundEffect) {
        if !self.muted {
            log::debug!("sfx: {:?}", effect);
        }
    }

    fn theme(&mut self, action: ThemeAction) {
        log::debug!("theme: {:?}", action);
    }
}

/// Theme melody (Hz), one note per beat
const THEME_NOTES: [f32; 8] = [262.0, 330.0, 392.0, 330.0, 294.0, 349.0, 440.0, 349.0];
/// Beat length (s)
const THEME_BEAT: f32 = 0.25;

/// One pass of the theme as mono samples in `-1.0..=1.0`.
///
/// Each note is a triangle wave that fades in and out, so the buffer starts
/// and ends silent and loops without a click.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn theme_samples(sample_rate: f32) -> Vec<f32> {
    let per_beat = (THEME_BEAT * sample_rate) as usize;
    let fade = (per_beat / 20).max(1);
    THEME_NOTES
        .iter()
        .flat_map(|&freq| {
            (0..per_beat).map(move |i| {
                let phase = (i as f32 * freq / sample_rate).fract();
                let triangle = 1.0 - 4.0 * (phase - 0.5).abs();
                let edge = i.min(per_beat - 1 - i);
                triangle * (edge as f32 / fade as f32).min(1.0)
            })
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioBufferSourceNode, AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, ThemeAction, theme_samples};
    use crate::settings::Settings;

    /// Audio manager backed by Web Audio oscillators
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
        muted: bool,
        /// Source of the running theme loop
        theme: Option<AudioBufferSourceNode>,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: settings.master_volume.clamp(0.0, 1.0),
                sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
                music_volume: settings.music_volume.clamp(0.0, 1.0),
                muted: settings.muted,
                theme: None,
            }
        }

        fn volume(&self, channel: f32) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * channel
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
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

        /// Jump - quick upward chirp
        fn play_jump(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 300.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.18).ok();
        }

        /// Coin - two bright notes
        fn play_coin(ctx: &AudioContext, vol: f32) {
            for (i, freq) in [988.0, 1319.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.25).ok();
                }
            }
        }

        fn start_theme(&mut self) {
            self.stop_theme();
            let vol = self.volume(self.music_volume);
            let Some(ctx) = &self.ctx else { return };
            if vol <= 0.0 {
                return;
            }
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            self.theme = Self::create_theme(ctx, vol);
            if self.theme.is_none() {
                log::warn!("Failed to start theme");
            }
        }

        /// Theme melody rendered once into a buffer and played on loop
        fn create_theme(ctx: &AudioContext, vol: f32) -> Option<AudioBufferSourceNode> {
            let rate = ctx.sample_rate();
            let mut samples = theme_samples(rate);
            let buffer = ctx.create_buffer(1, samples.len() as u32, rate).ok()?;
            buffer.copy_to_channel(&mut samples, 0).ok()?;

            let source = ctx.create_buffer_source().ok()?;
            let gain = ctx.create_gain().ok()?;
            source.set_buffer(Some(&buffer));
            source.set_loop(true);
            gain.gain().set_value(vol * 0.08);
            source.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            source.start().ok()?;
            Some(source)
        }

        fn stop_theme(&mut self) {
            if let Some(source) = self.theme.take() {
                source.stop().ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.volume(self.sfx_volume);
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Jump => Self::play_jump(ctx, vol),
                SoundEffect::CoinCollect => Self::play_coin(ctx, vol),
            }
        }

        fn theme(&mut self, action: ThemeAction) {
            match action {
                ThemeAction::Play => self.start_theme(),
                ThemeAction::Pause => self.stop_theme(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::for_event(GameEvent::Jump), SoundEffect::Jump);
        assert_eq!(
            SoundEffect::for_event(GameEvent::CoinCollected),
            SoundEffect::CoinCollect
        );
    }

    #[test]
    fn test_theme_loops_cleanly() {
        let rate = 8000.0;
        let samples = theme_samples(rate);
        assert_eq!(samples.len(), THEME_NOTES.len() * 2000);
        // Silent at both ends, so the loop seam does not click
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[samples.len() - 1], 0.0);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
        assert!(samples.iter().any(|s| s.abs() > 0.9));
    }
}
