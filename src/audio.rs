//! Audio system using Web Audio API
//!
//! Procedurally generated cues - no external files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::SessionEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Session started
    Start,
    /// Target clicked
    Hit,
    /// Countdown suspended
    Pause,
    /// Time ran out
    GameOver,
    /// Time ran out with a new best score
    NewBest,
}

impl SoundEffect {
    /// Cue for a session event, if it has one
    pub fn for_event(event: &SessionEvent) -> Option<Self> {
        match event {
            SessionEvent::Started => Some(Self::Start),
            SessionEvent::TargetHit { .. } => Some(Self::Hit),
            SessionEvent::Paused => Some(Self::Pause),
            SessionEvent::GameOver { new_best: true, .. } => Some(Self::NewBest),
            SessionEvent::GameOver { .. } => Some(Self::GameOver),
            _ => None,
        }
    }
}

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
        Self {
            ctx,
            volume: Settings::default().effective_volume(),
        }
    }

    /// Pick up volume and mute from player settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Start => self.play_start(ctx, vol),
            SoundEffect::Hit => self.play_hit(ctx, vol),
            SoundEffect::Pause => self.play_pause(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
            SoundEffect::NewBest => self.play_new_best(ctx, vol),
        }
    }

    // === Sound generators ===

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

    /// Short rising arpeggio played at `step` second intervals
    fn play_sequence(
        &self,
        ctx: &AudioContext,
        vol: f32,
        freqs: &[f32],
        step: f64,
        osc_type: OscillatorType,
    ) {
        for (i, freq) in freqs.iter().enumerate() {
            let delay = i as f64 * step;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + step * 2.5)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + step * 3.0).ok();
            }
        }
    }

    /// Start - whoosh up
    fn play_start(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }

    /// Hit - bright pop
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(880.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1320.0, t + 0.05)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        // Soft body under the pop
        if let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) {
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }

    /// Pause - low blip
    fn play_pause(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Game over - sad descending
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        self.play_sequence(ctx, vol, &[400.0, 350.0, 300.0, 200.0], 0.2, OscillatorType::Sine);
    }

    /// New best - celebratory
    fn play_new_best(&self, ctx: &AudioContext, vol: f32) {
        self.play_sequence(
            ctx,
            vol,
            &[500.0, 600.0, 700.0, 800.0, 1000.0],
            0.08,
            OscillatorType::Triangle,
        );
    }
}
