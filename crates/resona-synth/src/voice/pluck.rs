//! Karplus-Strong plucked-string voice.
//!
//! A burst of excitation — filtered noise blended with a tone burst — is
//! injected into a fractional comb loop tuned to `sample_rate / frequency`
//! samples. The loop's one-zero damper eats a little high end on every
//! round trip (the string going dull as it rings) and its allpass absorbs
//! the fractional part of the period so the pitch is exact. A second read
//! tap at a ratio of the period mixes in extra harmonic color.

use crate::envelope::AsrEnvelope;
use crate::voice::VoiceControls;
use core::f32::consts::TAU;
use libm::sinf;
use resona_core::{CombFilter, NoiseGenerator, OnePole, lerp};

/// Lowest playable fundamental; sets the delay-line size.
const MIN_FREQ_HZ: f32 = 20.0;

const ATTACK_MIN_MS: f32 = 0.5;
const ATTACK_MAX_MS: f32 = 20.0;
const RELEASE_MIN_MS: f32 = 5.0;
const RELEASE_MAX_MS: f32 = 2000.0;

/// Longest excitation burst in samples, regardless of pitch.
const MAX_BURST_SAMPLES: u32 = 4096;

/// Plucked-string voice.
#[derive(Debug)]
pub struct PluckVoice {
    string: CombFilter,
    noise: NoiseGenerator,
    excite_filter: OnePole,
    env: AsrEnvelope,
    sample_rate: f32,
    frequency: f32,
    /// Samples of excitation still to inject.
    burst_remaining: u32,
    /// Phase of the tone-burst component.
    tone_phase: f32,
    /// Noise-vs-tone blend of the excitation.
    excite_blend: f32,
    /// Ratio of the secondary harmonic tap.
    harmonic_ratio: f32,
    /// How much of the harmonic tap reaches the output.
    harmonic_mix: f32,
    gate: bool,
}

impl PluckVoice {
    /// Create a voice at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let max_period = (sample_rate / MIN_FREQ_HZ) as usize + 4;
        let mut voice = Self {
            string: CombFilter::new(max_period),
            noise: NoiseGenerator::new(),
            excite_filter: OnePole::new(sample_rate, 4000.0),
            env: AsrEnvelope::new(sample_rate),
            sample_rate,
            frequency: 440.0,
            burst_remaining: 0,
            tone_phase: 0.0,
            excite_blend: 0.0,
            harmonic_ratio: 1.0,
            harmonic_mix: 0.0,
            gate: false,
        };
        voice.env.set_attack_ms(1.0);
        voice.string.set_loop_gain(0.99);
        voice
    }

    /// Drive the gate. A rising edge starts a fresh excitation burst one
    /// loop period long (the classic Karplus-Strong fill).
    pub fn set_gate(&mut self, high: bool) {
        if high && !self.gate {
            let period = self.sample_rate / self.frequency.max(MIN_FREQ_HZ);
            self.burst_remaining = (period as u32).clamp(1, MAX_BURST_SAMPLES);
            self.tone_phase = 0.0;
        }
        self.gate = high;
        self.env.set_gate(high);
    }

    /// Tune the string. The loop period is `sample_rate / frequency`.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.clamp(MIN_FREQ_HZ, self.sample_rate * 0.45);
        self.string
            .set_period_samples(self.sample_rate / self.frequency);
    }

    /// Remap and apply the broadcast controls: cutoff brightens the string
    /// (less loop damping, brighter excitation), quality stretches the
    /// decay (loop gain), sound source moves the excitation from pure
    /// noise toward a tone burst and leans on the harmonic tap.
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        let cutoff = controls.filter_cutoff.clamp(0.0, 1.0);
        self.string.set_damping(lerp(0.5, 0.02, cutoff));
        self.excite_filter
            .set_frequency(lerp(500.0, 9000.0, cutoff));

        let quality = controls.filter_quality.clamp(0.0, 1.0);
        self.string.set_loop_gain(lerp(0.85, 0.997, quality));

        let source = controls.sound_source.clamp(0.0, 1.0);
        self.excite_blend = source;
        self.harmonic_ratio = lerp(1.0, 0.5, source);
        self.harmonic_mix = source * 0.5;

        self.env
            .set_attack_ms(lerp(ATTACK_MIN_MS, ATTACK_MAX_MS, controls.attack.clamp(0.0, 1.0)));
        self.env.set_release_ms(lerp(
            RELEASE_MIN_MS,
            RELEASE_MAX_MS,
            controls.release.clamp(0.0, 1.0),
        ));
    }

    /// Whether the envelope is still shaping sound.
    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    /// Generate the next sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let excitation = if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
            let noise = self.excite_filter.process(self.noise.next());
            let tone = sinf(TAU * self.tone_phase);
            self.tone_phase += self.frequency / self.sample_rate;
            if self.tone_phase >= 1.0 {
                self.tone_phase -= 1.0;
            }
            lerp(noise, tone, self.excite_blend)
        } else {
            0.0
        };

        let main = self.string.process(excitation);
        let colored = lerp(main, self.string.tap(self.harmonic_ratio), self.harmonic_mix);
        colored * self.env.advance()
    }
}
