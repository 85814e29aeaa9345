//! Percussive drum voice.
//!
//! Two layers, both shaped by one-shot AD envelopes:
//!
//! - **Body**: a sine whose frequency starts several times above the note
//!   and is swept down to it by a fast pitch envelope — the "thump" of a
//!   kick or tom.
//! - **Snap**: white noise through a bandpass, with a shorter envelope —
//!   the stick attack / snare rattle.
//!
//! The sound-source control mixes between the two layers. Both envelopes
//! retrigger from zero on every gate rise (AD semantics), so fast rolls
//! strike identically every time.

use crate::envelope::AdEnvelope;
use crate::voice::VoiceControls;
use core::f32::consts::TAU;
use libm::sinf;
use resona_core::{Biquad, NoiseGenerator, lerp};

/// Pitch-sweep depth: body starts at `1 + SWEEP_DEPTH` times the note.
const SWEEP_DEPTH: f32 = 3.0;

const BODY_ATTACK_MIN_MS: f32 = 0.2;
const BODY_ATTACK_MAX_MS: f32 = 15.0;
const BODY_DECAY_MIN_MS: f32 = 30.0;
const BODY_DECAY_MAX_MS: f32 = 1500.0;
const SNAP_DECAY_MIN_MS: f32 = 15.0;
const SNAP_DECAY_MAX_MS: f32 = 400.0;
const SWEEP_DECAY_MIN_MS: f32 = 15.0;
const SWEEP_DECAY_MAX_MS: f32 = 250.0;

const NOISE_CUTOFF_MIN_HZ: f32 = 400.0;
const NOISE_CUTOFF_MAX_HZ: f32 = 8000.0;
const NOISE_Q_MIN: f32 = 0.7;
const NOISE_Q_MAX: f32 = 6.0;

/// Drum voice: swept sine body plus filtered-noise snap.
#[derive(Debug)]
pub struct DrumVoice {
    body_phase: f32,
    body_env: AdEnvelope,
    pitch_env: AdEnvelope,
    noise: NoiseGenerator,
    noise_env: AdEnvelope,
    noise_filter: Biquad,
    sample_rate: f32,
    frequency: f32,
    /// Body-vs-snap mix.
    mix: f32,
    noise_cutoff_hz: f32,
    noise_q: f32,
}

impl DrumVoice {
    /// Create a voice at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            body_phase: 0.0,
            body_env: AdEnvelope::new(sample_rate),
            pitch_env: AdEnvelope::new(sample_rate),
            noise: NoiseGenerator::new(),
            noise_env: AdEnvelope::new(sample_rate),
            noise_filter: Biquad::new(),
            sample_rate,
            frequency: 60.0,
            mix: 0.0,
            noise_cutoff_hz: 2000.0,
            noise_q: 1.5,
        };
        // The sweep envelope's attack is effectively instant; its decay is
        // the audible pitch drop.
        voice.pitch_env.set_attack_ms(0.0);
        voice.pitch_env.set_decay_ms(60.0);
        voice.noise_env.set_attack_ms(0.2);
        voice
    }

    /// Drive the gate; only the rising edge matters (AD envelopes).
    pub fn set_gate(&mut self, high: bool) {
        self.body_env.set_gate(high);
        self.pitch_env.set_gate(high);
        self.noise_env.set_gate(high);
    }

    /// Set the body's resting frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
    }

    /// Remap and apply the broadcast controls: sound source mixes body
    /// against snap, cutoff and quality tune the snap's bandpass, attack
    /// shapes the body attack, release stretches every decay.
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        self.mix = controls.sound_source.clamp(0.0, 1.0);
        self.noise_cutoff_hz = lerp(
            NOISE_CUTOFF_MIN_HZ,
            NOISE_CUTOFF_MAX_HZ,
            controls.filter_cutoff.clamp(0.0, 1.0),
        );
        self.noise_q = lerp(NOISE_Q_MIN, NOISE_Q_MAX, controls.filter_quality.clamp(0.0, 1.0));

        let attack = controls.attack.clamp(0.0, 1.0);
        let release = controls.release.clamp(0.0, 1.0);
        self.body_env
            .set_attack_ms(lerp(BODY_ATTACK_MIN_MS, BODY_ATTACK_MAX_MS, attack));
        self.body_env
            .set_decay_ms(lerp(BODY_DECAY_MIN_MS, BODY_DECAY_MAX_MS, release));
        self.noise_env
            .set_decay_ms(lerp(SNAP_DECAY_MIN_MS, SNAP_DECAY_MAX_MS, release));
        self.pitch_env
            .set_decay_ms(lerp(SWEEP_DECAY_MIN_MS, SWEEP_DECAY_MAX_MS, release));
    }

    /// Whether either layer's envelope is still running.
    pub fn is_active(&self) -> bool {
        self.body_env.is_active() || self.noise_env.is_active()
    }

    /// Generate the next sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        // Body: sine swept down from (1 + depth·sweep) times the note.
        let sweep = self.pitch_env.advance();
        let body_freq = self.frequency * (1.0 + SWEEP_DEPTH * sweep);
        self.body_phase += body_freq / self.sample_rate;
        if self.body_phase >= 1.0 {
            self.body_phase -= 1.0;
        }
        let body = sinf(TAU * self.body_phase) * self.body_env.advance();

        // Snap: bandpassed noise, filter retuned every sample.
        self.noise_filter
            .set_bandpass(self.noise_cutoff_hz, self.noise_q, self.sample_rate);
        let snap = self.noise_filter.process(self.noise.next()) * self.noise_env.advance();

        lerp(body, snap, self.mix)
    }
}
