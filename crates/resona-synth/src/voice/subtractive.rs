//! Subtractive voice: blend oscillator through a resonant lowpass.

use crate::envelope::AsrEnvelope;
use crate::oscillator::BlendOscillator;
use crate::voice::VoiceControls;
use resona_core::{Biquad, lerp};

const CUTOFF_MIN_HZ: f32 = 80.0;
const CUTOFF_MAX_HZ: f32 = 12000.0;
const Q_MIN: f32 = 0.6;
const Q_MAX: f32 = 8.0;
const ATTACK_MIN_MS: f32 = 1.0;
const ATTACK_MAX_MS: f32 = 1000.0;
const RELEASE_MIN_MS: f32 = 5.0;
const RELEASE_MAX_MS: f32 = 2000.0;

/// The classic chain: oscillator → lowpass → amplitude envelope.
///
/// The sound-source control morphs the oscillator across its four
/// waveforms; cutoff and quality are remapped linearly into the filter's
/// frequency and resonance ranges. Filter coefficients are re-derived
/// every sample from the current (smoothed) controls, so continuous
/// modulation never steps.
#[derive(Debug)]
pub struct SubtractiveVoice {
    osc: BlendOscillator,
    filter: Biquad,
    env: AsrEnvelope,
    sample_rate: f32,
    cutoff_hz: f32,
    quality: f32,
}

impl SubtractiveVoice {
    /// Create a voice at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            osc: BlendOscillator::new(sample_rate),
            filter: Biquad::new(),
            env: AsrEnvelope::new(sample_rate),
            sample_rate,
            cutoff_hz: 2000.0,
            quality: 0.707,
        }
    }

    /// Drive the amplitude envelope gate.
    pub fn set_gate(&mut self, high: bool) {
        self.env.set_gate(high);
    }

    /// Set oscillator frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.osc.set_frequency(freq_hz);
    }

    /// Remap and apply the broadcast controls.
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        self.osc.set_mix(controls.sound_source);
        self.cutoff_hz = lerp(
            CUTOFF_MIN_HZ,
            CUTOFF_MAX_HZ,
            controls.filter_cutoff.clamp(0.0, 1.0),
        );
        self.quality = lerp(Q_MIN, Q_MAX, controls.filter_quality.clamp(0.0, 1.0));
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

    /// Release time of the amplitude envelope, in samples.
    pub fn release_samples(&self) -> u32 {
        self.env.release_samples()
    }

    /// Generate the next sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let level = self.env.advance();
        self.filter
            .set_lowpass(self.cutoff_hz, self.quality, self.sample_rate);
        self.filter.process(self.osc.advance()) * level
    }
}
