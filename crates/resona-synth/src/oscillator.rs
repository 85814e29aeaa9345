//! Band-limited multi-waveform blend oscillator.
//!
//! Produces triangle, square, sawtooth, and white noise *simultaneously*
//! every sample and crossfades among the four with a single mix parameter
//! through a four-band linear blend: `[0, .25)` triangle→square, `[.25, .5)` square→saw,
//! `[.5, .75)` saw→noise, `[.75, 1]` noise. Sweeping the mix morphs the
//! timbre continuously instead of clicking between waveforms.
//!
//! Saw and square are PolyBLEP-corrected at their step discontinuities;
//! the triangle is produced by leaky-integrating the corrected square,
//! which band-limits the slope discontinuity for free. Noise needs no
//! correction.

use resona_core::{NoiseGenerator, blend4};

/// Multi-waveform oscillator with a single timbre-morph control.
#[derive(Debug, Clone)]
pub struct BlendOscillator {
    /// Current phase position [0, 1)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    /// Crossfade position over the four waveforms
    mix: f32,
    noise: NoiseGenerator,
    /// Leaky-integrator state for the triangle
    tri_state: f32,
}

impl BlendOscillator {
    /// Create an oscillator at the given sample rate, initially at 440 Hz.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            mix: 0.0,
            noise: NoiseGenerator::new(),
            tri_state: 0.0,
        }
    }

    /// Set frequency in Hz.
    ///
    /// Zero is legal: the phase increment becomes zero and the oscillator
    /// holds its current phase, producing a finite (DC) output. There is no
    /// division by the frequency anywhere.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the waveform crossfade position in [0, 1].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Update the sample rate, preserving frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase and integrator state.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.tri_state = 0.0;
    }

    /// Generate the next sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let phase = self.phase;
        let dt = self.phase_inc;

        // Saw: naive ramp with a BLEP at the phase wrap.
        let saw = 2.0 * phase - 1.0 - poly_blep(phase, dt);

        // Square: naive bipolar with BLEPs at both edges.
        let naive_square = if phase < 0.5 { 1.0 } else { -1.0 };
        let square =
            naive_square + poly_blep(phase, dt) - poly_blep(wrap_unit(phase + 0.5), dt);

        // Triangle: leaky integration of the corrected square. The leak
        // keeps DC from accumulating; it tracks frequency so low notes
        // are not damped away.
        let leak = 1.0 - (self.frequency / self.sample_rate).min(0.1);
        self.tri_state = leak * self.tri_state + square * dt * 4.0;
        let triangle = self.tri_state;

        let noise = self.noise.next();

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        blend4(triangle, square, saw, noise, self.mix)
    }
}

#[inline]
fn wrap_unit(x: f32) -> f32 {
    if x >= 1.0 { x - 1.0 } else { x }
}

/// Second-order PolyBLEP residual.
///
/// A two-sample-wide piecewise quadratic correction applied around a step
/// discontinuity; subtracting it from a naive saw (or adding it at a pulse
/// edge) suppresses the aliased images of the step. Returns zero when the
/// phase is away from a discontinuity, or when `dt` is zero (a stopped
/// oscillator has no discontinuities to correct).
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let x = t / dt;
        2.0 * x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + 2.0 * x + 1.0
    } else {
        0.0
    }
}
