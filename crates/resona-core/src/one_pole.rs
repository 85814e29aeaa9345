//! First-order filters: one-pole lowpass and one-zero damper.
//!
//! The one-pole is the cheapest recursive lowpass there is — 6 dB/octave,
//! one multiply per sample:
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n]),   coeff = exp(-2π·freq/sr)
//! ```
//!
//! The one-zero is its feedforward cousin, `y[n] = (1-b)·x[n] + b·x[n-1]`,
//! whose magnitude response never exceeds unity for `b ∈ [0, 1]` — exactly
//! the property a feedback loop needs from its damping stage.

use crate::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) lowpass filter.
///
/// # Invariants
///
/// - `coeff` stays in [0, 1) for stable operation
/// - state is flushed to zero below 1e-20 (denormal protection)
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Create a lowpass with the given cutoff.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Set the cutoff frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz.max(0.0);
        self.recalculate_coeff();
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Zero the filter state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = expf(-core::f32::consts::TAU * self.freq / self.sample_rate);
    }
}

/// One-zero averaging filter, `y[n] = (1-blend)·x[n] + blend·x[n-1]`.
///
/// At `blend = 0.5` this is the classic half-sum damper (deepest high
/// frequency loss); at `blend = 0` it passes the input through unchanged.
/// Gain is at most unity for any blend in [0, 1], so it can sit inside a
/// feedback loop without pushing it unstable.
#[derive(Debug, Clone, Default)]
pub struct OneZero {
    prev: f32,
    blend: f32,
}

impl OneZero {
    /// Create a damper with the given blend in [0, 1].
    pub fn new(blend: f32) -> Self {
        Self {
            prev: 0.0,
            blend: blend.clamp(0.0, 1.0),
        }
    }

    /// Set the blend toward the previous sample (0 = bypass, 0.5 = half-sum).
    pub fn set_blend(&mut self, blend: f32) {
        self.blend = blend.clamp(0.0, 1.0);
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let out = (1.0 - self.blend) * input + self.blend * self.prev;
        self.prev = input;
        out
    }

    /// Zero the filter state.
    pub fn reset(&mut self) {
        self.prev = 0.0;
    }
}
