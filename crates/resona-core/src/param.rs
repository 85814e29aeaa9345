//! Smoothed control parameters.
//!
//! Discrete parameter changes (a slider jump, a new note frequency) produce
//! audible clicks if applied instantly. [`SmoothedParam`] converges toward its
//! target once per sample through a one-pole lowpass, turning steps into
//! short exponential ramps.
//!
//! ## Usage
//!
//! ```rust
//! use resona_core::SmoothedParam;
//!
//! let mut cutoff = SmoothedParam::with_config(1000.0, 48000.0, 20.0);
//!
//! // Control side decides the destination...
//! cutoff.set_target(4000.0);
//!
//! // ...audio side walks there, one sample at a time.
//! for _ in 0..960 {
//!     let hz = cutoff.advance();
//! }
//! ```
//!
//! The smoothing window is expressed in milliseconds and converted to a
//! per-sample coefficient. A window of zero (or negative) milliseconds is
//! clamped to a single sample so the coefficient derivation never divides
//! by zero.

use libm::expf;

/// A scalar parameter that exponentially approaches its target.
///
/// The difference equation is `y[n] = y[n-1] + coeff * (target - y[n-1])`
/// with `coeff = 1 - exp(-1 / samples)` and `samples` the smoothing time
/// constant in samples (clamped to at least one). Convergence is monotone
/// and never overshoots: each step moves a fixed fraction of the remaining
/// distance.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Per-sample smoothing coefficient
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Smoothing time constant in milliseconds
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a parameter at `initial` with a one-sample (near-instant)
    /// smoothing window.
    pub fn new(initial: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        };
        param.recalculate_coeff();
        param
    }

    /// Create a fully configured parameter.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the value the parameter will converge toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Retarget and re-derive the coefficient for a new smoothing window.
    ///
    /// This is the single entry point the engine uses when an event carries
    /// both a destination and a ramp length (note-on frequency snaps over a
    /// short ramp, pitch bends glide over a longer one).
    pub fn set_target_with_time(&mut self, target: f32, smoothing_time_ms: f32) {
        self.target = target;
        self.smoothing_time_ms = smoothing_time_ms;
        self.recalculate_coeff();
    }

    /// Jump to `value` with no ramp.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update the sample rate and re-derive the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set the smoothing window in milliseconds.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advance one sample toward the target and return the new value.
    ///
    /// Audio-thread only; call exactly once per sample so every consumer of
    /// this parameter observes the same ramp.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current smoothed value, without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the ramp has effectively finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// The time constant in samples is clamped to a minimum of one sample,
    /// which keeps `exp(-1 / samples)` well defined for zero or negative
    /// smoothing times.
    fn recalculate_coeff(&mut self) {
        let samples = (self.smoothing_time_ms * self.sample_rate / 1000.0).max(1.0);
        self.coeff = 1.0 - expf(-1.0 / samples);
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
