//! Tunable feedback comb filter.
//!
//! A fractional delay line with a damped, dispersion-corrected feedback
//! path. Driven with a short excitation burst and tuned so the loop length
//! equals `sample_rate / frequency`, this is the resonator at the heart of
//! plucked-string synthesis: the loop sustains a harmonic series at the
//! loop frequency, the one-zero damper rolls off the highs a little more
//! on every trip around, and the first-order allpass absorbs the fractional
//! part of the period so the pitch lands between samples.
//!
//! A secondary read tap at a ratio of the main period is exposed for
//! harmonic coloring (reading at half the period emphasizes the octave).
//!
//! ```text
//!            ┌────────────────── delay ──────────────────┐
//! input ──►(+)                                           ├──► output
//!            ▲                                           │
//!            └── loop_gain ◄── allpass ◄── one-zero ◄────┘
//! ```

use crate::allpass::Allpass;
use crate::delay::InterpolatedDelay;
use crate::flush_denormal;
use crate::one_pole::OneZero;

/// Feedback comb with one-zero damping and allpass dispersion in the loop.
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay: InterpolatedDelay,
    period: f32,
    loop_gain: f32,
    damper: OneZero,
    dispersion: Allpass,
}

impl CombFilter {
    /// Create a comb whose loop can stretch to `max_delay_samples`.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(max_delay_samples.max(4)),
            period: 64.0,
            loop_gain: 0.95,
            damper: OneZero::new(0.5),
            dispersion: Allpass::new(0.0),
        }
    }

    /// Set the loop period in samples (fractional).
    ///
    /// The integer part goes to the delay line; the fractional remainder is
    /// absorbed by retuning the allpass, so pitch is continuous.
    pub fn set_period_samples(&mut self, period: f32) {
        let max = (self.delay.capacity() - 2) as f32;
        let period = period.clamp(2.0, max);
        self.period = period;

        let frac = period - libm::floorf(period);
        // An allpass tuned very close to zero delay goes ill-conditioned;
        // keep its share in a comfortable band and let the delay line carry
        // the rest.
        self.dispersion.set_fractional_delay(frac.max(0.1));
    }

    /// Set the feedback gain (0 = single echo, near 1 = long sustain).
    pub fn set_loop_gain(&mut self, gain: f32) {
        self.loop_gain = gain.clamp(0.0, 0.999);
    }

    /// Set the high-frequency damping blend (0 = bright, 0.5 = darkest).
    pub fn set_damping(&mut self, blend: f32) {
        self.damper.set_blend(blend);
    }

    /// Current loop period in samples.
    pub fn period_samples(&self) -> f32 {
        self.period
    }

    /// Read a secondary tap at `ratio` times the main period.
    #[inline]
    pub fn tap(&self, ratio: f32) -> f32 {
        self.delay.read(self.period * ratio.max(0.05))
    }

    /// Inject one excitation sample and advance the loop.
    ///
    /// Returns the main tap (the string output).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let main = self.delay.read(self.period);
        let fed = self.dispersion.process(self.damper.process(main));
        self.delay.write(flush_denormal(input + fed * self.loop_gain));
        main
    }

    /// Silence the loop.
    pub fn clear(&mut self) {
        self.delay.clear();
        self.damper.reset();
        self.dispersion.reset();
    }
}
