//! Voices: one monophonic sound-producing unit per note.
//!
//! A [`Voice`] pairs the bookkeeping every algorithm shares — the pitch
//! slot it is bound to, the velocity gain, the smoothed frequency ramp —
//! with a [`VoiceKernel`], the algorithm-specific signal chain. The kernel
//! is a tagged enum rather than a trait object: the synthesizer owns a
//! plain array of voices, dispatch is a match, and nothing is boxed.
//!
//! All kernels speak the same narrow surface: `set_gate`, `set_frequency`,
//! `apply_controls`, `next`, `is_active`. The global parameters arrive
//! normalized to [0, 1] in a [`VoiceControls`] frame and each kernel remaps
//! them to its own ranges.

mod drum;
mod fm;
mod pluck;
mod sampler;
mod subtractive;

pub use drum::DrumVoice;
pub use fm::FmVoice;
pub use pluck::PluckVoice;
pub use sampler::SamplerVoice;
pub use subtractive::SubtractiveVoice;

use crate::sample_bank::SampleBank;
use resona_core::SmoothedParam;
use std::sync::Arc;

/// Pitch slot value of an unbound voice.
pub const FREE_SLOT: f32 = -1.0;

/// Frequency ramp on note-on, in milliseconds.
const NOTE_RAMP_MS: f32 = 5.0;

/// Frequency glide on pitch bend, in milliseconds.
const BEND_RAMP_MS: f32 = 30.0;

/// The synthesis algorithms a voice pool can be built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Blend oscillator through a resonant lowpass.
    #[default]
    Subtractive,
    /// Four-operator FM with morphable topology and ratio presets.
    Fm,
    /// Karplus-Strong plucked string.
    Pluck,
    /// Percussive body + noise layer.
    Drum,
    /// Sample-bank playback.
    Sampler,
}

impl Algorithm {
    /// All algorithms, in persisted-index order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Subtractive,
        Algorithm::Fm,
        Algorithm::Pluck,
        Algorithm::Drum,
        Algorithm::Sampler,
    ];

    /// Persisted index of this algorithm.
    pub fn index(self) -> usize {
        match self {
            Algorithm::Subtractive => 0,
            Algorithm::Fm => 1,
            Algorithm::Pluck => 2,
            Algorithm::Drum => 3,
            Algorithm::Sampler => 4,
        }
    }

    /// Algorithm for a persisted index.
    pub fn from_index(index: usize) -> Option<Algorithm> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Subtractive => "subtractive",
            Algorithm::Fm => "fm",
            Algorithm::Pluck => "pluck",
            Algorithm::Drum => "drum",
            Algorithm::Sampler => "sampler",
        }
    }
}

/// One sample's worth of broadcast control values, normalized to [0, 1].
#[derive(Clone, Copy, Debug)]
pub struct VoiceControls {
    /// Timbre / sound-source position.
    pub sound_source: f32,
    /// Filter cutoff position.
    pub filter_cutoff: f32,
    /// Filter quality position.
    pub filter_quality: f32,
    /// Attack time position.
    pub attack: f32,
    /// Release time position.
    pub release: f32,
}

/// Algorithm-specific signal chain behind a voice.
#[derive(Debug)]
pub enum VoiceKernel {
    /// Subtractive chain.
    Subtractive(SubtractiveVoice),
    /// FM operator stack.
    Fm(FmVoice),
    /// Plucked-string loop.
    Pluck(PluckVoice),
    /// Drum body + noise.
    Drum(DrumVoice),
    /// Sample playback.
    Sampler(SamplerVoice),
}

impl VoiceKernel {
    /// Build the kernel for an algorithm.
    pub fn new(algorithm: Algorithm, sample_rate: f32, bank: &Arc<SampleBank>) -> Self {
        match algorithm {
            Algorithm::Subtractive => {
                VoiceKernel::Subtractive(SubtractiveVoice::new(sample_rate))
            }
            Algorithm::Fm => VoiceKernel::Fm(FmVoice::new(sample_rate)),
            Algorithm::Pluck => VoiceKernel::Pluck(PluckVoice::new(sample_rate)),
            Algorithm::Drum => VoiceKernel::Drum(DrumVoice::new(sample_rate)),
            Algorithm::Sampler => {
                VoiceKernel::Sampler(SamplerVoice::new(sample_rate, Arc::clone(bank)))
            }
        }
    }

    /// Drive the envelope gate.
    #[inline]
    pub fn set_gate(&mut self, high: bool) {
        match self {
            VoiceKernel::Subtractive(v) => v.set_gate(high),
            VoiceKernel::Fm(v) => v.set_gate(high),
            VoiceKernel::Pluck(v) => v.set_gate(high),
            VoiceKernel::Drum(v) => v.set_gate(high),
            VoiceKernel::Sampler(v) => v.set_gate(high),
        }
    }

    /// Set the fundamental frequency in Hz.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        match self {
            VoiceKernel::Subtractive(v) => v.set_frequency(freq_hz),
            VoiceKernel::Fm(v) => v.set_frequency(freq_hz),
            VoiceKernel::Pluck(v) => v.set_frequency(freq_hz),
            VoiceKernel::Drum(v) => v.set_frequency(freq_hz),
            VoiceKernel::Sampler(v) => v.set_frequency(freq_hz),
        }
    }

    /// Apply the broadcast control frame.
    #[inline]
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        match self {
            VoiceKernel::Subtractive(v) => v.apply_controls(controls),
            VoiceKernel::Fm(v) => v.apply_controls(controls),
            VoiceKernel::Pluck(v) => v.apply_controls(controls),
            VoiceKernel::Drum(v) => v.apply_controls(controls),
            VoiceKernel::Sampler(v) => v.apply_controls(controls),
        }
    }

    /// Generate the next sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        match self {
            VoiceKernel::Subtractive(v) => v.next(),
            VoiceKernel::Fm(v) => v.next(),
            VoiceKernel::Pluck(v) => v.next(),
            VoiceKernel::Drum(v) => v.next(),
            VoiceKernel::Sampler(v) => v.next(),
        }
    }

    /// Whether any envelope has yet to reach its terminal off state.
    #[inline]
    pub fn is_active(&self) -> bool {
        match self {
            VoiceKernel::Subtractive(v) => v.is_active(),
            VoiceKernel::Fm(v) => v.is_active(),
            VoiceKernel::Pluck(v) => v.is_active(),
            VoiceKernel::Drum(v) => v.is_active(),
            VoiceKernel::Sampler(v) => v.is_active(),
        }
    }
}

/// A single polyphonic voice: shared bookkeeping around a kernel.
#[derive(Debug)]
pub struct Voice {
    kernel: VoiceKernel,
    /// Pitch identifier this voice is bound to, or [`FREE_SLOT`].
    pitch: f32,
    /// Velocity gain in [0, 1].
    gain: f32,
    /// Smoothed fundamental frequency in Hz.
    freq: SmoothedParam,
}

impl Voice {
    /// Create a free voice for the given algorithm.
    pub fn new(algorithm: Algorithm, sample_rate: f32, bank: &Arc<SampleBank>) -> Self {
        Self {
            kernel: VoiceKernel::new(algorithm, sample_rate, bank),
            pitch: FREE_SLOT,
            gain: 0.0,
            freq: SmoothedParam::with_config(440.0, sample_rate, NOTE_RAMP_MS),
        }
    }

    /// Bind this voice to a note and trigger its envelopes.
    ///
    /// The frequency ramps over a short fixed window from wherever the
    /// voice previously sat. The gate is cycled low→high so a stolen voice
    /// whose gate was still high retriggers its envelopes.
    pub fn note_on(&mut self, pitch: f32, velocity: f32, freq_hz: f32) {
        self.pitch = pitch;
        self.gain = (velocity / 127.0).clamp(0.0, 1.0);
        self.freq.set_target_with_time(freq_hz, NOTE_RAMP_MS);
        self.kernel.set_gate(false);
        self.kernel.set_gate(true);
    }

    /// Release the note and free the slot. The envelope decays on its own;
    /// the voice stays active until it reaches its off state.
    pub fn note_off(&mut self) {
        self.kernel.set_gate(false);
        self.pitch = FREE_SLOT;
    }

    /// Glide to a new pitch without retriggering envelopes. The slot is
    /// rebound to the destination pitch so later note-offs match it.
    pub fn bend_to(&mut self, pitch: f32, freq_hz: f32) {
        self.pitch = pitch;
        self.freq.set_target_with_time(freq_hz, BEND_RAMP_MS);
    }

    /// Pitch identifier bound to this voice, or [`FREE_SLOT`].
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Whether this voice still contributes to the output.
    pub fn is_active(&self) -> bool {
        self.kernel.is_active()
    }

    /// Forward the broadcast control frame to the kernel.
    #[inline]
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        self.kernel.apply_controls(controls);
    }

    /// Generate this voice's next sample (frequency ramp included).
    #[inline]
    pub fn next(&mut self) -> f32 {
        let freq = self.freq.advance();
        self.kernel.set_frequency(freq);
        self.kernel.next() * self.gain
    }
}
