//! Four-operator FM voice with morphable topology.
//!
//! Classic phase-modulation FM: each operator is a sine oscillator whose
//! phase is pushed around by the outputs of the operators above it in the
//! modulation graph. Which operator feeds which — and how hard — is given
//! by a topology matrix chosen from a fixed table of eight, and each
//! operator's frequency is the note frequency times a ratio from a table
//! of eight presets.
//!
//! Both tables are indexed by a *fractional* position: the active matrix
//! and ratio set are linearly interpolated between adjacent entries, so a
//! sweep of the topology or ratio control morphs the timbre smoothly
//! instead of stepping.
//!
//! Every matrix here is strictly upper-triangular (operator `i` is only
//! modulated by operators with a higher index), so one pass from operator
//! 3 down to operator 0 evaluates the whole graph with same-sample
//! modulation and no feedback.

use crate::envelope::AsrEnvelope;
use crate::voice::VoiceControls;
use core::f32::consts::{PI, TAU};
use libm::sinf;
use resona_core::lerp;

const OPERATOR_COUNT: usize = 4;
const ATTACK_MIN_MS: f32 = 1.0;
const ATTACK_MAX_MS: f32 = 1000.0;
const RELEASE_MIN_MS: f32 = 5.0;
const RELEASE_MAX_MS: f32 = 2000.0;

/// Peak phase deviation in radians when the depth control is fully open.
const MAX_MOD_DEPTH: f32 = 2.0 * PI;

/// One modulation topology: `mods[dst][src]` is how strongly operator
/// `src`'s output deviates operator `dst`'s phase, and `carriers[i]` is
/// operator `i`'s weight in the audible mix.
#[derive(Debug, Clone, Copy)]
struct Topology {
    mods: [[f32; OPERATOR_COUNT]; OPERATOR_COUNT],
    carriers: [f32; OPERATOR_COUNT],
}

/// Eight topologies, ordered from pure sine to dense stacks. Only entries
/// with `src > dst` are ever non-zero (upper-triangular constraint).
const TOPOLOGIES: [Topology; 8] = [
    // 0: single carrier, no modulation
    Topology {
        mods: [[0.0; 4]; 4],
        carriers: [1.0, 0.0, 0.0, 0.0],
    },
    // 1: one modulator pair, 1 -> 0
    Topology {
        mods: [
            [0.0, 1.0, 0.0, 0.0],
            [0.0; 4],
            [0.0; 4],
            [0.0; 4],
        ],
        carriers: [1.0, 0.0, 0.0, 0.0],
    },
    // 2: three-op chain, 2 -> 1 -> 0
    Topology {
        mods: [
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.8, 0.0],
            [0.0; 4],
            [0.0; 4],
        ],
        carriers: [1.0, 0.0, 0.0, 0.0],
    },
    // 3: full chain, 3 -> 2 -> 1 -> 0
    Topology {
        mods: [
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.8, 0.0],
            [0.0, 0.0, 0.0, 0.6],
            [0.0; 4],
        ],
        carriers: [1.0, 0.0, 0.0, 0.0],
    },
    // 4: two parallel pairs, 1 -> 0 and 3 -> 2
    Topology {
        mods: [
            [0.0, 1.0, 0.0, 0.0],
            [0.0; 4],
            [0.0, 0.0, 0.0, 1.0],
            [0.0; 4],
        ],
        carriers: [0.5, 0.0, 0.5, 0.0],
    },
    // 5: two modulators into one carrier, 1 -> 0 and 2 -> 0
    Topology {
        mods: [
            [0.0, 0.8, 0.8, 0.0],
            [0.0; 4],
            [0.0; 4],
            [0.0; 4],
        ],
        carriers: [1.0, 0.0, 0.0, 0.0],
    },
    // 6: branching tree, 3 -> {1, 2}, both -> 0
    Topology {
        mods: [
            [0.0, 0.7, 0.7, 0.0],
            [0.0, 0.0, 0.0, 0.7],
            [0.0, 0.0, 0.0, 0.7],
            [0.0; 4],
        ],
        carriers: [1.0, 0.0, 0.0, 0.0],
    },
    // 7: additive, all four audible, no modulation
    Topology {
        mods: [[0.0; 4]; 4],
        carriers: [0.4, 0.3, 0.2, 0.1],
    },
];

/// Eight frequency-ratio presets, from plain unison through odd-harmonic
/// and inharmonic (bell-like) spreads.
const RATIO_PRESETS: [[f32; OPERATOR_COUNT]; 8] = [
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 2.0, 1.0, 2.0],
    [1.0, 2.0, 3.0, 4.0],
    [1.0, 3.0, 5.0, 7.0],
    [1.0, 2.0, 4.0, 8.0],
    [1.0, 0.5, 2.0, 4.0],
    [1.0, 1.41, 2.0, 2.82],
    [1.0, 3.51, 5.19, 7.07],
];

/// A single sine operator: a bare phase accumulator.
#[derive(Debug, Clone)]
struct Operator {
    phase: f32,
    sample_rate: f32,
}

impl Operator {
    fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Advance at `freq_hz` with `phase_mod` radians of deviation.
    #[inline]
    fn advance(&mut self, freq_hz: f32, phase_mod: f32) -> f32 {
        let out = sinf(TAU * self.phase + phase_mod);
        self.phase += freq_hz.clamp(0.0, self.sample_rate * 0.5) / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Four-operator FM voice.
#[derive(Debug)]
pub struct FmVoice {
    ops: [Operator; OPERATOR_COUNT],
    env: AsrEnvelope,
    frequency: f32,
    /// Fractional index into [`TOPOLOGIES`], 0..=7.
    topology_pos: f32,
    /// Fractional index into [`RATIO_PRESETS`], 0..=7.
    ratio_pos: f32,
    /// Modulation depth scale in [0, 1].
    depth: f32,
    gate: bool,
}

impl FmVoice {
    /// Create a voice at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            ops: core::array::from_fn(|_| Operator::new(sample_rate)),
            env: AsrEnvelope::new(sample_rate),
            frequency: 440.0,
            topology_pos: 0.0,
            ratio_pos: 0.0,
            depth: 0.5,
            gate: false,
        }
    }

    /// Drive the amplitude envelope gate. A rising edge also resets the
    /// operator phases so the attack transient is identical per strike.
    pub fn set_gate(&mut self, high: bool) {
        if high && !self.gate {
            for op in &mut self.ops {
                op.reset();
            }
        }
        self.gate = high;
        self.env.set_gate(high);
    }

    /// Set the note frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
    }

    /// Remap and apply the broadcast controls: sound source sweeps the
    /// topology table, quality sweeps the ratio table, cutoff scales the
    /// modulation depth.
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        self.topology_pos = controls.sound_source.clamp(0.0, 1.0) * 7.0;
        self.ratio_pos = controls.filter_quality.clamp(0.0, 1.0) * 7.0;
        self.depth = controls.filter_cutoff.clamp(0.0, 1.0);
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
        let (lo, hi, frac) = table_position(self.topology_pos);
        let (rlo, rhi, rfrac) = table_position(self.ratio_pos);

        let mut outs = [0.0f32; OPERATOR_COUNT];
        let mut mixed = 0.0f32;

        // Upper-triangular matrices: evaluating top-down resolves every
        // modulator before its target.
        for i in (0..OPERATOR_COUNT).rev() {
            let mut phase_mod = 0.0;
            for src in (i + 1)..OPERATOR_COUNT {
                let amount = lerp(
                    TOPOLOGIES[lo].mods[i][src],
                    TOPOLOGIES[hi].mods[i][src],
                    frac,
                );
                phase_mod += amount * outs[src];
            }
            phase_mod *= self.depth * MAX_MOD_DEPTH;

            let ratio = lerp(RATIO_PRESETS[rlo][i], RATIO_PRESETS[rhi][i], rfrac);
            outs[i] = self.ops[i].advance(self.frequency * ratio, phase_mod);

            let carrier = lerp(
                TOPOLOGIES[lo].carriers[i],
                TOPOLOGIES[hi].carriers[i],
                frac,
            );
            mixed += carrier * outs[i];
        }

        mixed * self.env.advance()
    }
}

/// Split a fractional table position into adjacent indices and a blend.
#[inline]
fn table_position(pos: f32) -> (usize, usize, f32) {
    let pos = pos.clamp(0.0, 7.0);
    let lo = (pos as usize).min(6);
    (lo, lo + 1, pos - lo as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(source: f32, cutoff: f32, quality: f32) -> VoiceControls {
        VoiceControls {
            sound_source: source,
            filter_cutoff: cutoff,
            filter_quality: quality,
            attack: 0.01,
            release: 0.1,
        }
    }

    #[test]
    fn pure_sine_at_topology_zero() {
        let mut voice = FmVoice::new(48000.0);
        voice.apply_controls(&controls(0.0, 1.0, 0.0));
        voice.set_frequency(440.0);
        voice.set_gate(true);

        // Skip the attack, then count zero crossings over one second.
        for _ in 0..2000 {
            voice.next();
        }
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..48000 {
            let s = voice.next();
            assert!(s.is_finite());
            if prev <= 0.0 && s > 0.0 {
                crossings += 1;
            }
            prev = s;
        }
        assert!(
            (crossings - 440i32).abs() <= 2,
            "expected ~440 Hz sine, got {crossings} crossings"
        );
    }

    #[test]
    fn modulation_adds_harmonics() {
        // Compare waveform peak slope: modulated FM output moves faster
        // within a cycle than a pure sine of the same frequency.
        let run = |source: f32, depth: f32| {
            let mut voice = FmVoice::new(48000.0);
            voice.apply_controls(&controls(source, depth, 0.25));
            voice.set_frequency(220.0);
            voice.set_gate(true);
            for _ in 0..2000 {
                voice.next();
            }
            let mut max_step = 0.0f32;
            let mut prev = 0.0f32;
            for _ in 0..4800 {
                let s = voice.next();
                max_step = max_step.max((s - prev).abs());
                prev = s;
            }
            max_step
        };

        let plain = run(0.0, 0.0);
        let modulated = run(1.0 / 7.0, 1.0); // exactly topology 1
        assert!(
            modulated > plain * 1.3,
            "modulation should brighten: plain={plain}, modulated={modulated}"
        );
    }

    #[test]
    fn topology_sweep_is_finite_everywhere() {
        let mut voice = FmVoice::new(48000.0);
        voice.set_frequency(330.0);
        voice.set_gate(true);
        for i in 0..48000 {
            let sweep = i as f32 / 48000.0;
            voice.apply_controls(&controls(sweep, 1.0, 1.0 - sweep));
            let s = voice.next();
            assert!(s.is_finite());
            assert!(s.abs() <= 1.5, "FM output out of bounds: {s}");
        }
    }

    #[test]
    fn interpolated_tables_blend_adjacent_entries() {
        let (lo, hi, frac) = table_position(3.5);
        assert_eq!((lo, hi), (3, 4));
        assert!((frac - 0.5).abs() < 1e-6);

        // Endpoint clamps to the last pair.
        let (lo, hi, frac) = table_position(7.0);
        assert_eq!((lo, hi), (6, 7));
        assert!((frac - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_frequency_is_finite() {
        let mut voice = FmVoice::new(48000.0);
        voice.apply_controls(&controls(0.5, 1.0, 0.5));
        voice.set_frequency(0.0);
        voice.set_gate(true);
        for _ in 0..1000 {
            assert!(voice.next().is_finite());
        }
    }
}
