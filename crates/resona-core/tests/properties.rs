//! Property-based tests for resona-core DSP primitives.
//!
//! Filter stability under randomized tuning, parameter convergence, and
//! crossfade bounds, using proptest for input generation.

use proptest::prelude::*;
use resona_core::{
    Biquad, CombFilter, NoiseGenerator, OnePole, SmoothedParam, blend4,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any cutoff and Q — including degenerate ones — the biquad
    /// responses produce finite output over random input.
    #[test]
    fn biquad_stability(
        freq in 0.0f32..30000.0f32,
        q in 0.0f32..20.0f32,
        variant in 0usize..3,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let sr = 48000.0;
        let mut biquad = Biquad::new();
        match variant {
            0 => biquad.set_lowpass(freq, q, sr),
            1 => biquad.set_highpass(freq, q, sr),
            _ => biquad.set_bandpass(freq, q, sr),
        }

        for &sample in &input {
            let out = biquad.process(sample);
            prop_assert!(
                out.is_finite(),
                "variant {} (freq={freq}, q={q}) produced {out}",
                variant
            );
        }
    }

    /// A smoothed parameter approaches a constant target monotonically and
    /// never crosses it, for any start, target, and smoothing time.
    #[test]
    fn smoothed_param_monotone_no_overshoot(
        start in -100.0f32..100.0f32,
        target in -100.0f32..100.0f32,
        smoothing_ms in -10.0f32..200.0f32,
    ) {
        let mut param = SmoothedParam::with_config(start, 48000.0, smoothing_ms);
        param.set_target(target);

        let rising = target >= start;
        let mut prev = start;
        for _ in 0..4096 {
            let v = param.advance();
            prop_assert!(v.is_finite());
            if rising {
                prop_assert!(v >= prev - 1e-4 && v <= target + 1e-4);
            } else {
                prop_assert!(v <= prev + 1e-4 && v >= target - 1e-4);
            }
            prev = v;
        }
    }

    /// The four-band crossfade always stays inside the hull of its inputs.
    #[test]
    fn blend4_within_input_hull(
        a in -1.0f32..1.0f32,
        b in -1.0f32..1.0f32,
        c in -1.0f32..1.0f32,
        d in -1.0f32..1.0f32,
        mix in -0.5f32..1.5f32,
    ) {
        let lo = a.min(b).min(c).min(d);
        let hi = a.max(b).max(c).max(d);
        let v = blend4(a, b, c, d, mix);
        prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6, "{v} outside [{lo}, {hi}]");
    }

    /// One-pole lowpass output never exceeds the input bound.
    #[test]
    fn one_pole_bounded(
        cutoff in 0.0f32..24000.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut lp = OnePole::new(48000.0, cutoff);
        for &x in &input {
            let y = lp.process(x);
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() <= 1.0 + 1e-5);
        }
    }

    /// A comb loop below unity gain fed with noise stays bounded.
    #[test]
    fn comb_bounded_under_noise(
        period in 2.0f32..500.0f32,
        gain in 0.0f32..0.999f32,
        damping in 0.0f32..1.0f32,
        seed in 1u32..u32::MAX,
    ) {
        let mut comb = CombFilter::new(512);
        comb.set_period_samples(period);
        comb.set_loop_gain(gain);
        comb.set_damping(damping);

        let mut noise = NoiseGenerator::with_seed(seed);
        for _ in 0..2048 {
            let out = comb.process(noise.next() * 0.5);
            prop_assert!(out.is_finite());
            // Loose bound: geometric series of the loop gain.
            prop_assert!(out.abs() < 1000.0);
        }
    }
}
