//! Resona Core - DSP primitives for the resona synthesis engine
//!
//! This crate provides the signal-level building blocks the engine is
//! assembled from, designed for real-time use: no allocation and no locks
//! anywhere in the processing path.
//!
//! # Core Abstractions
//!
//! ## Parameter Smoothing & Publication
//!
//! - [`SmoothedParam`] - One-pole smoothing toward a target value
//! - [`SharedValue`] - Atomic bit-cast `f32` for lock-free cross-thread reads
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR with RBJ cookbook low/high/band-pass
//! - [`OnePole`] - 6 dB/oct lowpass for tone shaping and damping
//! - [`OneZero`] - Feedforward damper for feedback loops
//! - [`Allpass`] - First-order allpass for fractional-delay tuning
//! - [`CombFilter`] - Tunable feedback comb (the plucked-string resonator)
//!
//! ## Delay & Noise
//!
//! - [`InterpolatedDelay`] - Circular buffer with fractional reads
//! - [`NoiseGenerator`] - Xorshift32 white noise
//!
//! ## Utilities
//!
//! - [`lerp`], [`blend4`], [`pitch_to_freq`], [`ms_to_samples`],
//!   [`flush_denormal`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! resona-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: buffers are sized at construction, never resized
//! - **Per-sample retuning**: every filter's `set_*` methods are cheap
//!   enough to call at audio rate, because the engine does exactly that
//! - **Degeneracy clamped at the edges**: zero smoothing times, zero
//!   frequencies, and zero-length loops are clamped before they can turn
//!   into NaN in the signal path

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod comb;
pub mod delay;
pub mod math;
pub mod noise;
pub mod one_pole;
pub mod param;
pub mod shared;

// Re-export main types at crate root
pub use allpass::Allpass;
pub use biquad::{Biquad, bandpass_coefficients, highpass_coefficients, lowpass_coefficients};
pub use comb::CombFilter;
pub use delay::InterpolatedDelay;
pub use math::{blend4, flush_denormal, lerp, ms_to_samples, pitch_to_freq};
pub use noise::NoiseGenerator;
pub use one_pole::{OnePole, OneZero};
pub use param::SmoothedParam;
pub use shared::SharedValue;
