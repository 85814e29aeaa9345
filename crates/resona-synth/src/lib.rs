//! Resona Synth - Real-time polyphonic synthesis engine
//!
//! The engine produces sample streams on a hard-real-time audio thread
//! while accepting notes and parameter moves from any control thread,
//! without locks and without blocking either side.
//!
//! # Architecture
//!
//! [`PolySynth::new`] returns two halves:
//!
//! - [`PolySynth`] — owned by the audio callback. Fixed pool of
//!   [`MAX_VOICES`] voices, round-robin allocation, one of five synthesis
//!   algorithms active at a time.
//! - [`SynthController`] — owned by the control side (UI, game logic,
//!   sequencer). Every setter is a non-blocking push onto a lock-free
//!   SPSC ring that the audio thread drains at each block boundary.
//!
//! The only other shared state is the set of published smoothed parameter
//! values, read back atomically via [`SynthController::parameter`].
//!
//! # Example
//!
//! ```rust
//! use resona_synth::{Algorithm, PolySynth};
//!
//! let (mut synth, mut controller) = PolySynth::new(48000.0);
//!
//! // Control side (any thread):
//! controller.set_synth_type(Algorithm::Pluck);
//! controller.set_filter_cutoff(0.8);
//! controller.note(60.0, 100.0); // C4
//!
//! // Audio side (the callback):
//! let mut block = vec![0.0f32; 128];
//! synth.process(&mut block);
//! ```
//!
//! # Components
//!
//! - [`AdEnvelope`] / [`AsrEnvelope`] — gate-driven phase envelopes
//! - [`BlendOscillator`] — band-limited four-waveform morphing oscillator
//! - [`Voice`] / [`VoiceKernel`] — one note's signal chain, five
//!   algorithms behind one dispatch surface
//! - [`SampleBank`] / [`SampleBuffer`] — immutable sample pool for the
//!   sampler algorithm
//! - [`SynthEvent`] / [`event_queue`] — the control → audio bridge
//! - [`EngineSettings`] — the persisted patch record

pub mod envelope;
pub mod event;
pub mod oscillator;
pub mod sample_bank;
pub mod settings;
pub mod synth;
pub mod voice;

// Re-export main types at crate root
pub use envelope::{AdEnvelope, AsrEnvelope, EnvelopeStage};
pub use event::{
    EVENT_QUEUE_CAPACITY, EventReceiver, EventSender, ParamId, SynthEvent, event_queue,
};
pub use oscillator::BlendOscillator;
pub use sample_bank::{BankError, MAX_SAMPLE_BUFFERS, SampleBank, SampleBuffer};
pub use settings::{EngineSettings, SettingsError};
pub use synth::{MAX_VOICES, PolySynth, SharedParams, SynthController};
pub use voice::{Algorithm, FREE_SLOT, Voice, VoiceControls, VoiceKernel};
