//! Control-thread → audio-thread event delivery.
//!
//! All control traffic — notes, parameter moves, algorithm switches — is
//! carried by a single-producer/single-consumer lock-free ring buffer
//! ([`rtrb`]). The control side owns the [`EventSender`], the audio side
//! owns the [`EventReceiver`], and neither ever blocks.
//!
//! The queue has a small fixed capacity. The audio callback drains it
//! completely at the start of every block (~2.7 ms at 48 kHz / 128-sample
//! blocks), so overflow only happens if a control thread floods far faster
//! than that. When it does, the push fails and the event is simply dropped:
//! losing a control gesture under overload is harmless, blocking the
//! producer or the audio thread is not.

use crate::voice::Algorithm;

/// Capacity of the control → audio event ring.
pub const EVENT_QUEUE_CAPACITY: usize = 20;

/// Identifies one of the engine's global, broadcast parameters.
///
/// All parameter values travel normalized to [0, 1]; each voice algorithm
/// remaps them to its own ranges (cutoff to a frequency span, quality to a
/// resonance span, and so on).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamId {
    /// Master output gain.
    Gain,
    /// Timbre / sound-source selector (waveform morph, FM topology,
    /// sample pair...).
    SoundSource,
    /// Filter cutoff position.
    FilterCutoff,
    /// Filter quality / resonance position.
    FilterQuality,
    /// Envelope attack time position.
    Attack,
    /// Envelope release time position.
    Release,
}

impl ParamId {
    /// Number of global parameters.
    pub const COUNT: usize = 6;

    /// All parameters in storage order.
    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::Gain,
        ParamId::SoundSource,
        ParamId::FilterCutoff,
        ParamId::FilterQuality,
        ParamId::Attack,
        ParamId::Release,
    ];

    /// Storage index of this parameter.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ParamId::Gain => 0,
            ParamId::SoundSource => 1,
            ParamId::FilterCutoff => 2,
            ParamId::FilterQuality => 3,
            ParamId::Attack => 4,
            ParamId::Release => 5,
        }
    }

    /// Parameter for a storage index.
    pub fn from_index(index: usize) -> Option<ParamId> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable name, for diagnostics and UI labels.
    pub fn name(self) -> &'static str {
        match self {
            ParamId::Gain => "gain",
            ParamId::SoundSource => "sound source",
            ParamId::FilterCutoff => "filter cutoff",
            ParamId::FilterQuality => "filter quality",
            ParamId::Attack => "attack",
            ParamId::Release => "release",
        }
    }
}

/// One control event, moved into the queue and consumed exactly once by
/// the audio thread, in FIFO order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SynthEvent {
    /// Start a note. `pitch` is a (possibly fractional) MIDI-style pitch
    /// identifier; `velocity` is in [0, 127].
    NoteOn {
        /// Pitch identifier.
        pitch: f32,
        /// Note velocity, 0-127.
        velocity: f32,
    },
    /// Release the voice bound to `pitch`; unmatched pitches are a no-op.
    NoteOff {
        /// Pitch identifier given at note-on.
        pitch: f32,
    },
    /// Glide the voice bound to `from` toward `to` without retriggering.
    PitchBend {
        /// Pitch the voice is currently bound to.
        from: f32,
        /// Destination pitch.
        to: f32,
    },
    /// Move a global parameter (value normalized to [0, 1]).
    ParamChange {
        /// Which parameter.
        id: ParamId,
        /// New target value.
        value: f32,
    },
    /// Switch the synthesis algorithm, rebuilding the whole voice pool.
    SetAlgorithm(Algorithm),
    /// Release every sounding voice.
    AllNotesOff,
}

/// Producer half of the event ring. Owned by the control side.
#[derive(Debug)]
pub struct EventSender {
    producer: rtrb::Producer<SynthEvent>,
}

impl EventSender {
    /// Push an event; returns `false` if the ring was full and the event
    /// was dropped. Never blocks.
    pub fn send(&mut self, event: SynthEvent) -> bool {
        match self.producer.push(event) {
            Ok(()) => true,
            Err(rtrb::PushError::Full(dropped)) => {
                tracing::trace!(?dropped, "event queue full, dropping event");
                false
            }
        }
    }
}

/// Consumer half of the event ring. Owned by the audio side.
#[derive(Debug)]
pub struct EventReceiver {
    consumer: rtrb::Consumer<SynthEvent>,
}

impl EventReceiver {
    /// Pop the oldest pending event, if any. Never blocks.
    #[inline]
    pub fn pop(&mut self) -> Option<SynthEvent> {
        self.consumer.pop().ok()
    }

    /// Whether the ring currently holds no events.
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

/// Create a connected sender/receiver pair with the given capacity.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (producer, consumer) = rtrb::RingBuffer::new(capacity);
    (EventSender { producer }, EventReceiver { consumer })
}
