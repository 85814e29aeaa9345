//! Pre-loaded sample storage for the sample-playback algorithm.
//!
//! A [`SampleBank`] holds up to [`MAX_SAMPLE_BUFFERS`] mono buffers,
//! loaded once on the control side before the engine starts and immutable
//! afterwards. The bank owns every buffer outright; nothing is freed
//! per-buffer, the whole pool goes away when the bank is dropped. The
//! audio thread shares the bank through an `Arc` and only ever reads.

use thiserror::Error;

/// Maximum number of buffers a bank will accept.
pub const MAX_SAMPLE_BUFFERS: usize = 16;

/// Errors from bank loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankError {
    /// The bank already holds the maximum number of buffers.
    #[error("sample bank is full ({capacity} buffers)")]
    Full {
        /// The bank's fixed capacity.
        capacity: usize,
    },
    /// The buffer contained no samples.
    #[error("sample buffer is empty")]
    EmptyBuffer,
}

/// One immutable mono sample, with the frequency it was recorded at.
///
/// Playback rate for a note is `note_frequency / reference_hz`, so a
/// buffer played at its reference frequency advances one source sample
/// per output sample.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    data: Box<[f32]>,
    reference_hz: f32,
}

impl SampleBuffer {
    /// Create a buffer from sample data and its reference frequency.
    ///
    /// The reference frequency is clamped to at least 1 Hz so rate
    /// derivation can never divide by zero.
    pub fn new(data: Vec<f32>, reference_hz: f32) -> Self {
        Self {
            data: data.into_boxed_slice(),
            reference_hz: reference_hz.max(1.0),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reference frequency in Hz.
    pub fn reference_hz(&self) -> f32 {
        self.reference_hz
    }

    /// Read at a fractional position, linearly interpolated.
    ///
    /// Positions past the end (or negative) read as silence — a voice that
    /// plays a buffer out simply goes quiet.
    #[inline]
    pub fn read(&self, position: f32) -> f32 {
        if position < 0.0 {
            return 0.0;
        }
        let idx = position as usize;
        if idx + 1 >= self.data.len() {
            return 0.0;
        }
        let frac = position - idx as f32;
        let s0 = self.data[idx];
        let s1 = self.data[idx + 1];
        s0 + (s1 - s0) * frac
    }
}

/// Fixed-capacity pool of sample buffers.
#[derive(Debug, Default)]
pub struct SampleBank {
    buffers: Vec<SampleBuffer>,
}

impl SampleBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self {
            buffers: Vec::with_capacity(MAX_SAMPLE_BUFFERS),
        }
    }

    /// Load a buffer, returning its slot index.
    ///
    /// Fails when the bank is full or the buffer is empty; the bank is
    /// unchanged on failure.
    pub fn load(&mut self, buffer: SampleBuffer) -> Result<usize, BankError> {
        if buffer.is_empty() {
            return Err(BankError::EmptyBuffer);
        }
        if self.buffers.len() >= MAX_SAMPLE_BUFFERS {
            return Err(BankError::Full {
                capacity: MAX_SAMPLE_BUFFERS,
            });
        }
        let index = self.buffers.len();
        tracing::debug!(
            index,
            samples = buffer.len(),
            reference_hz = buffer.reference_hz(),
            "loaded sample buffer"
        );
        self.buffers.push(buffer);
        Ok(index)
    }

    /// Number of loaded buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the bank holds no buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Buffer at `index`, if loaded.
    pub fn get(&self, index: usize) -> Option<&SampleBuffer> {
        self.buffers.get(index)
    }

    /// Map a sound-source position in [0, 1] onto a pair of adjacent
    /// buffers and a crossfade fraction between them.
    ///
    /// Returns `None` for an empty bank. With a single buffer the pair is
    /// that buffer twice with zero fraction.
    pub fn select(&self, source: f32) -> Option<(usize, usize, f32)> {
        let n = self.buffers.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some((0, 0, 0.0));
        }
        let span = (n - 1) as f32;
        let pos = source.clamp(0.0, 1.0) * span;
        let first = (pos as usize).min(n - 2);
        let frac = pos - first as f32;
        Some((first, first + 1, frac.clamp(0.0, 1.0)))
    }
}
