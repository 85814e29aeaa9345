//! Lock-free scalar publication between threads.
//!
//! The audio thread is the sole writer of a parameter's smoothed value, but
//! the control thread wants to read it back (level meters, knob read-out).
//! [`SharedValue`] carries an `f32` through a bit-cast `AtomicU32` so the
//! read never takes a lock and the write never blocks the audio callback.

use core::sync::atomic::{AtomicU32, Ordering};

/// An `f32` published by one thread and read by others, without locks.
///
/// Writes use `Release` ordering and reads use `Acquire`, so a reader that
/// observes a stored value also observes everything the writer did before
/// storing it.
#[derive(Debug)]
pub struct SharedValue {
    bits: AtomicU32,
}

impl SharedValue {
    /// Create a shared value with an initial reading.
    pub fn new(initial: f32) -> Self {
        Self {
            bits: AtomicU32::new(initial.to_bits()),
        }
    }

    /// Publish a new value (writer side — the audio thread).
    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Read the last published value (any thread).
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for SharedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clone for SharedValue {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}
