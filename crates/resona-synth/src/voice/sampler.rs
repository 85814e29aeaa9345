//! Sample-playback voice.
//!
//! Plays buffers from a shared [`SampleBank`] at a rate derived from the
//! note: `note_frequency / buffer_reference_frequency`, so a buffer struck
//! at its reference pitch plays back 1:1 and an octave above plays twice
//! as fast. The sound-source control picks a pair of adjacent buffers and
//! crossfades between them; the result runs through a biquad lowpass and
//! an ASR envelope.
//!
//! With an empty bank the voice degrades to silence — the envelope still
//! runs so note lifecycle bookkeeping stays correct.

use crate::envelope::AsrEnvelope;
use crate::sample_bank::{MAX_SAMPLE_BUFFERS, SampleBank};
use crate::voice::VoiceControls;
use resona_core::{Biquad, lerp};
use std::sync::Arc;

const CUTOFF_MIN_HZ: f32 = 200.0;
const CUTOFF_MAX_HZ: f32 = 16000.0;
const Q_MIN: f32 = 0.6;
const Q_MAX: f32 = 4.0;
const ATTACK_MIN_MS: f32 = 1.0;
const ATTACK_MAX_MS: f32 = 1000.0;
const RELEASE_MIN_MS: f32 = 5.0;
const RELEASE_MAX_MS: f32 = 2000.0;

/// Sample-bank playback voice.
#[derive(Debug)]
pub struct SamplerVoice {
    bank: Arc<SampleBank>,
    /// Read position per bank slot; only the selected pair advances.
    positions: [f32; MAX_SAMPLE_BUFFERS],
    filter: Biquad,
    env: AsrEnvelope,
    sample_rate: f32,
    frequency: f32,
    source: f32,
    cutoff_hz: f32,
    quality: f32,
    gate: bool,
}

impl SamplerVoice {
    /// Create a voice reading from the given bank.
    pub fn new(sample_rate: f32, bank: Arc<SampleBank>) -> Self {
        Self {
            bank,
            positions: [0.0; MAX_SAMPLE_BUFFERS],
            filter: Biquad::new(),
            env: AsrEnvelope::new(sample_rate),
            sample_rate,
            frequency: 440.0,
            source: 0.0,
            cutoff_hz: 8000.0,
            quality: 0.707,
            gate: false,
        }
    }

    /// Drive the gate. A rising edge rewinds playback to the start.
    pub fn set_gate(&mut self, high: bool) {
        if high && !self.gate {
            self.positions = [0.0; MAX_SAMPLE_BUFFERS];
        }
        self.gate = high;
        self.env.set_gate(high);
    }

    /// Set the note frequency that drives the playback rate.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
    }

    /// Remap and apply the broadcast controls.
    pub fn apply_controls(&mut self, controls: &VoiceControls) {
        self.source = controls.sound_source.clamp(0.0, 1.0);
        self.cutoff_hz = lerp(
            CUTOFF_MIN_HZ,
            CUTOFF_MAX_HZ,
            controls.filter_cutoff.clamp(0.0, 1.0),
        );
        self.quality = lerp(Q_MIN, Q_MAX, controls.filter_quality.clamp(0.0, 1.0));
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
        let level = self.env.advance();

        let Some((first, second, frac)) = self.bank.select(self.source) else {
            return 0.0;
        };

        let mut read_and_advance = |slot: usize| -> f32 {
            // Slot indices come from the bank itself, so the lookups hold.
            let Some(buffer) = self.bank.get(slot) else {
                return 0.0;
            };
            let value = buffer.read(self.positions[slot]);
            self.positions[slot] += self.frequency / buffer.reference_hz();
            value
        };

        let a = read_and_advance(first);
        let b = if second == first {
            a
        } else {
            read_and_advance(second)
        };

        self.filter
            .set_lowpass(self.cutoff_hz, self.quality, self.sample_rate);
        self.filter.process(lerp(a, b, frac)) * level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_bank::SampleBuffer;
    use core::f32::consts::TAU;
    use libm::sinf;

    /// One second of a sine at `freq`, tagged with that reference.
    fn sine_buffer(freq: f32, len: usize) -> SampleBuffer {
        let data = (0..len)
            .map(|i| sinf(TAU * freq * i as f32 / 48000.0))
            .collect();
        SampleBuffer::new(data, freq)
    }

    fn controls(source: f32) -> VoiceControls {
        VoiceControls {
            sound_source: source,
            filter_cutoff: 1.0,
            filter_quality: 0.1,
            attack: 0.0,
            release: 0.1,
        }
    }

    fn bank_with(buffers: Vec<SampleBuffer>) -> Arc<SampleBank> {
        let mut bank = SampleBank::new();
        for b in buffers {
            bank.load(b).unwrap();
        }
        Arc::new(bank)
    }

    #[test]
    fn empty_bank_is_silent_but_lifecycle_runs() {
        let mut voice = SamplerVoice::new(48000.0, Arc::new(SampleBank::new()));
        voice.apply_controls(&controls(0.0));
        voice.set_gate(true);
        for _ in 0..100 {
            assert_eq!(voice.next(), 0.0);
        }
        assert!(voice.is_active());
        voice.set_gate(false);
        for _ in 0..48000 {
            voice.next();
        }
        assert!(!voice.is_active(), "envelope must still complete");
    }

    #[test]
    fn unity_rate_at_reference_pitch() {
        let bank = bank_with(vec![sine_buffer(440.0, 48000)]);
        let mut voice = SamplerVoice::new(48000.0, bank);
        voice.apply_controls(&controls(0.0));
        voice.set_frequency(440.0);
        voice.set_gate(true);

        // Past the (one-sample) attack, output should track the buffer:
        // a 440 Hz sine.
        for _ in 0..100 {
            voice.next();
        }
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..24000 {
            let s = voice.next();
            assert!(s.is_finite());
            if prev <= 0.0 && s > 0.0 {
                crossings += 1;
            }
            prev = s;
        }
        assert!(
            (crossings - 220i32).abs() <= 3,
            "expected ~220 crossings in half a second, got {crossings}"
        );
    }

    #[test]
    fn octave_up_doubles_rate() {
        let bank = bank_with(vec![sine_buffer(440.0, 48000)]);
        let mut voice = SamplerVoice::new(48000.0, bank);
        voice.apply_controls(&controls(0.0));
        voice.set_frequency(880.0);
        voice.set_gate(true);

        for _ in 0..100 {
            voice.next();
        }
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..24000 {
            let s = voice.next();
            if prev <= 0.0 && s > 0.0 {
                crossings += 1;
            }
            prev = s;
        }
        assert!(
            (crossings - 440i32).abs() <= 5,
            "octave up should double playback rate, got {crossings}"
        );
    }

    #[test]
    fn playback_past_end_goes_silent() {
        let bank = bank_with(vec![sine_buffer(440.0, 1000)]);
        let mut voice = SamplerVoice::new(48000.0, bank);
        voice.apply_controls(&controls(0.0));
        voice.set_frequency(440.0);
        voice.set_gate(true);

        for _ in 0..1000 {
            voice.next();
        }
        // Buffer exhausted: filtered silence from here on.
        let mut tail = 0.0f32;
        for _ in 0..1000 {
            tail += voice.next().abs();
        }
        assert!(tail < 1e-3, "expected silence past buffer end, got {tail}");
    }

    #[test]
    fn source_crossfades_between_buffers() {
        let bank = bank_with(vec![sine_buffer(220.0, 48000), sine_buffer(880.0, 48000)]);

        // Source at 0 plays only the first buffer at its own rate.
        let mut voice = SamplerVoice::new(48000.0, Arc::clone(&bank));
        voice.apply_controls(&controls(0.0));
        voice.set_frequency(220.0);
        voice.set_gate(true);
        for _ in 0..100 {
            voice.next();
        }
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..24000 {
            let s = voice.next();
            if prev <= 0.0 && s > 0.0 {
                crossings += 1;
            }
            prev = s;
        }
        assert!(
            (crossings - 110i32).abs() <= 3,
            "source=0 should play buffer 0 1:1, got {crossings}"
        );
    }
}
