//! Persisted engine settings.
//!
//! The save layer (outside this crate) stores one line of delimited plain
//! text per patch. This module only converts between that record and a
//! typed [`EngineSettings`]; it performs no file I/O. Field order is
//! fixed:
//!
//! ```text
//! synth_type,gain,sound_source,filter_cutoff,filter_quality,attack,release,octave
//! ```

use crate::voice::Algorithm;
use thiserror::Error;

/// Field delimiter in the persisted record.
const DELIMITER: char = ',';

/// Number of fields in a record.
const FIELD_COUNT: usize = 8;

/// Errors from parsing a persisted record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// Wrong number of delimited fields.
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Required field count.
        expected: usize,
        /// Fields actually present.
        found: usize,
    },
    /// A field failed to parse as a number.
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },
    /// The synth-type index does not name an algorithm.
    #[error("unknown synth type index {0}")]
    UnknownAlgorithm(usize),
}

/// A full engine configuration, as persisted between sessions.
///
/// Parameter fields are normalized to [0, 1]; `octave` transposes incoming
/// notes by twelve semitones per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Active synthesis algorithm.
    pub algorithm: Algorithm,
    /// Master gain.
    pub gain: f32,
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
    /// Note transposition in octaves.
    pub octave: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Subtractive,
            gain: 0.8,
            sound_source: 0.0,
            filter_cutoff: 0.5,
            filter_quality: 0.2,
            attack: 0.05,
            release: 0.3,
            octave: 0,
        }
    }
}

impl EngineSettings {
    /// Parse a delimited record.
    pub fn from_record(record: &str) -> Result<Self, SettingsError> {
        let fields: Vec<&str> = record.trim().split(DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(SettingsError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let synth_index: usize = parse(fields[0], "synth_type")?;
        let algorithm = Algorithm::from_index(synth_index)
            .ok_or(SettingsError::UnknownAlgorithm(synth_index))?;

        Ok(Self {
            algorithm,
            gain: parse(fields[1], "gain")?,
            sound_source: parse(fields[2], "sound_source")?,
            filter_cutoff: parse(fields[3], "filter_cutoff")?,
            filter_quality: parse(fields[4], "filter_quality")?,
            attack: parse(fields[5], "attack")?,
            release: parse(fields[6], "release")?,
            octave: parse(fields[7], "octave")?,
        })
    }

    /// Serialize back to the delimited record form.
    pub fn to_record(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.algorithm.index(),
            self.gain,
            self.sound_source,
            self.filter_cutoff,
            self.filter_quality,
            self.attack,
            self.release,
            self.octave,
        )
    }
}

fn parse<T: core::str::FromStr>(text: &str, field: &'static str) -> Result<T, SettingsError> {
    text.trim().parse().map_err(|_| SettingsError::InvalidNumber {
        field,
        value: text.to_string(),
    })
}
