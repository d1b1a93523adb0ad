//! Error types for labels and tuning.

use thiserror::Error;

/// Errors from parsing note labels, key names and label styles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// Empty input.
    #[error("empty note label")]
    Empty,

    /// Label does not start with `+` or `-`.
    #[error("note label '{0}' must start with '+' (blow) or '-' (draw)")]
    MissingBreath(String),

    /// Hole part is not a number.
    #[error("note label '{0}' has no valid hole number")]
    InvalidHole(String),

    /// Hole number outside 1..=10.
    #[error("hole {0} out of range (1-10)")]
    HoleOutOfRange(u8),

    /// Key name could not be parsed.
    #[error("invalid key name '{0}' (expected e.g. C4, F#3, Bb2)")]
    InvalidKeyName(String),

    /// Key outside the supported MIDI range.
    #[error("key MIDI note {0} out of range ({min}-{max})", min = crate::tuning::KEY_MIN, max = crate::tuning::KEY_MAX)]
    KeyOutOfRange(u8),

    /// Unknown label style.
    #[error("unknown label style '{0}' (expected 'holes' or 'notes')")]
    UnknownStyle(String),
}
