//! Richter tuning: which pitch each hole plays in a given key.
//!
//! Offsets are semitones above the key note. Blow notes spell the tonic
//! chord across three octaves; draw notes fill in the scale, with the
//! missing sixth and fourth in the low octave characteristic of the layout.

use std::fmt;
use std::str::FromStr;

use harpnote_core::midi_to_freq;

use crate::error::LabelError;
use crate::label::{Breath, LabelStyle, NoteLabel};

/// Lowest selectable key (E2).
pub const KEY_MIN: u8 = 40;

/// Highest selectable key (A#4).
pub const KEY_MAX: u8 = 70;

/// Default key, C4.
pub const DEFAULT_KEY: u8 = 60;

/// Blow offsets for holes 1..=10.
pub const BLOW_OFFSETS: [u8; 10] = [0, 4, 7, 12, 16, 19, 24, 28, 31, 36];

/// Draw offsets for holes 1..=10.
pub const DRAW_OFFSETS: [u8; 10] = [2, 7, 11, 14, 17, 21, 23, 26, 29, 33];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name of a MIDI note with octave, e.g. `60` → `"C4"`.
pub fn midi_name(midi: u8) -> String {
    let octave = i32::from(midi / 12) - 1;
    format!("{}{}", NOTE_NAMES[usize::from(midi % 12)], octave)
}

/// Parse a note name such as `"C4"`, `"F#3"` or `"Bb2"` to a MIDI number.
pub fn parse_midi_name(name: &str) -> Result<u8, LabelError> {
    let invalid = || LabelError::InvalidKeyName(name.to_string());
    let trimmed = name.trim();
    let mut chars = trimmed.chars();

    let letter = chars.next().ok_or_else(invalid)?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };

    let rest = chars.as_str();
    let (accidental, octave) = if let Some(octave) = rest.strip_prefix('#') {
        (1, octave)
    } else if let Some(octave) = rest.strip_prefix('b') {
        (-1, octave)
    } else {
        (0, rest)
    };

    let octave: i32 = octave.parse().map_err(|_| invalid())?;
    let midi = (octave + 1) * 12 + base + accidental;
    u8::try_from(midi)
        .ok()
        .filter(|m| *m <= 127)
        .ok_or_else(invalid)
}

/// Key of the instrument.
///
/// # Example
///
/// ```rust
/// use harpnote_session::{NoteLabel, Tuning};
///
/// let c = Tuning::default();
/// assert_eq!(c.key_name(), "C4");
/// assert_eq!(c.note_name(NoteLabel::draw(4).unwrap()), "D5");
/// assert!((c.frequency_of(NoteLabel::blow(1).unwrap()) - 261.63).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    key_midi: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            key_midi: DEFAULT_KEY,
        }
    }
}

impl Tuning {
    /// Tuning for the key whose hole 1 blow note is `key_midi`.
    pub fn new(key_midi: u8) -> Result<Self, LabelError> {
        if (KEY_MIN..=KEY_MAX).contains(&key_midi) {
            Ok(Self { key_midi })
        } else {
            Err(LabelError::KeyOutOfRange(key_midi))
        }
    }

    /// MIDI note of hole 1 blow.
    pub fn key_midi(self) -> u8 {
        self.key_midi
    }

    /// Name of the key note, e.g. `"C4"`.
    pub fn key_name(self) -> String {
        midi_name(self.key_midi)
    }

    /// One semitone up, saturating at [`KEY_MAX`].
    pub fn raised(self) -> Self {
        Self {
            key_midi: (self.key_midi + 1).min(KEY_MAX),
        }
    }

    /// One semitone down, saturating at [`KEY_MIN`].
    pub fn lowered(self) -> Self {
        Self {
            key_midi: (self.key_midi - 1).max(KEY_MIN),
        }
    }

    /// MIDI note played by `label`.
    pub fn midi_of(self, label: NoteLabel) -> u8 {
        let offsets = match label.breath() {
            Breath::Blow => &BLOW_OFFSETS,
            Breath::Draw => &DRAW_OFFSETS,
        };
        self.key_midi + offsets[label.hole_index()]
    }

    /// Frequency in Hz played by `label`.
    pub fn frequency_of(self, label: NoteLabel) -> f32 {
        midi_to_freq(self.midi_of(label))
    }

    /// Pitch name of `label` in this key.
    pub fn note_name(self, label: NoteLabel) -> String {
        midi_name(self.midi_of(label))
    }

    /// Text shown for `label` in the given style.
    pub fn display(self, label: NoteLabel, style: LabelStyle) -> String {
        match style {
            LabelStyle::Positional => label.to_string(),
            LabelStyle::NoteName => self.note_name(label),
        }
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_name())
    }
}

impl FromStr for Tuning {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_midi_name(s)?)
    }
}
