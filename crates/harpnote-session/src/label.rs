//! Note identifiers: a breath direction plus a hole number.
//!
//! The text form puts the breath sign first: `"+3"` is hole 3 blown,
//! `"-10"` is hole 10 drawn.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// Number of holes on the instrument.
pub const HOLE_COUNT: u8 = 10;

/// Breath direction through a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Breath {
    /// Exhale, written `+`.
    Blow,
    /// Inhale, written `-`.
    Draw,
}

impl Breath {
    /// Sign character used in the text form.
    pub fn sign(self) -> char {
        match self {
            Self::Blow => '+',
            Self::Draw => '-',
        }
    }

    /// Parse a sign character.
    pub fn from_sign(sign: char) -> Option<Self> {
        match sign {
            '+' => Some(Self::Blow),
            '-' => Some(Self::Draw),
            _ => None,
        }
    }
}

/// A single playable note: breath direction and hole 1..=10.
///
/// # Example
///
/// ```rust
/// use harpnote_session::{Breath, NoteLabel};
///
/// let label: NoteLabel = "-4".parse().unwrap();
/// assert_eq!(label.breath(), Breath::Draw);
/// assert_eq!(label.hole(), 4);
/// assert_eq!(label.to_string(), "-4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteLabel {
    breath: Breath,
    hole: u8,
}

impl NoteLabel {
    /// Build a label, rejecting holes outside 1..=10.
    pub fn new(breath: Breath, hole: u8) -> Result<Self, LabelError> {
        if (1..=HOLE_COUNT).contains(&hole) {
            Ok(Self { breath, hole })
        } else {
            Err(LabelError::HoleOutOfRange(hole))
        }
    }

    /// Blow note on `hole`.
    pub fn blow(hole: u8) -> Result<Self, LabelError> {
        Self::new(Breath::Blow, hole)
    }

    /// Draw note on `hole`.
    pub fn draw(hole: u8) -> Result<Self, LabelError> {
        Self::new(Breath::Draw, hole)
    }

    /// Breath direction.
    pub fn breath(self) -> Breath {
        self.breath
    }

    /// Hole number, 1..=10.
    pub fn hole(self) -> u8 {
        self.hole
    }

    /// Zero-based hole index.
    pub fn hole_index(self) -> usize {
        usize::from(self.hole - 1)
    }

    /// Every label on one row, holes 1 through 10.
    pub fn row(breath: Breath) -> impl Iterator<Item = NoteLabel> {
        (1..=HOLE_COUNT).map(move |hole| NoteLabel { breath, hole })
    }
}

impl fmt::Display for NoteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.breath.sign(), self.hole)
    }
}

impl FromStr for NoteLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let sign = chars.next().ok_or(LabelError::Empty)?;
        let breath =
            Breath::from_sign(sign).ok_or_else(|| LabelError::MissingBreath(s.to_string()))?;
        let hole: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| LabelError::InvalidHole(s.to_string()))?;
        Self::new(breath, hole)
    }
}

/// How labels are shown to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelStyle {
    /// Hole number with breath sign, e.g. `-4`.
    #[default]
    Positional,
    /// Pitch name in the current key, e.g. `D5`.
    NoteName,
}

impl FromStr for LabelStyle {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" | "holes" | "hole" => Ok(Self::Positional),
            "note-name" | "notes" | "note" => Ok(Self::NoteName),
            _ => Err(LabelError::UnknownStyle(s.to_string())),
        }
    }
}
