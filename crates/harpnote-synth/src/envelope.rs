//! Linear attack/sustain/release envelope for the reed voice.
//!
//! Short fixed ramps on both ends keep note boundaries from clicking while
//! staying fast enough to feel immediate under a finger.

/// Attack ramp length in seconds.
pub const ATTACK_SECONDS: f32 = 0.015;

/// Release ramp length in seconds.
pub const RELEASE_SECONDS: f32 = 0.120;

/// Envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EnvelopeState {
    /// Envelope is inactive: output is zero.
    #[default]
    Idle = 0,
    /// Attack phase: output ramps linearly from 0 to 1.
    Attack = 1,
    /// Sustain phase: output holds at 1 until note-off.
    Sustain = 2,
    /// Release phase: output ramps linearly from 1 to 0.
    Release = 3,
}

impl EnvelopeState {
    /// Decode a state published as a raw byte.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Attack,
            2 => Self::Sustain,
            3 => Self::Release,
            _ => Self::Idle,
        }
    }

    /// Whether the envelope is producing a non-idle signal.
    pub fn is_active(self) -> bool {
        self != Self::Idle
    }
}

/// What a note-on does to an envelope that is already sounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RetriggerPolicy {
    /// Restart the attack ramp from zero elapsed time.
    ///
    /// A retrigger during release or mid-attack jumps the amplitude down to
    /// the start of the ramp, which can be audible as a small click.
    #[default]
    Restart,
    /// Resume the attack ramp from the amplitude currently held, so the
    /// output stays continuous across the retrigger.
    Continue,
}

/// Linear attack/sustain/release envelope.
///
/// # Example
///
/// ```rust
/// use harpnote_synth::{EnvelopeState, ToneEnvelope};
///
/// let mut env = ToneEnvelope::new(48000.0);
/// env.gate_on();
/// assert_eq!(env.state(), EnvelopeState::Attack);
///
/// for _ in 0..1000 {
///     env.advance();
/// }
/// assert_eq!(env.state(), EnvelopeState::Sustain);
/// assert_eq!(env.level(), 1.0);
///
/// env.gate_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct ToneEnvelope {
    state: EnvelopeState,
    /// Current output level, always in [0, 1]
    level: f32,
    /// Elapsed time in the current ramp, in seconds
    elapsed: f32,
    /// Seconds per sample
    dt: f32,
    attack: f32,
    release: f32,
    retrigger: RetriggerPolicy,
}

impl Default for ToneEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl ToneEnvelope {
    /// Create an idle envelope with the default ramp lengths.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            elapsed: 0.0,
            dt: 1.0 / sample_rate,
            attack: ATTACK_SECONDS,
            release: RELEASE_SECONDS,
            retrigger: RetriggerPolicy::Restart,
        }
    }

    /// Set the retrigger policy.
    pub fn set_retrigger(&mut self, policy: RetriggerPolicy) {
        self.retrigger = policy;
    }

    /// Current retrigger policy.
    pub fn retrigger(&self) -> RetriggerPolicy {
        self.retrigger
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.dt = 1.0 / sample_rate;
    }

    /// Attack time in seconds.
    pub fn attack_seconds(&self) -> f32 {
        self.attack
    }

    /// Release time in seconds.
    pub fn release_seconds(&self) -> f32 {
        self.release
    }

    /// Trigger the envelope (note on).
    ///
    /// Always enters Attack, whatever the current state.
    pub fn gate_on(&mut self) {
        self.elapsed = match self.retrigger {
            RetriggerPolicy::Restart => 0.0,
            RetriggerPolicy::Continue => self.level * self.attack,
        };
        self.state = EnvelopeState::Attack;
    }

    /// Release the envelope (note off). No-op while idle.
    pub fn gate_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
            self.elapsed = 0.0;
        }
    }

    /// Force envelope to idle state.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.elapsed = 0.0;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if envelope is active (not idle).
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance envelope by one sample and return the new level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.elapsed += self.dt;
                if self.elapsed >= self.attack {
                    self.level = 1.0;
                    self.elapsed = 0.0;
                    self.state = EnvelopeState::Sustain;
                } else {
                    self.level = self.elapsed / self.attack;
                }
            }

            EnvelopeState::Sustain => {
                self.level = 1.0;
            }

            EnvelopeState::Release => {
                self.elapsed += self.dt;
                if self.elapsed >= self.release {
                    self.level = 0.0;
                    self.elapsed = 0.0;
                    self.state = EnvelopeState::Idle;
                } else {
                    // Ramp is anchored at 1 even when released mid-attack.
                    self.level = 1.0 - self.elapsed / self.release;
                }
            }
        }

        self.level
    }
}
