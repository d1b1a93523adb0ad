//! Phase-accumulator sawtooth oscillators.
//!
//! The reed tone is a sum of three naive sawtooth oscillators: one at the
//! commanded pitch and two detuned a few cents above and below it. The slow
//! beating between them gives the chorus-like texture of paired reeds.

use harpnote_core::cents_to_ratio;
use libm::floorf;

/// Unison detune of the outer oscillators, in cents.
pub const DETUNE_CENTS: f32 = 5.0;

/// Number of oscillators in an [`OscillatorBank`].
pub const BANK_SIZE: usize = 3;

/// Naive sawtooth at a normalized phase: `2 * (phase - round(phase))`.
///
/// Rises from 0 to 1 over the first half cycle, jumps to -1 and rises back
/// to 0 over the second half.
#[inline]
pub fn naive_saw(phase: f32) -> f32 {
    2.0 * (phase - floorf(phase + 0.5))
}

/// Single sawtooth phase accumulator.
///
/// # Example
///
/// ```rust
/// use harpnote_synth::SawOscillator;
///
/// let mut osc = SawOscillator::new(48000.0);
/// osc.set_frequency(440.0);
/// let sample = osc.advance();
/// assert_eq!(sample, 0.0); // phase starts at zero
/// ```
#[derive(Debug, Clone)]
pub struct SawOscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
}

impl Default for SawOscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl SawOscillator {
    /// Create a new oscillator with the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            frequency: 0.0,
        }
    }

    /// Set frequency in Hz. Negative values are treated as zero.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set sample rate and recalculate the phase increment.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current phase in [0.0, 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Read the sample at the current phase, then advance by one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let output = naive_saw(self.phase);
        self.advance_phase();
        output
    }

    #[inline]
    fn advance_phase(&mut self) {
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= floorf(self.phase);
            // x - floor(x) can round up to exactly 1.0
            if self.phase >= 1.0 {
                self.phase = 0.0;
            }
        }
    }
}

/// Three unison sawtooth oscillators: center, `f * r` and `f / r`, with
/// `r = 2^(DETUNE_CENTS / 1200)`.
#[derive(Debug, Clone)]
pub struct OscillatorBank {
    oscillators: [SawOscillator; BANK_SIZE],
    detune_ratio: f32,
    frequency: f32,
}

impl Default for OscillatorBank {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl OscillatorBank {
    /// Create a silent bank (0 Hz) at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillators: [
                SawOscillator::new(sample_rate),
                SawOscillator::new(sample_rate),
                SawOscillator::new(sample_rate),
            ],
            detune_ratio: cents_to_ratio(DETUNE_CENTS),
            frequency: 0.0,
        }
    }

    /// Retune all three oscillators around a new center frequency.
    ///
    /// Phases are left untouched so retuning never clicks.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz;
        let [center, upper, lower] = &mut self.oscillators;
        center.set_frequency(freq_hz);
        upper.set_frequency(freq_hz * self.detune_ratio);
        lower.set_frequency(freq_hz / self.detune_ratio);
    }

    /// Center frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Ratio between the center and the upper oscillator.
    pub fn detune_ratio(&self) -> f32 {
        self.detune_ratio
    }

    /// The individual oscillators (center, upper, lower).
    pub fn oscillators(&self) -> &[SawOscillator; BANK_SIZE] {
        &self.oscillators
    }

    /// Phases of the three oscillators.
    pub fn phases(&self) -> [f32; BANK_SIZE] {
        [
            self.oscillators[0].phase(),
            self.oscillators[1].phase(),
            self.oscillators[2].phase(),
        ]
    }

    /// Update sample rate on all oscillators.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for osc in &mut self.oscillators {
            osc.set_sample_rate(sample_rate);
        }
    }

    /// Reset all phases to 0.
    pub fn reset(&mut self) {
        for osc in &mut self.oscillators {
            osc.reset();
        }
    }

    /// Average of the three sawtooth samples, then advance every phase.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let sum: f32 = self.oscillators.iter_mut().map(SawOscillator::advance).sum();
        sum / BANK_SIZE as f32
    }
}
