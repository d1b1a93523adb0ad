//! One-pole lowpass filter used as the tone filter.
//!
//! A single-pole IIR lowpass in the discretized RC form:
//!
//! ```text
//! y[n] = y[n-1] + α * (x[n] - y[n-1])
//! α    = dt / (RC + dt),   RC = 1 / (2π * cutoff),   dt = 1 / sample_rate
//! ```
//!
//! 6 dB/octave rolloff, zero latency, one multiply per sample. The tone
//! engine uses it to take the edge off the naive sawtooth sum.
//!
//! # Usage
//!
//! ```rust
//! use harpnote_core::OnePole;
//!
//! let mut lp = OnePole::new(48000.0, 5000.0);
//! let filtered = lp.process(1.0);
//! assert!(filtered < 1.0); // first step only moves part of the way
//! ```

use crate::flush_denormal;
use core::f32::consts::TAU;

/// One-pole (6 dB/oct) lowpass filter.
///
/// # Invariants
///
/// - `alpha` is always in (0, 1] for positive cutoff and sample rate
/// - `state` holds the single prior output sample
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    alpha: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Create a new one-pole lowpass filter.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `freq_hz` - Cutoff frequency in Hz
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            alpha: 1.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate_alpha();
        filter
    }

    /// Set the cutoff frequency and recalculate the smoothing factor.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        self.recalculate_alpha();
    }

    /// Cutoff frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Smoothing factor α applied per sample.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Process one sample through the lowpass filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(self.state + self.alpha * (input - self.state));
        self.state
    }

    /// Last output sample.
    pub fn state(&self) -> f32 {
        self.state
    }

    /// Reset filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    /// Update sample rate and recalculate the smoothing factor.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_alpha();
    }

    fn recalculate_alpha(&mut self) {
        if self.freq <= 0.0 || self.sample_rate <= 0.0 {
            // Degenerate settings pass the signal through untouched.
            self.alpha = 1.0;
            return;
        }
        let dt = 1.0 / self.sample_rate;
        let rc = 1.0 / (TAU * self.freq);
        self.alpha = dt / (rc + dt);
    }
}
