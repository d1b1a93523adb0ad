//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`midi_to_freq`] - Equal temperament, A4 = 440 Hz
//! - [`cents_to_ratio`] - Detune offsets
//! - [`flush_denormal`] - Keeps decaying filter state out of the subnormal range

use libm::powf;

/// Convert a MIDI note number to frequency in Hz.
///
/// # Example
/// ```rust
/// use harpnote_core::midi_to_freq;
///
/// assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
/// ```
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (note as f32 - 69.0) / 12.0)
}

/// Convert cents to frequency ratio.
///
/// 100 cents = 1 semitone.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    powf(2.0, cents / 1200.0)
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe CPU slowdowns on most architectures. Values
/// below 1e-20 are replaced with zero, leaving margin before the IEEE 754
/// subnormal range begins.
///
/// Use this in recursive filters where the signal can decay indefinitely
/// toward zero after the voice goes idle.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
