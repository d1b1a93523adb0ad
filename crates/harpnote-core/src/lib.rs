//! Harpnote Core - DSP primitives for the harpnote practice synth
//!
//! This crate provides the small, allocation-free building blocks the tone
//! engine is assembled from.
//!
//! # Filters
//!
//! - [`OnePole`] - RC-style one-pole lowpass used as the tone filter
//!
//! # Utilities
//!
//! - Pitch conversions: [`midi_to_freq`], [`cents_to_ratio`]
//! - [`flush_denormal`] for feedback paths that decay toward zero
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! harpnote-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use harpnote_core::{OnePole, cents_to_ratio, midi_to_freq};
//!
//! let center = midi_to_freq(60);
//! let upper = center * cents_to_ratio(5.0);
//! assert!(upper > center);
//!
//! let mut lp = OnePole::new(48000.0, 5000.0);
//! let smoothed = lp.process(1.0);
//! assert!(smoothed > 0.0 && smoothed < 1.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod math;
pub mod one_pole;

pub use math::{cents_to_ratio, flush_denormal, midi_to_freq};
pub use one_pole::OnePole;
