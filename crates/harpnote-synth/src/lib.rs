//! Harpnote Synth - Tone engine for the harpnote practice tool
//!
//! A single reed voice built from three unison sawtooth oscillators, a
//! linear attack/release envelope and a one-pole tone filter, split into a
//! control half and a real-time render half.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`SawOscillator`] - Naive sawtooth phase accumulator
//! - [`OscillatorBank`] - Center plus two detuned oscillators, averaged
//!
//! ## Envelope
//!
//! - [`ToneEnvelope`] - Idle/Attack/Sustain/Release with fixed linear ramps
//! - [`RetriggerPolicy`] - What a note-on does while the voice is sounding
//!
//! ## Engine (requires `std`)
//!
//! - [`ToneEngine`] - Builds a [`ToneControl`] / [`ToneRenderer`] pair
//!
//! ```rust
//! use harpnote_synth::{EngineConfig, ToneEngine};
//!
//! let (control, mut renderer) = ToneEngine::build(EngineConfig::with_sample_rate(44100.0));
//!
//! // Control side: any thread
//! control.note_on(293.66);
//!
//! // Render side: the audio callback
//! let mut buffer = vec![0.0f32; 512];
//! renderer.process(&mut buffer, 1);
//!
//! control.note_off();
//! ```
//!
//! # no_std Support
//!
//! The oscillators and envelope are `no_std` compatible. The engine needs
//! `std` for its queue and shared status:
//!
//! ```toml
//! [dependencies]
//! harpnote-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
pub mod engine;
pub mod envelope;
pub mod oscillator;

#[cfg(feature = "std")]
pub use engine::{
    DEFAULT_QUEUE_CAPACITY, EngineConfig, FILTER_CUTOFF_HZ, OUTPUT_GAIN, ToneCommand,
    ToneControl, ToneEngine, ToneRenderer,
};
pub use envelope::{ATTACK_SECONDS, EnvelopeState, RELEASE_SECONDS, RetriggerPolicy, ToneEnvelope};
pub use oscillator::{BANK_SIZE, DETUNE_CENTS, OscillatorBank, SawOscillator, naive_saw};

// Re-export the pieces of harpnote-core the engine is built from
pub use harpnote_core::{OnePole, cents_to_ratio, midi_to_freq};
