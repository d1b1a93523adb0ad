//! Monophonic tone engine split across the control and render domains.
//!
//! [`ToneEngine::build`] hands out two halves:
//!
//! - [`ToneControl`]: cloneable, `Send + Sync` handle used by gestures and
//!   the playback worker to issue note commands and read back status.
//! - [`ToneRenderer`]: sole owner of the oscillators, envelope and filter,
//!   moved into the audio callback.
//!
//! Commands cross over through a bounded SPSC ring buffer. The render side
//! only ever calls `try_pop`, so it never blocks or takes a lock; the
//! producer half is serialized behind a mutex on the control side, which
//! keeps commands in issue order. Status flows back through atomics.
//!
//! # Example
//!
//! ```rust
//! use harpnote_synth::{EngineConfig, EnvelopeState, ToneEngine};
//!
//! let (control, mut renderer) = ToneEngine::build(EngineConfig::default());
//! assert!(control.note_on(440.0));
//!
//! let mut buffer = vec![0.0f32; 2 * 256];
//! renderer.process(&mut buffer, 2);
//! assert_eq!(control.envelope_state(), EnvelopeState::Attack);
//! assert_eq!(buffer[0], buffer[1]);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use harpnote_core::OnePole;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::envelope::{EnvelopeState, RetriggerPolicy, ToneEnvelope};
use crate::oscillator::OscillatorBank;

/// Cutoff of the tone filter in Hz.
pub const FILTER_CUTOFF_HZ: f32 = 5000.0;

/// Fixed output gain applied after the envelope.
pub const OUTPUT_GAIN: f32 = 0.2;

/// Default capacity of the command queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A request from the control domain to the render domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneCommand {
    /// Retune the voice and (re)enter Attack.
    NoteOn {
        /// Center frequency in Hz, always positive and finite.
        frequency: f32,
    },
    /// Enter Release if the voice is sounding.
    NoteOff,
}

/// Construction-time engine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Behavior of a note-on that arrives while the voice is sounding.
    pub retrigger: RetriggerPolicy,
    /// Number of commands the queue holds before new ones are dropped.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            retrigger: RetriggerPolicy::Restart,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Default settings at the given sample rate.
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }
}

/// Values published by the render step.
#[derive(Debug)]
struct EngineStatus {
    envelope: AtomicU8,
    /// Envelope level as f32 bits
    level: AtomicU32,
    /// Center frequency as f32 bits
    frequency: AtomicU32,
    dropped: AtomicU64,
    overflowing: AtomicBool,
}

impl EngineStatus {
    fn new() -> Self {
        Self {
            envelope: AtomicU8::new(EnvelopeState::Idle as u8),
            level: AtomicU32::new(0.0f32.to_bits()),
            frequency: AtomicU32::new(0.0f32.to_bits()),
            dropped: AtomicU64::new(0),
            overflowing: AtomicBool::new(false),
        }
    }
}

/// Entry point for building an engine.
pub struct ToneEngine;

impl ToneEngine {
    /// Build a connected control/render pair.
    pub fn build(config: EngineConfig) -> (ToneControl, ToneRenderer) {
        let ring = HeapRb::<ToneCommand>::new(config.queue_capacity.max(1));
        let (producer, consumer) = ring.split();
        let status = Arc::new(EngineStatus::new());

        let control = ToneControl {
            producer: Arc::new(Mutex::new(producer)),
            status: Arc::clone(&status),
            sample_rate: config.sample_rate,
        };

        let mut envelope = ToneEnvelope::new(config.sample_rate);
        envelope.set_retrigger(config.retrigger);

        let renderer = ToneRenderer {
            commands: consumer,
            bank: OscillatorBank::new(config.sample_rate),
            envelope,
            filter: OnePole::new(config.sample_rate, FILTER_CUTOFF_HZ),
            status,
            published: EnvelopeState::Idle,
            sample_rate: config.sample_rate,
        };

        (control, renderer)
    }
}

/// Control-domain handle to a [`ToneRenderer`].
///
/// Cheap to clone; all clones feed the same queue.
#[derive(Clone)]
pub struct ToneControl {
    producer: Arc<Mutex<HeapProd<ToneCommand>>>,
    status: Arc<EngineStatus>,
    sample_rate: f32,
}

impl std::fmt::Debug for ToneControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneControl")
            .field("sample_rate", &self.sample_rate)
            .field("envelope", &self.envelope_state())
            .field("dropped", &self.dropped_commands())
            .finish()
    }
}

impl ToneControl {
    /// Request a note at `frequency` Hz.
    ///
    /// Returns `false` without queuing anything when the frequency is not
    /// positive and finite, or when the queue is full.
    pub fn note_on(&self, frequency: f32) -> bool {
        if !(frequency.is_finite() && frequency > 0.0) {
            tracing::debug!(frequency, "ignoring note-on with invalid frequency");
            return false;
        }
        self.send(ToneCommand::NoteOn { frequency })
    }

    /// Request the current note to release.
    pub fn note_off(&self) -> bool {
        self.send(ToneCommand::NoteOff)
    }

    fn send(&self, command: ToneCommand) -> bool {
        let mut producer = self.producer.lock().unwrap_or_else(PoisonError::into_inner);
        match producer.try_push(command) {
            Ok(()) => {
                if self.status.overflowing.swap(false, Ordering::Relaxed) {
                    tracing::info!("tone command queue draining again");
                }
                true
            }
            Err(dropped) => {
                self.status.dropped.fetch_add(1, Ordering::Relaxed);
                // Warn on the first drop of a streak only; with no audio
                // stream running every command would otherwise log.
                if !self.status.overflowing.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        command = ?dropped,
                        capacity = producer.capacity().get(),
                        "tone command queue full, dropping command"
                    );
                }
                false
            }
        }
    }

    /// Envelope state as of the last rendered sample.
    pub fn envelope_state(&self) -> EnvelopeState {
        EnvelopeState::from_u8(self.status.envelope.load(Ordering::Relaxed))
    }

    /// Whether the rendered voice is currently audible (envelope not idle).
    pub fn is_sounding(&self) -> bool {
        self.envelope_state().is_active()
    }

    /// Envelope level at the end of the last rendered block.
    pub fn level(&self) -> f32 {
        f32::from_bits(self.status.level.load(Ordering::Relaxed))
    }

    /// Center frequency most recently applied by the renderer.
    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.status.frequency.load(Ordering::Relaxed))
    }

    /// Total commands dropped because the queue was full.
    pub fn dropped_commands(&self) -> u64 {
        self.status.dropped.load(Ordering::Relaxed)
    }

    /// Sample rate the engine was built for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Render-domain half of the engine.
///
/// Owns every piece of DSP state. Nothing in here allocates, blocks or
/// locks.
pub struct ToneRenderer {
    commands: HeapCons<ToneCommand>,
    bank: OscillatorBank,
    envelope: ToneEnvelope,
    filter: OnePole,
    status: Arc<EngineStatus>,
    published: EnvelopeState,
    sample_rate: f32,
}

impl std::fmt::Debug for ToneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneRenderer")
            .field("sample_rate", &self.sample_rate)
            .field("frequency", &self.bank.frequency())
            .field("envelope", &self.envelope.state())
            .finish_non_exhaustive()
    }
}

impl ToneRenderer {
    /// Render one mono sample.
    ///
    /// Pending commands are applied first, in the order they were issued.
    #[inline]
    pub fn render_step(&mut self) -> f32 {
        while let Some(command) = self.commands.try_pop() {
            self.apply(command);
        }

        let amplitude = self.envelope.advance();
        let raw = self.bank.advance();
        let filtered = self.filter.process(raw);

        let state = self.envelope.state();
        if state != self.published {
            self.published = state;
            self.status.envelope.store(state as u8, Ordering::Relaxed);
        }

        filtered * amplitude * OUTPUT_GAIN
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    /// of each frame.
    pub fn process(&mut self, buffer: &mut [f32], channels: usize) {
        for frame in buffer.chunks_mut(channels.max(1)) {
            let sample = self.render_step();
            frame.fill(sample);
        }
        self.status
            .level
            .store(self.envelope.level().to_bits(), Ordering::Relaxed);
    }

    /// Change the sample rate, e.g. after the device negotiated a different
    /// one than requested.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.bank.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Envelope state owned by this renderer.
    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    /// Commands waiting to be applied.
    pub fn pending_commands(&self) -> usize {
        self.commands.occupied_len()
    }

    fn apply(&mut self, command: ToneCommand) {
        match command {
            ToneCommand::NoteOn { frequency } => {
                self.bank.set_frequency(frequency);
                self.status
                    .frequency
                    .store(frequency.to_bits(), Ordering::Relaxed);
                self.envelope.gate_on();
            }
            ToneCommand::NoteOff => self.envelope.gate_off(),
        }
    }
}
