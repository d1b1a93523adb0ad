//! Audio I/O layer for harpnote.
//!
//! This crate provides:
//!
//! - **Device listing**: [`list_output_devices`] and [`default_output_device`]
//! - **Real-time output**: [`ToneOutput`] runs a [`ToneRenderer`](harpnote_synth::ToneRenderer)
//!   inside an output stream built by any [`AudioBackend`]
//! - **Offline rendering**: [`render_steps`] turns a planned take into samples
//! - **WAV export**: [`write_wav`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use harpnote_io::{BackendStreamConfig, CpalBackend, ToneOutput};
//! use harpnote_synth::{EngineConfig, ToneEngine};
//!
//! let (control, renderer) = ToneEngine::build(EngineConfig::default());
//! let backend = CpalBackend::new();
//! let _output = ToneOutput::start(&backend, &BackendStreamConfig::default(), renderer)?;
//!
//! control.note_on(440.0);
//! ```

pub mod backend;
pub mod cpal_backend;
mod devices;
mod output;
mod render;
mod wav;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_output_device, list_output_devices};
pub use output::ToneOutput;
pub use render::{RENDER_TAIL, render_steps};
pub use wav::{SampleDepth, WavSpec, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Sample buffer does not divide into whole frames.
    #[error("{samples} samples do not fill whole frames of {channels} channel(s)")]
    PartialFrame {
        /// Samples supplied.
        samples: usize,
        /// Channels per frame.
        channels: u16,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
