//! Output backend abstraction.
//!
//! [`AudioBackend`] decouples the tone output from any particular platform
//! API. [`CpalBackend`](crate::CpalBackend) is the desktop implementation;
//! tests supply their own backend that pulls buffers on demand.
//!
//! Callbacks are boxed closures so the trait stays object-safe, and streams
//! come back as a type-erased [`StreamHandle`] that stops playback when
//! dropped.

use crate::{AudioDevice, Result};

/// Configuration for building an output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of output channels.
    pub channels: u16,
    /// Device name filter (system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased stream handle. The stream runs while this exists.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Output callback, run on the audio thread.
///
/// Receives an interleaved buffer (`[L0, R0, L1, R1, ...]` for stereo) to
/// fill. Must not allocate, lock or block.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Stream error callback. Receives a human-readable message.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Platform audio output.
pub trait AudioBackend: Send {
    /// Human-readable backend name, e.g. `"cpal"`.
    fn name(&self) -> &str;

    /// List output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// Dropping the returned [`StreamHandle`] stops playback.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Sample rate the stream will actually run at for `config`.
    ///
    /// Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}
