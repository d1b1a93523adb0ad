//! Real-time tone output: a [`ToneRenderer`] running inside an output
//! stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use harpnote_synth::ToneRenderer;

use crate::Result;
use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};

/// A running output stream that renders the tone engine.
///
/// Audio stops when this is dropped.
#[derive(Debug)]
pub struct ToneOutput {
    _stream: StreamHandle,
    sample_rate: u32,
    channels: u16,
    failed: Arc<AtomicBool>,
}

impl ToneOutput {
    /// Move `renderer` into a new output stream on `backend`.
    ///
    /// If the backend will run at a different rate than requested the
    /// renderer is retuned to match. Stream errors after start are logged
    /// once.
    pub fn start(
        backend: &dyn AudioBackend,
        config: &BackendStreamConfig,
        mut renderer: ToneRenderer,
    ) -> Result<Self> {
        let sample_rate = backend.actual_sample_rate(config);
        if sample_rate != config.sample_rate {
            tracing::warn!(
                requested = config.sample_rate,
                actual = sample_rate,
                "sample rate differs from request"
            );
        }
        renderer.set_sample_rate(sample_rate as f32);

        let channels = usize::from(config.channels.max(1));
        let failed = Arc::new(AtomicBool::new(false));
        let reported = Arc::clone(&failed);

        let stream = backend.build_output_stream(
            config,
            Box::new(move |buffer: &mut [f32]| renderer.process(buffer, channels)),
            Box::new(move |message: &str| {
                if !reported.swap(true, Ordering::Relaxed) {
                    tracing::error!(error = message, "audio stream error");
                }
            }),
        )?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels: config.channels,
            failed,
        })
    }

    /// Like [`start`](Self::start), but a failure is logged and yields
    /// `None` so the caller can carry on without sound.
    pub fn start_or_silent(
        backend: &dyn AudioBackend,
        config: &BackendStreamConfig,
        renderer: ToneRenderer,
    ) -> Option<Self> {
        match Self::start(backend, config, renderer) {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::error!(
                    backend = backend.name(),
                    error = %e,
                    "audio output unavailable, continuing without sound"
                );
                None
            }
        }
    }

    /// Sample rate the stream runs at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Whether the stream has reported an error.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}
