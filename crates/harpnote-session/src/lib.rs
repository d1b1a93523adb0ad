//! Harpnote Session - recording and replaying practice takes
//!
//! Everything on the control side of the tone engine:
//!
//! - [`VirtualClock`] - wall time minus paused intervals
//! - [`NoteLabel`] / [`Tuning`] - hole-and-breath notes and their pitches
//! - [`Recorder`] / [`NoteLog`] - timestamped, editable note log
//! - [`PlaybackScheduler`] - cancellable replay with recorded timing
//! - [`PracticeSession`] - the entry points a front end drives
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use harpnote_session::{ManualTime, NoteLabel, PracticeSession, VirtualClock};
//! use harpnote_synth::{EngineConfig, ToneEngine};
//!
//! let (control, _renderer) = ToneEngine::build(EngineConfig::default());
//! let time = ManualTime::new();
//! let session = PracticeSession::with_clock(
//!     Arc::new(control),
//!     VirtualClock::new(Arc::new(time.clone())),
//! );
//!
//! session.note_start("-1".parse::<NoteLabel>()?);
//! time.advance(Duration::from_millis(200));
//! session.note_end();
//!
//! let entries = session.entries();
//! assert_eq!(entries[0].duration(), Some(Duration::from_millis(200)));
//! # Ok::<(), harpnote_session::LabelError>(())
//! ```

pub mod clock;
pub mod error;
pub mod label;
pub mod log;
pub mod playback;
pub mod recorder;
pub mod session;
pub mod tuning;

pub use clock::{ManualTime, MonotonicTime, TimeSource, VirtualClock};
pub use error::LabelError;
pub use label::{Breath, HOLE_COUNT, LabelStyle, NoteLabel};
pub use log::{LogEntry, NoteLog};
pub use playback::{
    CompletionHook, NoteSink, OPEN_ENTRY_FALLBACK, PlaybackOutcome, PlaybackScheduler,
    PlaybackStatus, PlaybackStep, plan,
};
pub use recorder::Recorder;
pub use session::PracticeSession;
pub use tuning::{DEFAULT_KEY, KEY_MAX, KEY_MIN, Tuning, midi_name, parse_midi_name};
