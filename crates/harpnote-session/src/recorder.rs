//! Event recorder: timestamps note gestures against the virtual clock.

use std::time::Duration;

use crate::clock::VirtualClock;
use crate::label::NoteLabel;
use crate::log::{LogEntry, NoteLog};

/// Appends, edits and deletes [`LogEntry`] items.
///
/// Timestamps are passed in explicitly so callers decide which clock
/// reading a gesture belongs to; [`now`](Self::now) gives the reading of
/// the recorder's own clock.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use harpnote_session::{NoteLabel, Recorder};
///
/// let mut recorder = Recorder::default();
/// recorder.set_recording(true);
/// recorder.record_note_start(NoteLabel::draw(4).unwrap(), Duration::ZERO);
/// recorder.record_note_end(Duration::from_millis(370));
///
/// let entry = recorder.log().get(0).unwrap();
/// assert_eq!(entry.duration(), Some(Duration::from_millis(370)));
/// ```
#[derive(Debug, Default)]
pub struct Recorder {
    log: NoteLog,
    clock: VirtualClock,
    recording: bool,
}

impl Recorder {
    /// Recorder over the given clock, not yet recording.
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            log: NoteLog::new(),
            clock,
            recording: false,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// The virtual clock.
    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    /// Mutable access to the virtual clock, for pausing.
    pub fn clock_mut(&mut self) -> &mut VirtualClock {
        &mut self.clock
    }

    /// The recorded notes.
    pub fn log(&self) -> &NoteLog {
        &self.log
    }

    /// Whether new notes are appended.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Enable or disable appending.
    pub fn set_recording(&mut self, recording: bool) {
        if self.recording != recording {
            tracing::debug!(recording, "recording toggled");
        }
        self.recording = recording;
    }

    /// Append an open entry for `label` at `at`.
    ///
    /// Any entry still open is closed at `at` first. A timestamp earlier
    /// than the last recorded start is raised to it. Returns the new
    /// entry's index, or `None` when not recording.
    pub fn record_note_start(&mut self, label: NoteLabel, at: Duration) -> Option<usize> {
        if !self.recording {
            return None;
        }

        let at = self.log.last_start().map_or(at, |last| at.max(last));
        self.log.close_open(at);
        self.log.push_open(label, at);

        let index = self.log.len() - 1;
        tracing::debug!(index, %label, start = ?at, "note recorded");
        Some(index)
    }

    /// Close the open entry with `duration = at - start`, saturating at
    /// zero. Returns the duration, or `None` if nothing was open.
    pub fn record_note_end(&mut self, at: Duration) -> Option<Duration> {
        let duration = self.log.close_open(at)?;
        tracing::debug!(?duration, "note closed");
        Some(duration)
    }

    /// Replace the label of a closed entry. Start and duration are kept.
    pub fn edit_entry(&mut self, index: usize, label: NoteLabel) -> bool {
        let changed = self.log.set_label(index, label);
        if changed {
            tracing::debug!(index, %label, "entry relabeled");
        }
        changed
    }

    /// Remove one entry. Out-of-range indices are ignored.
    pub fn delete_entry(&mut self, index: usize) -> Option<LogEntry> {
        let removed = self.log.remove(index);
        if removed.is_some() {
            tracing::debug!(index, "entry deleted");
        }
        removed
    }

    /// Empty the log and reset the clock's pause history.
    pub fn clear_all(&mut self) {
        self.log.clear();
        self.clock.reset();
        tracing::info!("log cleared");
    }
}
