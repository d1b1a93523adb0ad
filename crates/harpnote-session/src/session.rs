//! Practice session: the entry points a front end drives.
//!
//! Gestures go to the recorder and the tone engine together, mode changes
//! pause and resume the virtual clock, and `play` hands a planned run to the
//! [`PlaybackScheduler`].
//!
//! Lock order is scheduler, then state. The playback completion hook takes
//! the state lock from the worker thread, so the state lock is never held
//! while a run is cancelled or joined.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clock::VirtualClock;
use crate::label::NoteLabel;
use crate::log::LogEntry;
use crate::playback::{self, NoteSink, PlaybackOutcome, PlaybackScheduler, PlaybackStatus};
use crate::recorder::Recorder;
use crate::tuning::Tuning;

#[derive(Debug)]
struct SessionState {
    recorder: Recorder,
    tuning: Tuning,
    editing: bool,
    playing: bool,
    /// Note currently held by the player
    live_note: Option<NoteLabel>,
}

impl SessionState {
    fn sync_clock(&mut self) {
        let paused = self.editing || self.playing;
        self.recorder.clock_mut().set_paused(paused);
    }

    /// Close the held note's entry, if any. Returns whether one was held.
    fn release_live_note(&mut self) -> bool {
        if self.live_note.take().is_some() {
            let now = self.recorder.now();
            self.recorder.record_note_end(now);
            true
        } else {
            false
        }
    }
}

/// A running practice session.
///
/// All methods take `&self`; the session can be shared between a gesture
/// thread and a display thread.
///
/// # Example
///
/// ```rust
/// use harpnote_session::{NoteLabel, PracticeSession};
/// use harpnote_synth::{EngineConfig, ToneEngine};
///
/// let (control, _renderer) = ToneEngine::build(EngineConfig::default());
/// let session = PracticeSession::new(control);
///
/// session.note_start(NoteLabel::draw(4).unwrap());
/// session.note_end();
/// assert_eq!(session.entries().len(), 1);
/// assert!(session.is_recording());
/// ```
pub struct PracticeSession {
    state: Arc<Mutex<SessionState>>,
    scheduler: Mutex<PlaybackScheduler>,
    playback: Arc<PlaybackStatus>,
    sink: Arc<dyn NoteSink>,
}

impl std::fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeSession")
            .field("state", &self.state)
            .field("playback", &self.playback)
            .finish_non_exhaustive()
    }
}

impl PracticeSession {
    /// Session on a wall clock, sounding notes through `sink`.
    pub fn new(sink: impl NoteSink + 'static) -> Self {
        Self::with_clock(Arc::new(sink), VirtualClock::default())
    }

    /// Session with an explicit sink and clock.
    pub fn with_clock(sink: Arc<dyn NoteSink>, clock: VirtualClock) -> Self {
        let scheduler = PlaybackScheduler::new(Arc::clone(&sink));
        let playback = scheduler.status();
        Self {
            state: Arc::new(Mutex::new(SessionState {
                recorder: Recorder::new(clock),
                tuning: Tuning::default(),
                editing: false,
                playing: false,
                live_note: None,
            })),
            scheduler: Mutex::new(scheduler),
            playback,
            sink,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    fn scheduler(&self) -> MutexGuard<'_, PlaybackScheduler> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Strike and hold `label`.
    ///
    /// Interrupts a running playback; that note sounds but is not recorded.
    /// In edit mode the note sounds but is not recorded either. Otherwise
    /// recording switches on and the note is appended. Returns the index of
    /// the recorded entry.
    pub fn note_start(&self, label: NoteLabel) -> Option<usize> {
        let interrupted = self.playback.is_playing();
        if interrupted {
            tracing::debug!(%label, "live note interrupts playback");
            self.cancel_playback();
        }

        let (frequency, recorded) = {
            let mut state = self.state();
            state.release_live_note();
            state.live_note = Some(label);

            let recorded = if interrupted || state.editing || state.playing {
                None
            } else {
                state.recorder.set_recording(true);
                let now = state.recorder.now();
                state.recorder.record_note_start(label, now)
            };
            (state.tuning.frequency_of(label), recorded)
        };

        self.sink.note_on(frequency);
        recorded
    }

    /// Release the held note. No-op when nothing is held.
    pub fn note_end(&self) {
        let released = self.state().release_live_note();
        if released {
            self.sink.note_off();
        }
    }

    /// Enter or leave edit mode.
    ///
    /// Entering releases any held note and stops recording; the clock stays
    /// paused until edit mode is left.
    pub fn set_editing(&self, editing: bool) {
        let released = {
            let mut state = self.state();
            if state.editing == editing {
                return;
            }
            let released = editing && state.release_live_note();
            state.editing = editing;
            if editing {
                state.recorder.set_recording(false);
            }
            state.sync_clock();
            tracing::info!(editing, "edit mode changed");
            released
        };
        if released {
            self.sink.note_off();
        }
    }

    /// Replay the log from `from`, cancelling any run in progress.
    ///
    /// A held live note is released first. Returns `false` (and does
    /// nothing) when `from` is out of range.
    pub fn play(&self, from: usize) -> bool {
        let mut scheduler = self.scheduler();
        scheduler.cancel();

        let (steps, released) = {
            let mut state = self.state();
            let len = state.recorder.log().len();
            if from >= len {
                tracing::debug!(from, len, "play index out of range");
                return false;
            }

            // Close the held note first so it plays back with its real length
            let released = state.release_live_note();
            let Some(steps) = playback::plan(state.recorder.log().entries(), from, state.tuning)
            else {
                return false;
            };
            state.playing = true;
            state.recorder.set_recording(false);
            state.sync_clock();
            (steps, released)
        };

        if released {
            self.sink.note_off();
        }

        let state = Arc::clone(&self.state);
        let on_finish: playback::CompletionHook = Box::new(move |outcome: PlaybackOutcome| {
            let mut state = lock(&state);
            state.playing = false;
            state.sync_clock();
            tracing::debug!(?outcome, "session resumed after playback");
        });

        let started = scheduler.start(steps, Some(on_finish));
        if !started {
            let mut state = self.state();
            state.playing = false;
            state.sync_clock();
        }
        started
    }

    /// Stop playback, if running. Returns after the final note-off.
    pub fn cancel_playback(&self) {
        self.scheduler().cancel();
    }

    /// Block until the current playback ends, on its own or by a cancel
    /// from another thread.
    pub fn wait_for_playback(&self) {
        let finished = self.scheduler().finished();
        if let Some(finished) = finished {
            // Never sent on; returns when the worker drops its end
            let _ = finished.recv();
            self.scheduler().reap();
        }
    }

    /// Stop playback, release any held note and empty the log.
    pub fn clear(&self) {
        self.cancel_playback();
        let released = {
            let mut state = self.state();
            let released = state.release_live_note();
            state.recorder.clear_all();
            state.recorder.set_recording(false);
            state.sync_clock();
            released
        };
        if released {
            self.sink.note_off();
        }
    }

    /// Delete entry `index`. Ignored during playback or when out of range.
    pub fn delete(&self, index: usize) -> bool {
        let mut state = self.state();
        if state.playing {
            return false;
        }
        state.recorder.delete_entry(index).is_some()
    }

    /// Relabel closed entry `index`. Ignored during playback, when out of
    /// range, or when the entry is still open.
    pub fn edit(&self, index: usize, label: NoteLabel) -> bool {
        let mut state = self.state();
        if state.playing {
            return false;
        }
        state.recorder.edit_entry(index, label)
    }

    /// Snapshot of the log.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state().recorder.log().entries().to_vec()
    }

    /// Whether a playback run is in progress.
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Whether struck notes are being appended.
    pub fn is_recording(&self) -> bool {
        self.state().recorder.is_recording()
    }

    /// Whether edit mode is on.
    pub fn is_editing(&self) -> bool {
        self.state().editing
    }

    /// Log index of the note playback is sounding, for highlighting.
    pub fn sounding_index(&self) -> Option<usize> {
        self.playback.sounding_index()
    }

    /// Note the player is holding.
    pub fn live_note(&self) -> Option<NoteLabel> {
        self.state().live_note
    }

    /// Change the key. Affects notes struck and runs started afterwards.
    pub fn set_tuning(&self, tuning: Tuning) {
        self.state().tuning = tuning;
        tracing::info!(key = %tuning, "tuning changed");
    }

    /// Current key.
    pub fn tuning(&self) -> Tuning {
        self.state().tuning
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state().recorder.now()
    }

    /// Total paused time since the last clear.
    pub fn paused_total(&self) -> Duration {
        self.state().recorder.clock().accumulated_pause()
    }
}

impl Drop for PracticeSession {
    fn drop(&mut self) {
        self.cancel_playback();
        if self.state().live_note.take().is_some() {
            self.sink.note_off();
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
