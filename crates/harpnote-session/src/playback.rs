//! Playback scheduler: replays part of a log with its recorded timing.
//!
//! A run is planned up front into [`PlaybackStep`]s with onset and release
//! deadlines relative to the run's start, then executed on a worker thread.
//! Every wait is a `recv_deadline` on a cancellation channel, so a cancel
//! wakes the worker immediately and overhead never accumulates across
//! steps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use harpnote_synth::ToneControl;

use crate::log::LogEntry;
use crate::tuning::Tuning;

/// Hold time used for an entry that was still open when playback started.
pub const OPEN_ENTRY_FALLBACK: Duration = Duration::from_millis(200);

/// Anything that can sound a note.
pub trait NoteSink: Send + Sync {
    /// Start sounding `frequency` Hz.
    fn note_on(&self, frequency: f32);
    /// Release the current note.
    fn note_off(&self);
}

impl NoteSink for ToneControl {
    fn note_on(&self, frequency: f32) {
        ToneControl::note_on(self, frequency);
    }

    fn note_off(&self) {
        ToneControl::note_off(self);
    }
}

/// One scheduled note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStep {
    /// Index of the entry in the log.
    pub index: usize,
    /// Frequency to sound, in Hz.
    pub frequency: f32,
    /// Note-on deadline, relative to the run's start.
    pub onset: Duration,
    /// Note-off deadline, relative to the run's start.
    pub release: Duration,
}

/// Plan a run over `entries[from..]`.
///
/// Returns `None` when `from` is out of range, or when the run would last
/// longer than a `Duration` can hold. Gaps are measured from the end of the
/// previous note to the start of the next, so overlapping entries play back
/// to back.
pub fn plan(entries: &[LogEntry], from: usize, tuning: Tuning) -> Option<Vec<PlaybackStep>> {
    let first = entries.get(from)?;
    let mut prev = first.start();
    let mut cursor = Duration::ZERO;
    let mut steps = Vec::with_capacity(entries.len() - from);

    for (offset, entry) in entries[from..].iter().enumerate() {
        let index = from + offset;
        let hold = entry.duration().unwrap_or_else(|| {
            tracing::warn!(index, "entry still open, playing it for the fallback length");
            OPEN_ENTRY_FALLBACK
        });

        let Some((onset, release, end)) = step_times(cursor, prev, entry.start(), hold) else {
            tracing::warn!(index, "playback length overflows, refusing to plan");
            return None;
        };

        steps.push(PlaybackStep {
            index,
            frequency: tuning.frequency_of(entry.label()),
            onset,
            release,
        });
        cursor = release;
        prev = end;
    }

    Some(steps)
}

/// Onset and release on the run's timeline, and the entry's end on the
/// log's. `None` on overflow.
fn step_times(
    cursor: Duration,
    prev: Duration,
    start: Duration,
    hold: Duration,
) -> Option<(Duration, Duration, Duration)> {
    let onset = cursor.checked_add(start.saturating_sub(prev))?;
    let release = onset.checked_add(hold)?;
    let end = start.checked_add(hold)?;
    Some((onset, release, end))
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every step played.
    Completed,
    /// Stopped by a cancel.
    Cancelled,
}

/// Callback run on the worker thread once a run has ended.
pub type CompletionHook = Box<dyn FnOnce(PlaybackOutcome) + Send + 'static>;

const NOT_SOUNDING: usize = usize::MAX;

/// Lock-free view of the scheduler's progress.
#[derive(Debug)]
pub struct PlaybackStatus {
    playing: AtomicBool,
    sounding: AtomicUsize,
}

impl PlaybackStatus {
    fn new() -> Self {
        Self {
            playing: AtomicBool::new(false),
            sounding: AtomicUsize::new(NOT_SOUNDING),
        }
    }

    /// Whether a run is in progress.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Log index of the note currently sounding.
    pub fn sounding_index(&self) -> Option<usize> {
        match self.sounding.load(Ordering::Acquire) {
            NOT_SOUNDING => None,
            index => Some(index),
        }
    }
}

struct ActiveRun {
    cancel: Sender<()>,
    /// Disconnects once the worker has run its completion hook.
    finished: Receiver<()>,
    handle: JoinHandle<()>,
}

/// Runs at most one playback at a time.
pub struct PlaybackScheduler {
    sink: Arc<dyn NoteSink>,
    status: Arc<PlaybackStatus>,
    active: Option<ActiveRun>,
}

impl std::fmt::Debug for PlaybackScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackScheduler")
            .field("status", &self.status)
            .field("active", &self.active.is_some())
            .finish_non_exhaustive()
    }
}

impl PlaybackScheduler {
    /// Scheduler driving `sink`.
    pub fn new(sink: Arc<dyn NoteSink>) -> Self {
        Self {
            sink,
            status: Arc::new(PlaybackStatus::new()),
            active: None,
        }
    }

    /// Shared progress view.
    pub fn status(&self) -> Arc<PlaybackStatus> {
        Arc::clone(&self.status)
    }

    /// Whether a run is in progress.
    pub fn is_playing(&self) -> bool {
        self.status.is_playing()
    }

    /// Log index of the note currently sounding.
    pub fn sounding_index(&self) -> Option<usize> {
        self.status.sounding_index()
    }

    /// Start a run, cancelling and joining any previous one first.
    ///
    /// An empty plan starts nothing. `on_finish` runs on the worker thread
    /// after the final note-off.
    pub fn start(&mut self, steps: Vec<PlaybackStep>, on_finish: Option<CompletionHook>) -> bool {
        self.cancel();
        if steps.is_empty() {
            return false;
        }

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        let (finished_tx, finished_rx) = crossbeam_channel::bounded::<()>(0);
        let sink = Arc::clone(&self.sink);
        let status = Arc::clone(&self.status);
        status.playing.store(true, Ordering::Release);

        let count = steps.len();
        let spawned = thread::Builder::new()
            .name("harpnote-playback".to_string())
            .spawn(move || {
                let outcome = run(&steps, sink.as_ref(), &status, &cancel_rx);
                status.playing.store(false, Ordering::Release);
                tracing::debug!(?outcome, "playback finished");
                if let Some(hook) = on_finish {
                    hook(outcome);
                }
                drop(finished_tx);
            });

        match spawned {
            Ok(handle) => {
                tracing::info!(steps = count, "playback started");
                self.active = Some(ActiveRun {
                    cancel: cancel_tx,
                    finished: finished_rx,
                    handle,
                });
                true
            }
            Err(e) => {
                self.status.playing.store(false, Ordering::Release);
                tracing::error!(error = %e, "failed to spawn playback thread");
                false
            }
        }
    }

    /// Stop the current run, if any, and wait for its worker to finish.
    ///
    /// Returns once the final note-off has been issued and the completion
    /// hook has run.
    pub fn cancel(&mut self) {
        if let Some(run) = self.active.take() {
            // Full or disconnected both mean the worker is already stopping
            let _ = run.cancel.try_send(());
            drop(run.cancel);
            join(run.handle);
        }
    }

    /// Wait for the current run to end on its own.
    pub fn wait(&mut self) {
        if let Some(run) = self.active.take() {
            join(run.handle);
        }
    }

    /// Signal for the current run's end, usable without holding the
    /// scheduler.
    ///
    /// `recv` on the returned channel returns (disconnected) once the run
    /// has finished and its completion hook has run. `None` when idle.
    pub fn finished(&mut self) -> Option<Receiver<()>> {
        self.reap();
        self.active.as_ref().map(|run| run.finished.clone())
    }

    /// Drop a run whose worker has already exited. Returns whether one was
    /// reaped.
    pub fn reap(&mut self) -> bool {
        if self.active.as_ref().is_some_and(|run| run.handle.is_finished()) {
            self.wait();
            return true;
        }
        false
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn join(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        tracing::error!("playback thread panicked");
    }
}

/// Block until `deadline` or a cancel. Returns `false` on cancel.
///
/// A deadline past what `Instant` can represent waits for the cancel only.
fn wait_until(cancel: &Receiver<()>, deadline: Option<Instant>) -> bool {
    let Some(deadline) = deadline else {
        let _ = cancel.recv();
        return false;
    };
    match cancel.recv_deadline(deadline) {
        Err(RecvTimeoutError::Timeout) => true,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
    }
}

fn run(
    steps: &[PlaybackStep],
    sink: &dyn NoteSink,
    status: &PlaybackStatus,
    cancel: &Receiver<()>,
) -> PlaybackOutcome {
    let origin = Instant::now();

    for step in steps {
        if !wait_until(cancel, origin.checked_add(step.onset)) {
            return PlaybackOutcome::Cancelled;
        }

        status.sounding.store(step.index, Ordering::Release);
        sink.note_on(step.frequency);

        let held = wait_until(cancel, origin.checked_add(step.release));

        sink.note_off();
        status.sounding.store(NOT_SOUNDING, Ordering::Release);

        if !held {
            return PlaybackOutcome::Cancelled;
        }
    }

    PlaybackOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::NoteLabel;

    fn closed(label: &str, start: f64, duration: f64) -> LogEntry {
        LogEntry::Closed {
            label: label.parse().unwrap(),
            start: Duration::from_secs_f64(start),
            duration: Duration::from_secs_f64(duration),
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn close_to(a: Duration, b: Duration) -> bool {
        a.abs_diff(b) < Duration::from_micros(10)
    }

    #[test]
    fn test_plan_reproduces_gaps_and_holds() {
        let entries = [closed("-1", 0.0, 0.2), closed("+3", 0.5, 0.3)];
        let steps = plan(&entries, 0, Tuning::default()).unwrap();

        assert_eq!(steps.len(), 2);
        assert!(close_to(steps[0].onset, secs(0.0)));
        assert!(close_to(steps[0].release, secs(0.2)));
        assert!(close_to(steps[1].onset, secs(0.5)));
        assert!(close_to(steps[1].release, secs(0.8)));
        assert_eq!(steps[1].index, 1);
        assert_eq!(
            steps[1].frequency,
            Tuning::default().frequency_of(NoteLabel::blow(3).unwrap())
        );
    }

    #[test]
    fn test_plan_from_middle_starts_immediately() {
        let entries = [
            closed("-1", 0.0, 0.2),
            closed("+3", 1.5, 0.3),
            closed("+4", 2.0, 0.1),
        ];
        let steps = plan(&entries, 1, Tuning::default()).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].onset, Duration::ZERO);
        assert_eq!(steps[0].index, 1);
        assert!(close_to(steps[1].onset, secs(0.5)));
        assert!(close_to(steps[1].release, secs(0.6)));
    }

    #[test]
    fn test_plan_out_of_range() {
        let entries = [closed("-1", 0.0, 0.2)];
        assert!(plan(&entries, 1, Tuning::default()).is_none());
        assert!(plan(&[], 0, Tuning::default()).is_none());
    }

    #[test]
    fn test_plan_open_entry_uses_fallback() {
        let entries = [
            closed("-1", 0.0, 0.1),
            LogEntry::Open {
                label: "+2".parse().unwrap(),
                start: secs(0.1),
            },
        ];
        let steps = plan(&entries, 0, Tuning::default()).unwrap();
        assert!(close_to(steps[1].release - steps[1].onset, OPEN_ENTRY_FALLBACK));
    }

    #[test]
    fn test_plan_overlap_does_not_go_backwards() {
        let entries = [closed("-1", 0.0, 1.0), closed("+2", 0.5, 0.2)];
        let steps = plan(&entries, 0, Tuning::default()).unwrap();
        assert!(close_to(steps[1].onset, secs(1.0)));
        assert!(close_to(steps[1].release, secs(1.2)));
    }

    #[test]
    fn test_plan_refuses_overflowing_run() {
        let huge = Duration::from_secs(10_000_000_000_000_000_000);
        let entries = [
            LogEntry::Closed {
                label: NoteLabel::draw(1).unwrap(),
                start: Duration::ZERO,
                duration: huge,
            },
            LogEntry::Closed {
                label: NoteLabel::draw(1).unwrap(),
                start: Duration::ZERO,
                duration: huge,
            },
        ];
        assert!(plan(&entries, 0, Tuning::default()).is_none());
        assert_eq!(plan(&entries, 1, Tuning::default()).unwrap().len(), 1);
    }

    struct Silent;

    impl NoteSink for Silent {
        fn note_on(&self, _frequency: f32) {}
        fn note_off(&self) {}
    }

    fn step(onset: Duration, release: Duration) -> PlaybackStep {
        PlaybackStep {
            index: 0,
            frequency: 440.0,
            onset,
            release,
        }
    }

    #[test]
    fn test_finished_run_is_reaped() {
        let mut scheduler = PlaybackScheduler::new(Arc::new(Silent));
        assert!(scheduler.start(vec![step(Duration::ZERO, secs(0.01))], None));

        let finished = scheduler.finished().unwrap();
        assert!(finished.recv().is_err(), "channel only disconnects");

        let deadline = Instant::now() + Duration::from_secs(2);
        while !scheduler.reap() {
            assert!(Instant::now() < deadline, "worker never exited");
            thread::sleep(Duration::from_millis(1));
        }
        assert!(scheduler.active.is_none());
        assert!(scheduler.finished().is_none());
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn test_unreachable_deadline_still_cancels() {
        let mut scheduler = PlaybackScheduler::new(Arc::new(Silent));
        assert!(scheduler.start(vec![step(Duration::MAX, Duration::MAX)], None));

        let started = Instant::now();
        scheduler.cancel();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!scheduler.is_playing());
    }
}
