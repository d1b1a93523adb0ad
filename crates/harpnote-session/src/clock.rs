//! Virtual clock that stops while the session is paused.
//!
//! Virtual time is the time source's reading minus every paused interval, so
//! gaps spent editing or listening to playback never show up between
//! recorded notes.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic source of elapsed time.
pub trait TimeSource: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn elapsed(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    /// Start measuring from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced time source.
///
/// Clones share the same reading, so a test can hold one handle and give
/// another to the clock under test.
///
/// ```rust
/// use std::time::Duration;
/// use harpnote_session::{ManualTime, TimeSource};
///
/// let time = ManualTime::new();
/// let shared = time.clone();
/// time.advance(Duration::from_millis(250));
/// assert_eq!(shared.elapsed(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    nanos: Arc<AtomicU64>,
}

impl ManualTime {
    /// Start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(duration_to_nanos(by), Ordering::SeqCst);
    }

    /// Jump to an absolute reading. Moving backwards is ignored.
    pub fn set(&self, to: Duration) {
        self.nanos.fetch_max(duration_to_nanos(to), Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn duration_to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Clock whose reading excludes paused intervals.
///
/// # Invariants
///
/// - `accumulated_pause` only grows between calls to [`reset`](Self::reset)
/// - at most one pause interval is open
/// - [`now`](Self::now) is frozen while a pause is open
pub struct VirtualClock {
    source: Arc<dyn TimeSource>,
    accumulated_pause: Duration,
    /// Source reading at which the open pause began
    pause_started: Option<Duration>,
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualClock")
            .field("accumulated_pause", &self.accumulated_pause)
            .field("pause_started", &self.pause_started)
            .finish_non_exhaustive()
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(Arc::new(MonotonicTime::new()))
    }
}

impl VirtualClock {
    /// Clock over the given time source, running (not paused).
    pub fn new(source: Arc<dyn TimeSource>) -> Self {
        Self {
            source,
            accumulated_pause: Duration::ZERO,
            pause_started: None,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        let reading = self.pause_started.unwrap_or_else(|| self.source.elapsed());
        reading.saturating_sub(self.accumulated_pause)
    }

    /// Open or close a pause interval. Repeating the current state is a
    /// no-op.
    pub fn set_paused(&mut self, paused: bool) {
        match (paused, self.pause_started) {
            (true, None) => {
                self.pause_started = Some(self.source.elapsed());
            }
            (false, Some(started)) => {
                let length = self.source.elapsed().saturating_sub(started);
                self.accumulated_pause += length;
                self.pause_started = None;
                tracing::trace!(?length, total = ?self.accumulated_pause, "pause closed");
            }
            _ => {}
        }
    }

    /// Whether a pause interval is open.
    pub fn is_paused(&self) -> bool {
        self.pause_started.is_some()
    }

    /// Total length of closed pause intervals.
    pub fn accumulated_pause(&self) -> Duration {
        self.accumulated_pause
    }

    /// Forget all pause history, including an open interval.
    pub fn reset(&mut self) {
        self.accumulated_pause = Duration::ZERO;
        self.pause_started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_clock() -> (ManualTime, VirtualClock) {
        let time = ManualTime::new();
        let clock = VirtualClock::new(Arc::new(time.clone()));
        (time, clock)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_runs_with_source_when_unpaused() {
        let (time, clock) = manual_clock();
        assert_eq!(clock.now(), Duration::ZERO);
        time.advance(ms(120));
        assert_eq!(clock.now(), ms(120));
    }

    #[test]
    fn test_frozen_during_pause() {
        let (time, mut clock) = manual_clock();
        time.advance(ms(100));
        clock.set_paused(true);
        assert!(clock.is_paused());

        time.advance(ms(500));
        assert_eq!(clock.now(), ms(100));

        clock.set_paused(false);
        assert_eq!(clock.now(), ms(100));
        assert_eq!(clock.accumulated_pause(), ms(500));

        time.advance(ms(50));
        assert_eq!(clock.now(), ms(150));
    }

    #[test]
    fn test_repeated_pause_calls_are_noops() {
        let (time, mut clock) = manual_clock();
        clock.set_paused(true);
        time.advance(ms(200));
        clock.set_paused(true);
        time.advance(ms(200));
        clock.set_paused(false);
        clock.set_paused(false);
        assert_eq!(clock.accumulated_pause(), ms(400));
    }

    #[test]
    fn test_reset_discards_pause_history() {
        let (time, mut clock) = manual_clock();
        clock.set_paused(true);
        time.advance(ms(300));
        clock.set_paused(false);
        clock.set_paused(true);
        time.advance(ms(100));

        clock.reset();
        assert!(!clock.is_paused());
        assert_eq!(clock.accumulated_pause(), Duration::ZERO);
        assert_eq!(clock.now(), ms(400));
    }

    #[test]
    fn test_manual_time_never_goes_backwards() {
        let time = ManualTime::new();
        time.set(ms(500));
        time.set(ms(200));
        assert_eq!(time.elapsed(), ms(500));
    }

    #[test]
    fn test_monotonic_time_advances() {
        let time = MonotonicTime::new();
        let first = time.elapsed();
        std::thread::sleep(ms(2));
        assert!(time.elapsed() > first);
    }
}
