//! The ordered log of recorded notes.

use std::time::Duration;

use crate::label::NoteLabel;

/// One recorded note.
///
/// A note still being held has no duration yet, so it is a distinct
/// variant rather than a zero or missing duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntry {
    /// Note is still held.
    Open {
        /// Which note.
        label: NoteLabel,
        /// Virtual time the note started.
        start: Duration,
    },
    /// Note has been released.
    Closed {
        /// Which note.
        label: NoteLabel,
        /// Virtual time the note started.
        start: Duration,
        /// How long it was held.
        duration: Duration,
    },
}

impl LogEntry {
    /// Which note.
    pub fn label(&self) -> NoteLabel {
        match *self {
            Self::Open { label, .. } | Self::Closed { label, .. } => label,
        }
    }

    /// Virtual start time.
    pub fn start(&self) -> Duration {
        match *self {
            Self::Open { start, .. } | Self::Closed { start, .. } => start,
        }
    }

    /// Hold duration, if the note has been released.
    pub fn duration(&self) -> Option<Duration> {
        match *self {
            Self::Open { .. } => None,
            Self::Closed { duration, .. } => Some(duration),
        }
    }

    /// Whether the note is still held.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Virtual time the note ended, if released.
    pub fn end(&self) -> Option<Duration> {
        self.duration().map(|d| self.start() + d)
    }
}

/// Ordered sequence of [`LogEntry`] with non-decreasing start times and at
/// most one open entry, always the last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteLog {
    entries: Vec<LogEntry>,
}

impl NoteLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the open entry, if any.
    pub fn open_index(&self) -> Option<usize> {
        self.entries
            .last()
            .filter(|e| e.is_open())
            .map(|_| self.entries.len() - 1)
    }

    /// Start time of the last entry.
    pub(crate) fn last_start(&self) -> Option<Duration> {
        self.entries.last().map(LogEntry::start)
    }

    pub(crate) fn push_open(&mut self, label: NoteLabel, start: Duration) {
        self.entries.push(LogEntry::Open { label, start });
    }

    /// Close the open entry at `at`, returning its duration.
    pub(crate) fn close_open(&mut self, at: Duration) -> Option<Duration> {
        let last = self.entries.last_mut()?;
        if let LogEntry::Open { label, start } = *last {
            let duration = at.saturating_sub(start);
            *last = LogEntry::Closed {
                label,
                start,
                duration,
            };
            Some(duration)
        } else {
            None
        }
    }

    pub(crate) fn set_label(&mut self, index: usize, new_label: NoteLabel) -> bool {
        match self.entries.get_mut(index) {
            Some(LogEntry::Closed { label, .. }) => {
                *label = new_label;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<LogEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a NoteLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<LogEntry> for NoteLog {
    /// Collect entries, sorting by start time and closing every open entry
    /// but a trailing one at zero length.
    fn from_iter<I: IntoIterator<Item = LogEntry>>(iter: I) -> Self {
        let mut entries: Vec<LogEntry> = iter.into_iter().collect();
        entries.sort_by_key(LogEntry::start);
        let last = entries.len().saturating_sub(1);
        for (i, entry) in entries.iter_mut().enumerate() {
            if i == last {
                break;
            }
            if let LogEntry::Open { label, start } = *entry {
                *entry = LogEntry::Closed {
                    label,
                    start,
                    duration: Duration::ZERO,
                };
            }
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> NoteLabel {
        s.parse().unwrap()
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_entry_accessors() {
        let open = LogEntry::Open {
            label: label("-4"),
            start: secs(1.0),
        };
        assert!(open.is_open());
        assert_eq!(open.duration(), None);
        assert_eq!(open.end(), None);

        let closed = LogEntry::Closed {
            label: label("+3"),
            start: secs(1.0),
            duration: secs(0.5),
        };
        assert_eq!(closed.label(), label("+3"));
        assert_eq!(closed.end(), Some(secs(1.5)));
    }

    #[test]
    fn test_close_saturates() {
        let mut log = NoteLog::new();
        log.push_open(label("-1"), secs(2.0));
        assert_eq!(log.open_index(), Some(0));
        assert_eq!(log.close_open(secs(1.0)), Some(Duration::ZERO));
        assert_eq!(log.open_index(), None);
        assert_eq!(log.close_open(secs(3.0)), None);
    }

    #[test]
    fn test_set_label_only_on_closed() {
        let mut log = NoteLog::new();
        log.push_open(label("-1"), secs(0.0));
        assert!(!log.set_label(0, label("+2")));
        log.close_open(secs(0.3));
        assert!(log.set_label(0, label("+2")));
        assert!(!log.set_label(5, label("+2")));
        assert_eq!(log.get(0).map(LogEntry::label), Some(label("+2")));
    }

    #[test]
    fn test_from_iter_sorts_and_closes() {
        let log: NoteLog = vec![
            LogEntry::Open {
                label: label("+1"),
                start: secs(0.5),
            },
            LogEntry::Closed {
                label: label("-1"),
                start: secs(0.0),
                duration: secs(0.2),
            },
            LogEntry::Open {
                label: label("+2"),
                start: secs(0.9),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(log.len(), 3);
        assert_eq!(log.get(0).map(LogEntry::label), Some(label("-1")));
        assert_eq!(log.get(1).and_then(LogEntry::duration), Some(Duration::ZERO));
        assert_eq!(log.open_index(), Some(2));
    }
}
