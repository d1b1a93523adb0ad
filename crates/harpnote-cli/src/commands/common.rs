//! Shared CLI helpers used across multiple commands.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use harpnote_config::{Settings, settings_path};
use harpnote_session::{LogEntry, NoteLabel, NoteLog, Tuning};

/// Longest take the CLI accepts, measured to the end of its last note.
pub const MAX_TAKE: Duration = Duration::from_secs(600);

/// Load settings from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = path.map_or_else(settings_path, Path::to_path_buf);
    Settings::load_or_default(&path)
        .with_context(|| format!("loading settings from {}", path.display()))
}

/// Tuning from a `--key` flag, falling back to the settings file.
pub fn resolve_tuning(key: Option<&str>, settings: &Settings) -> anyhow::Result<Tuning> {
    match key {
        Some(key) => key.parse().with_context(|| format!("bad --key '{key}'")),
        None => Ok(settings.tuning()?),
    }
}

/// Parse a written take such as `"-1@0:0.2 +3@0.5:0.3"`.
///
/// Each note is `LABEL@START:DURATION` in seconds. The duration may be left
/// off the last note to leave it open. No note may end past [`MAX_TAKE`].
pub fn parse_take(take: &str) -> anyhow::Result<NoteLog> {
    let tokens: Vec<&str> = take.split_whitespace().collect();
    let mut entries = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        let (label, timing) = token
            .split_once('@')
            .with_context(|| format!("note '{token}' is missing '@START'"))?;
        let label: NoteLabel = label
            .parse()
            .with_context(|| format!("note '{token}'"))?;

        let (start, duration) = match timing.split_once(':') {
            Some((start, duration)) => (start, Some(duration)),
            None => (timing, None),
        };
        let start = parse_seconds(start).with_context(|| format!("start of '{token}'"))?;
        let duration = duration
            .map(|d| parse_seconds(d).with_context(|| format!("duration of '{token}'")))
            .transpose()?;

        if start.saturating_add(duration.unwrap_or_default()) > MAX_TAKE {
            anyhow::bail!(
                "note '{token}' ends past the {}s take limit",
                MAX_TAKE.as_secs()
            );
        }

        let entry = match duration {
            Some(duration) => LogEntry::Closed {
                label,
                start,
                duration,
            },
            None if i + 1 == tokens.len() => LogEntry::Open { label, start },
            None => anyhow::bail!("only the last note may leave out ':DURATION' ('{token}')"),
        };
        entries.push(entry);
    }

    Ok(entries.into_iter().collect())
}

fn parse_seconds(s: &str) -> anyhow::Result<Duration> {
    let secs: f64 = s
        .parse()
        .with_context(|| format!("'{s}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).with_context(|| format!("'{s}' is not a valid time"))
}

/// Seconds with millisecond precision, e.g. `1.250`.
pub fn format_secs(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_take() {
        let log = parse_take("-1@0:0.2 +3@0.5:0.3").unwrap();
        assert_eq!(log.len(), 2);

        let first = log.get(0).unwrap();
        assert_eq!(first.label(), NoteLabel::draw(1).unwrap());
        assert_eq!(first.start(), Duration::ZERO);
        assert_eq!(first.duration(), Some(Duration::from_millis(200)));

        let second = log.get(1).unwrap();
        assert_eq!(second.label(), NoteLabel::blow(3).unwrap());
        assert_eq!(second.start(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_take_sorts_by_start() {
        let log = parse_take("+4@1:0.1 -4@0:0.1").unwrap();
        assert_eq!(log.get(0).unwrap().label(), NoteLabel::draw(4).unwrap());
    }

    #[test]
    fn test_parse_take_trailing_open_note() {
        let log = parse_take("+1@0:0.1 +2@0.5").unwrap();
        assert!(log.get(1).unwrap().is_open());
        assert!(parse_take("+1@0 +2@0.5:0.1").is_err());
    }

    #[test]
    fn test_parse_take_rejects_garbage() {
        assert!(parse_take("+11@0:0.1").is_err());
        assert!(parse_take("+1").is_err());
        assert!(parse_take("+1@x:0.1").is_err());
        assert!(parse_take("+1@0:-0.5").is_err());
    }

    #[test]
    fn test_parse_take_rejects_notes_past_limit() {
        let limit = MAX_TAKE.as_secs_f64();
        assert!(parse_take(&format!("-1@{}:0.5", limit - 1.0)).is_ok());
        assert!(parse_take(&format!("-1@{}:2", limit - 1.0)).is_err());
        assert!(parse_take("-1@1e9:0.1").is_err());
        assert!(parse_take("-1@0:1e19 +1@0:1e19").is_err());

        let err = parse_take("+2@0.5 -1@1e9").unwrap_err();
        assert!(format!("{err:#}").contains("take limit"));
    }

    #[test]
    fn test_empty_take() {
        assert!(parse_take("   ").unwrap().is_empty());
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(Duration::from_millis(1250)), "1.250");
    }
}
