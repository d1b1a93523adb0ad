//! Persistent user settings.
//!
//! Settings live in a single TOML file. Every field has a default, so a
//! partial file (or none at all) still loads:
//!
//! ```toml
//! key = "A3"
//! labels = "note-name"
//! retrigger = "continue"
//!
//! [audio]
//! sample_rate = 44100
//! buffer_size = 512
//! ```

use std::io::ErrorKind;
use std::path::Path;

use harpnote_session::{LabelStyle, Tuning, midi_name};
use harpnote_synth::{EngineConfig, RetriggerPolicy};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Accepted output sample rates in Hz.
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=192_000;

/// Accepted callback buffer sizes in frames.
pub const BUFFER_SIZE_RANGE: std::ops::RangeInclusive<u32> = 16..=8192;

/// Accepted output channel counts.
pub const CHANNEL_RANGE: std::ops::RangeInclusive<u16> = 1..=8;

/// Audio output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Requested sample rate in Hz. The device may run at another rate.
    pub sample_rate: u32,
    /// Requested buffer size in frames.
    pub buffer_size: u32,
    /// Output channel count. The mono voice is copied to each channel.
    pub channels: u16,
    /// Output device name, or `None` for the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            channels: 2,
            output_device: None,
        }
    }
}

/// All user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Harmonica key as a note name, e.g. `"C4"`.
    pub key: String,
    /// How note labels are shown.
    pub labels: LabelStyle,
    /// What a note-on does while the voice is still sounding.
    pub retrigger: RetriggerPolicy,
    /// Audio output options.
    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key: Tuning::default().key_name(),
            labels: LabelStyle::default(),
            retrigger: RetriggerPolicy::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), key = %settings.key, "loaded settings");
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::read_file(path, e)),
        }
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Serialize settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning()?;

        let audio = &self.audio;
        if !SAMPLE_RATE_RANGE.contains(&audio.sample_rate) {
            return Err(ConfigError::invalid_value(
                "audio.sample_rate",
                format!(
                    "{} Hz is outside {}-{} Hz",
                    audio.sample_rate,
                    SAMPLE_RATE_RANGE.start(),
                    SAMPLE_RATE_RANGE.end()
                ),
            ));
        }
        if !BUFFER_SIZE_RANGE.contains(&audio.buffer_size) {
            return Err(ConfigError::invalid_value(
                "audio.buffer_size",
                format!(
                    "{} frames is outside {}-{}",
                    audio.buffer_size,
                    BUFFER_SIZE_RANGE.start(),
                    BUFFER_SIZE_RANGE.end()
                ),
            ));
        }
        if !CHANNEL_RANGE.contains(&audio.channels) {
            return Err(ConfigError::invalid_value(
                "audio.channels",
                format!(
                    "{} is outside {}-{}",
                    audio.channels,
                    CHANNEL_RANGE.start(),
                    CHANNEL_RANGE.end()
                ),
            ));
        }
        Ok(())
    }

    /// Tuning for the configured key.
    pub fn tuning(&self) -> Result<Tuning, ConfigError> {
        Ok(self.key.parse::<Tuning>()?)
    }

    /// Store a tuning's key.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.key = midi_name(tuning.key_midi());
    }

    /// Engine settings at the requested sample rate.
    ///
    /// The output layer retunes the engine if the device runs at a
    /// different rate.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: self.audio.sample_rate as f32,
            retrigger: self.retrigger,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.key, "C4");
        settings.validate().unwrap();
        assert_eq!(settings.tuning().unwrap().key_midi(), 60);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_toml() {
        let settings = Settings::from_toml(
            r#"
            key = "A3"
            labels = "note-name"

            [audio]
            buffer_size = 512
            "#,
        )
        .unwrap();

        assert_eq!(settings.tuning().unwrap().key_midi(), 57);
        assert_eq!(settings.labels, LabelStyle::NoteName);
        assert_eq!(settings.retrigger, RetriggerPolicy::Restart);
        assert_eq!(settings.audio.buffer_size, 512);
        assert_eq!(settings.audio.sample_rate, 48000);
    }

    #[test]
    fn test_retrigger_policy_parses() {
        let settings = Settings::from_toml(r#"retrigger = "continue""#).unwrap();
        assert_eq!(settings.retrigger, RetriggerPolicy::Continue);
        assert_eq!(settings.engine_config().retrigger, RetriggerPolicy::Continue);
    }

    #[test]
    fn test_key_out_of_range_rejected() {
        let err = Settings::from_toml(r#"key = "C7""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(_)), "got {err:?}");
    }

    #[test]
    fn test_bad_key_name_rejected() {
        let err = Settings::from_toml(r#"key = "H2""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(_)), "got {err:?}");
    }

    #[test]
    fn test_audio_ranges_rejected() {
        let err = Settings::from_toml("[audio]\nsample_rate = 1000").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field: "audio.sample_rate", .. }),
            "got {err:?}"
        );

        let err = Settings::from_toml("[audio]\nchannels = 0").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field: "audio.channels", .. }),
            "got {err:?}"
        );

        let err = Settings::from_toml("[audio]\nbuffer_size = 4").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field: "audio.buffer_size", .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_unknown_label_style_is_parse_error() {
        let err = Settings::from_toml(r#"labels = "colors""#).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)), "got {err:?}");
    }

    #[test]
    fn test_to_toml_omits_default_device() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("key = \"C4\""), "got:\n{toml}");
        assert!(!toml.contains("output_device"), "got:\n{toml}");
    }

    #[test]
    fn test_set_tuning_stores_name() {
        let mut settings = Settings::default();
        settings.set_tuning(Tuning::new(62).unwrap());
        assert_eq!(settings.key, "D4");
        assert_eq!(settings.tuning().unwrap().key_midi(), 62);
    }

    #[test]
    fn test_engine_config_uses_requested_rate() {
        let mut settings = Settings::default();
        settings.audio.sample_rate = 44100;
        assert_eq!(settings.engine_config().sample_rate, 44100.0);
    }
}
