//! Settings file round trips through the filesystem.

use harpnote_config::{ConfigError, Settings};
use harpnote_session::LabelStyle;
use harpnote_synth::RetriggerPolicy;
use tempfile::TempDir;

#[test]
fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut settings = Settings::default();
    settings.key = "G3".to_string();
    settings.labels = LabelStyle::NoteName;
    settings.retrigger = RetriggerPolicy::Continue;
    settings.audio.output_device = Some("Built-in Output".to_string());

    settings.save(&path).unwrap();
    assert!(path.exists());

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.tuning().unwrap().key_midi(), 55);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Settings::load(&path),
        Err(ConfigError::ReadFile { .. })
    ));
    assert_eq!(Settings::load_or_default(&path).unwrap(), Settings::default());
}

#[test]
fn invalid_file_is_an_error_even_with_fallback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "key = [not toml").unwrap();

    assert!(matches!(
        Settings::load_or_default(&path),
        Err(ConfigError::TomlParse(_))
    ));
}
