//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/harpnote/`
//! - macOS: `~/Library/Application Support/harpnote/`
//! - Windows: `%APPDATA%\harpnote\`

use std::path::PathBuf;

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "harpnote";

/// File name of the settings file.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Ensure the user config directory exists, creating it if needed.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_config_dir() {
        let dir = user_config_dir();
        assert!(dir.ends_with("harpnote"), "got {:?}", dir);
    }

    #[test]
    fn test_settings_path() {
        let path = settings_path();
        assert!(path.ends_with("harpnote/settings.toml"), "got {:?}", path);
    }
}
