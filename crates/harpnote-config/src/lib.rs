//! Settings for the harpnote practice tool.
//!
//! Loads and saves the user's key, label style, retrigger policy and audio
//! options from a TOML file in the platform config directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use harpnote_config::{Settings, settings_path};
//!
//! let mut settings = Settings::load_or_default(settings_path()).unwrap();
//! settings.key = "G3".to_string();
//! settings.save(settings_path()).unwrap();
//! ```

pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::{SETTINGS_FILE, ensure_user_config_dir, settings_path, user_config_dir};
pub use settings::{
    AudioSettings, BUFFER_SIZE_RANGE, CHANNEL_RANGE, SAMPLE_RATE_RANGE, Settings,
};
