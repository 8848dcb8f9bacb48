//! # reel-settings
//!
//! Settings types and loading for the Reel agent.
//!
//! Loading flow:
//! 1. Start with compiled [`ReelSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)

#![deny(unsafe_code)]

mod errors;
mod loader;
mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path,
};
pub use types::{AgentSettings, LoggingSettings, ReelSettings, RenderSettings};
