//! Run settings: settings file, command-line overrides and the API key.
/// Settings file loader
mod loader;
/// Configuration manager
mod manager;
/// Settings types and validation
mod types;

pub use loader::SETTINGS_FILE_NAME;
pub use manager::ConfigManager;
pub use types::{
    API_KEY_ENV,
    ConfigError,
    LocalizeSettings,
    SettingsOverrides,
    ValidationError,
};
