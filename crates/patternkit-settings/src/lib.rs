//! PatternKit Settings Crate
//!
//! Handles the engine configuration file: tolerances and option sets for the
//! geometry engines, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{default_config_path, ConfigFormat, EngineConfig};
pub use error::{ConfigError, SettingsError, SettingsResult};
