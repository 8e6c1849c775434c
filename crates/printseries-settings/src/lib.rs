//! PrintSeries Settings Crate
//!
//! Handles converter configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{ConverterConfig, OutputSettings, ParsingSettings, TimingSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
