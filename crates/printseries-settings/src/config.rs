//! Converter configuration for PrintSeries
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; a default file is looked up in the platform config
//! directory.
//!
//! Configuration is organized into logical sections:
//! - Parsing settings (layer marker, rounding)
//! - Timing settings (laser switch duration)
//! - Output settings (file naming, column delimiter)

use printseries_core::{DEFAULT_DECIMAL_PLACES, DEFAULT_ON_OFF_TIME, LAYER_START_MARKER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Application directory name under the platform config directory
pub const APP_DIR_NAME: &str = "printseries";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Upper bound on rounding precision
const MAX_DECIMAL_PLACES: u32 = 10;

/// Tokenizing and trimming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingSettings {
    /// Marker of the first printed layer; everything before it is discarded
    pub layer_marker: String,
    /// Decimal places kept when parsing field values
    pub decimal_places: u32,
}

impl Default for ParsingSettings {
    fn default() -> Self {
        Self {
            layer_marker: LAYER_START_MARKER.to_string(),
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

/// Event timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Duration of a synthetic laser switch record, in seconds
    pub on_off_time: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            on_off_time: DEFAULT_ON_OFF_TIME,
        }
    }
}

/// Amplitude table output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Appended to the input file stem
    pub suffix: String,
    /// Output file extension, without the dot
    pub extension: String,
    /// Column delimiter
    pub delimiter: char,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            suffix: "_event_series".to_string(),
            extension: "inp".to_string(),
            delimiter: ',',
        }
    }
}

/// Complete converter configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConverterConfig {
    /// Parsing settings
    pub parsing: ParsingSettings,
    /// Timing settings
    pub timing: TimingSettings,
    /// Output settings
    pub output: OutputSettings,
}

impl ConverterConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the switch duration
    pub fn with_on_off_time(mut self, on_off_time: f64) -> Self {
        self.timing.on_off_time = on_off_time;
        self
    }

    /// Load config from file (JSON or TOML, chosen by extension)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded converter config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML, chosen by extension)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Location of the default config file
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("platform config directory unknown".to_string())
            })
    }

    /// Load the default config file if it exists, otherwise defaults
    pub fn load_default() -> SettingsResult<Self> {
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from_file(&path),
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                tracing::debug!("No default config location: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let on_off_time = self.timing.on_off_time;
        if !on_off_time.is_finite() || on_off_time <= 0.0 {
            return Err(SettingsError::invalid(
                "timing.on_off_time",
                format!("must be a positive number, got {}", on_off_time),
            ));
        }

        if self.parsing.layer_marker.trim().is_empty() {
            return Err(SettingsError::invalid(
                "parsing.layer_marker",
                "must not be empty",
            ));
        }

        if self.parsing.decimal_places > MAX_DECIMAL_PLACES {
            return Err(SettingsError::invalid(
                "parsing.decimal_places",
                format!("must be at most {}", MAX_DECIMAL_PLACES),
            ));
        }

        let delimiter = self.output.delimiter;
        if !delimiter.is_ascii() {
            return Err(SettingsError::invalid(
                "output.delimiter",
                format!("'{}' is not a single ASCII character", delimiter.escape_default()),
            ));
        }
        if delimiter.is_ascii_digit() || matches!(delimiter, '.' | '-' | '+' | 'e' | 'E' | '\n') {
            return Err(SettingsError::invalid(
                "output.delimiter",
                format!("'{}' collides with numeric text", delimiter.escape_default()),
            ));
        }

        if self.output.extension.contains(['/', '\\']) || self.output.suffix.contains(['/', '\\'])
        {
            return Err(SettingsError::invalid(
                "output",
                "suffix and extension must not contain path separators",
            ));
        }

        Ok(())
    }

    /// Output path for an input program
    ///
    /// `print.gcode` becomes `print_event_series.inp` in the same directory.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        let mut name = format!("{}{}", stem, self.output.suffix);
        if !self.output.extension.is_empty() {
            name.push('.');
            name.push_str(&self.output.extension);
        }

        input.with_file_name(name)
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
