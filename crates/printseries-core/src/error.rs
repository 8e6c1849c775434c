//! Error handling for PrintSeries
//!
//! Provides the error types for every layer of the converter:
//! - Conversion errors (marker search, numeric parsing, state reconstruction)
//! - Configuration errors
//! - I/O errors while reading the program or writing the amplitude table
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Conversion error type
///
/// Every variant is fatal for the file being converted. The run either
/// produces one complete event series or nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The program never reaches the first layer
    #[error("Layer start marker '{marker}' not found in input")]
    MissingLayerMarker {
        /// The marker that was searched for.
        marker: String,
    },

    /// Extrusion never starts or stops, so there is no laser event to anchor on
    #[error("Extrusion never toggles; no laser switch event found")]
    NoExtrusionTransition,

    /// A field matched its pattern but is not a number
    #[error("Malformed {field} value '{text}' at line {line_number}")]
    MalformedNumericField {
        /// The 1-based source line.
        line_number: usize,
        /// The field name.
        field: String,
        /// The text that failed to parse.
        text: String,
    },

    /// A filtering stage left nothing to work with
    #[error("No records left after {stage}")]
    EmptyInput {
        /// The stage that emptied the sequence.
        stage: String,
    },

    /// No feed rate is declared anywhere, so motion cannot be timed
    #[error("No feed rate declared in the program")]
    MissingFeedRate,

    /// A move covers distance at zero speed
    #[error("Feed rate {feed_rate} at line {line_number} cannot time a move")]
    NonPositiveFeedRate {
        /// The 1-based source line.
        line_number: usize,
        /// The offending feed rate.
        feed_rate: f64,
    },
}

impl ConversionError {
    /// Shorthand for an [`ConversionError::EmptyInput`] raised by `stage`
    pub fn empty(stage: impl Into<String>) -> Self {
        ConversionError::EmptyInput {
            stage: stage.into(),
        }
    }
}

/// Main error type for PrintSeries
#[derive(Error, Debug)]
pub enum Error {
    /// Conversion error
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Rejected configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result type for PrintSeries operations
pub type Result<T> = std::result::Result<T, Error>;
