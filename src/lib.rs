//! # PrintSeries
//!
//! Converts Marlin-flavoured G-code written by slicers such as Cura into the
//! time-stamped laser event series used to drive a moving heat source in an
//! ABAQUS additive manufacturing simulation.
//!
//! ## Architecture
//!
//! PrintSeries is organized as a workspace with multiple crates:
//!
//! 1. **printseries-core** - Record types, constants, geometry, errors
//! 2. **printseries-settings** - Converter configuration files
//! 3. **printseries-gcode** - Tokenizer, conversion stages, file I/O
//! 4. **printseries** - Command-line binary that integrates all crates
//!
//! ## Conversion
//!
//! Lines are tokenized into fields, the preamble before the first layer is
//! dropped, omitted machine state is filled in, laser switch records are
//! inserted at every extrusion start and stop, and each record is stamped with
//! the time the machine needs to reach it.

use std::path::Path;

use anyhow::Context;

pub use printseries_core::{
    ConversionError, Error, EventRow, LaserState, Position3, RecordKind, Result, TimedRecord,
};
pub use printseries_gcode::{
    AmplitudeTableWriter, ConversionPipeline, ConversionSummary, EventSeries, GcodeFileReader,
};
pub use printseries_settings::{ConverterConfig, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output on stderr, leaving stdout for the summary
/// - RUST_LOG environment variable support
/// - `info` level by default, `debug` when `verbose` is set
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Convert one G-code file and write its amplitude table to `output`
///
/// Nothing is written when the conversion fails.
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> anyhow::Result<ConversionSummary> {
    let reader = GcodeFileReader::new(input)?;
    let program = reader.read_all()?;

    let series = ConversionPipeline::from_config(config)
        .convert(&program)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    AmplitudeTableWriter::from_config(config)
        .write_to_file(&series.rows(), output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(series.summary().clone())
}
