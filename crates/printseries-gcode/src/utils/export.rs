//! Amplitude table export
//!
//! Writes the event series as a delimited text table with no header and the
//! columns `time, x, y, z, laser_state`, the layout the simulation package
//! reads as an amplitude/event definition.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use printseries_core::{EventRow, Result};
use printseries_settings::ConverterConfig;

/// One table row as written: `time, x, y, z, laser_state`
type TableRecord = (f64, f64, f64, f64, u8);

/// Writes event rows as a delimited table
#[derive(Debug, Clone)]
pub struct AmplitudeTableWriter {
    delimiter: u8,
}

impl AmplitudeTableWriter {
    /// Create a comma-separated writer
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Create a writer using the configured delimiter
    pub fn from_config(config: &ConverterConfig) -> Self {
        let delimiter = config.output.delimiter;
        if !delimiter.is_ascii() {
            tracing::warn!(
                "Delimiter '{}' is not ASCII, using ','",
                delimiter.escape_default()
            );
            return Self::new();
        }
        Self::new().with_delimiter(delimiter as u8)
    }

    /// Use a different column delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write all rows to `writer`
    pub fn write_rows<W: Write>(&self, rows: &[EventRow], writer: W) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .from_writer(writer);

        for row in rows {
            writer.serialize(table_record(row))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write all rows to a file
    ///
    /// Rows go to a sibling temporary file that replaces `path` only once
    /// everything was written, so a failed run leaves no partial table.
    pub fn write_to_file(&self, rows: &[EventRow], path: &Path) -> Result<()> {
        let staging = staging_path(path);

        let written = File::create(&staging)
            .map_err(csv::Error::from)
            .and_then(|file| self.write_rows(rows, file))
            .and_then(|_| fs::rename(&staging, path).map_err(csv::Error::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(io::Error::from(e).into());
        }

        tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

impl Default for AmplitudeTableWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn table_record(row: &EventRow) -> TableRecord {
    (
        fold_zero(row.time),
        fold_zero(row.x),
        fold_zero(row.y),
        fold_zero(row.z),
        row.laser.as_u8(),
    )
}

/// Negative zero prints as `-0.0`; home should read `0.0`
fn fold_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
