//! Fixed values of the conversion.

/// Marker the slicer emits at the start of the first printed layer.
pub const LAYER_START_MARKER: &str = "LAYER:0";

/// Default duration of a synthetic laser switch record, in seconds.
pub const DEFAULT_ON_OFF_TIME: f64 = 0.001;

/// Delta extrusion carried by a switch-on record.
pub const SWITCH_ON_DELTA: f64 = 100.0;

/// Delta extrusion carried by a switch-off record.
pub const SWITCH_OFF_DELTA: f64 = -100.0;

/// Field values are rounded to this many decimals after parsing.
pub const DEFAULT_DECIMAL_PLACES: u32 = 4;

/// Feed rates are given per minute.
pub const SECONDS_PER_MINUTE: f64 = 60.0;
