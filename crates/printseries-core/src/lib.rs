//! # PrintSeries Core
//!
//! Core types shared by every PrintSeries crate: the record types that flow
//! through the conversion stages, geometry helpers, fixed constants, and the
//! error taxonomy.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod record;

pub use constants::{
    DEFAULT_DECIMAL_PLACES, DEFAULT_ON_OFF_TIME, LAYER_START_MARKER, SECONDS_PER_MINUTE,
    SWITCH_OFF_DELTA, SWITCH_ON_DELTA,
};
pub use error::{ConversionError, Error, Result};
pub use geometry::{round_to, Position3};
pub use record::{
    EventRow, FieldKind, LaserState, MotionRecord, ParsedRecord, RecordKind, TimedRecord,
    TokenizedLine,
};
