//! Record types passed between the conversion stages
//!
//! Each stage owns its own record type so that the optionality of a field is
//! visible in the type: tokenized text, parsed optional numbers, fully
//! reconstructed motion state, and finally timed events.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{SWITCH_OFF_DELTA, SWITCH_ON_DELTA};
use crate::geometry::Position3;

/// Motion field extracted from a G-code line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Feed rate (F)
    Feed,
    /// X coordinate
    X,
    /// Y coordinate
    Y,
    /// Z coordinate
    Z,
    /// Cumulative extrusion (E)
    Extrusion,
}

impl FieldKind {
    /// All fields, in column order
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Feed,
        FieldKind::X,
        FieldKind::Y,
        FieldKind::Z,
        FieldKind::Extrusion,
    ];

    /// Address letter of the field in G-code text
    pub fn letter(&self) -> char {
        match self {
            FieldKind::Feed => 'F',
            FieldKind::X => 'X',
            FieldKind::Y => 'Y',
            FieldKind::Z => 'Z',
            FieldKind::Extrusion => 'E',
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One source line after lexical extraction
///
/// Field texts keep their address letter (`"X10.5"`); nothing is parsed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenizedLine {
    /// 1-based line number in the source program
    pub line_number: usize,
    /// Raw line text, comments included
    pub raw: String,
    /// Feed rate text
    pub feed: Option<String>,
    /// X text
    pub x: Option<String>,
    /// Y text
    pub y: Option<String>,
    /// Z text
    pub z: Option<String>,
    /// Extrusion text
    pub extrusion: Option<String>,
}

impl TokenizedLine {
    /// Text of a field
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        match kind {
            FieldKind::Feed => self.feed.as_deref(),
            FieldKind::X => self.x.as_deref(),
            FieldKind::Y => self.y.as_deref(),
            FieldKind::Z => self.z.as_deref(),
            FieldKind::Extrusion => self.extrusion.as_deref(),
        }
    }

    /// Mutable slot of a field
    pub fn field_mut(&mut self, kind: FieldKind) -> &mut Option<String> {
        match kind {
            FieldKind::Feed => &mut self.feed,
            FieldKind::X => &mut self.x,
            FieldKind::Y => &mut self.y,
            FieldKind::Z => &mut self.z,
            FieldKind::Extrusion => &mut self.extrusion,
        }
    }

    /// True when no motion field is present
    pub fn is_blank(&self) -> bool {
        FieldKind::ALL.iter().all(|kind| self.field(*kind).is_none())
    }
}

/// A retained line with its fields parsed into numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// 1-based line number in the source program
    pub line_number: usize,
    /// Feed rate, units per minute
    pub feed_rate: Option<f64>,
    /// X coordinate
    pub x: Option<f64>,
    /// Y coordinate
    pub y: Option<f64>,
    /// Z coordinate
    pub z: Option<f64>,
    /// Cumulative extrusion
    pub extrusion: Option<f64>,
}

impl ParsedRecord {
    /// True when the line carries a position or extrusion value
    pub fn has_motion(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some() || self.extrusion.is_some()
    }
}

/// A record with every field known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionRecord {
    /// 1-based line number in the source program
    pub line_number: usize,
    /// Feed rate, units per minute
    pub feed_rate: f64,
    /// Tool tip position
    pub position: Position3,
    /// Cumulative extrusion
    pub extrusion: f64,
    /// Change in extrusion since the previous record
    pub delta_extrusion: f64,
}

impl MotionRecord {
    /// Whether material is being deposited on this move
    pub fn is_extruding(&self) -> bool {
        self.delta_extrusion > 0.0
    }
}

/// Origin of a timed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A move from the program
    Motion,
    /// Synthetic laser turn-on event
    SwitchOn,
    /// Synthetic laser turn-off event
    SwitchOff,
}

impl RecordKind {
    /// True for synthetic switch events
    pub fn is_switch(&self) -> bool {
        matches!(self, RecordKind::SwitchOn | RecordKind::SwitchOff)
    }

    /// Delta extrusion carried by a switch record
    pub fn sentinel_delta(&self) -> Option<f64> {
        match self {
            RecordKind::Motion => None,
            RecordKind::SwitchOn => Some(SWITCH_ON_DELTA),
            RecordKind::SwitchOff => Some(SWITCH_OFF_DELTA),
        }
    }
}

/// Binary actuation channel for the simulation's deposition model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaserState {
    /// Not depositing
    Off = 0,
    /// Depositing
    On = 1,
}

impl LaserState {
    /// Laser state implied by a delta extrusion
    pub fn from_delta(delta_extrusion: f64) -> Self {
        if delta_extrusion > 0.0 {
            LaserState::On
        } else {
            LaserState::Off
        }
    }

    /// Numeric column value
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for LaserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A record of the final series, before column selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedRecord {
    /// Program move or synthetic switch
    pub kind: RecordKind,
    /// Source line the record derives from
    pub line_number: usize,
    /// Tool tip position
    pub position: Position3,
    /// Feed rate, units per minute
    pub feed_rate: f64,
    /// Change in extrusion (switch sentinel for switch records)
    pub delta_extrusion: f64,
    /// Laser state
    pub laser: LaserState,
    /// Travel distance from the previous record
    pub distance: f64,
    /// Elapsed time since the previous record
    pub dt: f64,
    /// Absolute time
    pub time: f64,
}

/// One row of the exported amplitude table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    /// Absolute time
    pub time: f64,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
    /// Laser state
    pub laser: LaserState,
}

impl From<&TimedRecord> for EventRow {
    fn from(record: &TimedRecord) -> Self {
        Self {
            time: record.time,
            x: record.position.x,
            y: record.position.y,
            z: record.position.z,
            laser: record.laser,
        }
    }
}
