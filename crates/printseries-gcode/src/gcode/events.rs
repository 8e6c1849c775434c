//! Laser switch event synthesis
//!
//! Tracks the extrusion state across records and inserts a synthetic switch
//! record wherever extrusion starts or stops. The switch record repeats the
//! previous record's position, so it marks the instant the laser toggles
//! before the move that follows.

use printseries_core::{LaserState, MotionRecord, RecordKind, TimedRecord};

/// Extrusion state of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrusionPhase {
    /// Depositing material (`delta > 0`)
    Extruding,
    /// Travelling, retracting or standing still (`delta <= 0`)
    Idle,
}

impl ExtrusionPhase {
    /// Phase implied by a record's delta extrusion
    pub fn of(record: &MotionRecord) -> Self {
        if record.is_extruding() {
            ExtrusionPhase::Extruding
        } else {
            ExtrusionPhase::Idle
        }
    }

    /// Switch record kind emitted when entering `next` from this phase
    pub fn transition_to(self, next: ExtrusionPhase) -> Option<RecordKind> {
        match (self, next) {
            (ExtrusionPhase::Idle, ExtrusionPhase::Extruding) => Some(RecordKind::SwitchOn),
            (ExtrusionPhase::Extruding, ExtrusionPhase::Idle) => Some(RecordKind::SwitchOff),
            _ => None,
        }
    }
}

/// Inserts switch records at extrusion transitions
#[derive(Debug, Clone, Default)]
pub struct EventSynthesizer;

impl EventSynthesizer {
    /// Create a new synthesizer
    pub fn new() -> Self {
        Self
    }

    /// Interleave switch records with the motion records
    ///
    /// The initial phase is taken from the first record without emitting a
    /// switch. Distances and times are left at zero for the timer.
    pub fn synthesize(&self, records: &[MotionRecord]) -> Vec<TimedRecord> {
        let mut events = Vec::with_capacity(records.len() + records.len() / 4);
        let mut previous: Option<&MotionRecord> = None;
        let mut phase = records
            .first()
            .map(ExtrusionPhase::of)
            .unwrap_or(ExtrusionPhase::Idle);

        for record in records {
            let next = ExtrusionPhase::of(record);
            if let (Some(prev), Some(kind)) = (previous, phase.transition_to(next)) {
                events.push(Self::switch_record(prev, kind));
            }
            events.push(Self::motion_record(record));

            phase = next;
            previous = Some(record);
        }

        let switches = events.len() - records.len();
        tracing::debug!(
            "Inserted {} laser switch records among {} motion records",
            switches,
            records.len()
        );

        events
    }

    fn motion_record(record: &MotionRecord) -> TimedRecord {
        TimedRecord {
            kind: RecordKind::Motion,
            line_number: record.line_number,
            position: record.position,
            feed_rate: record.feed_rate,
            delta_extrusion: record.delta_extrusion,
            laser: LaserState::from_delta(record.delta_extrusion),
            distance: 0.0,
            dt: 0.0,
            time: 0.0,
        }
    }

    fn switch_record(previous: &MotionRecord, kind: RecordKind) -> TimedRecord {
        let delta_extrusion = kind.sentinel_delta().unwrap_or_default();
        TimedRecord {
            kind,
            delta_extrusion,
            laser: LaserState::from_delta(delta_extrusion),
            ..Self::motion_record(previous)
        }
    }
}
