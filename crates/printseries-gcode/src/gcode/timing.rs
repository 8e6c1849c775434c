//! Event timer
//!
//! Cuts the priming moves that precede the first laser event and integrates
//! elapsed time from travel distance and feed rate.

use printseries_core::{ConversionError, TimedRecord, DEFAULT_ON_OFF_TIME, SECONDS_PER_MINUTE};

/// Assigns durations and absolute times to an event sequence
#[derive(Debug, Clone)]
pub struct EventTimer {
    on_off_time: f64,
}

impl EventTimer {
    /// Create a timer with the default switch duration
    pub fn new() -> Self {
        Self {
            on_off_time: DEFAULT_ON_OFF_TIME,
        }
    }

    /// Use a different switch duration
    pub fn with_on_off_time(mut self, on_off_time: f64) -> Self {
        self.on_off_time = on_off_time;
        self
    }

    /// Duration of the move into `record` from `previous`
    ///
    /// Switch records take the fixed switch duration; a move that covers no
    /// distance takes no time.
    pub fn duration(
        &self,
        previous: &TimedRecord,
        record: &TimedRecord,
    ) -> Result<(f64, f64), ConversionError> {
        let distance = previous.position.distance_to(&record.position);

        if record.kind.is_switch() {
            return Ok((distance, self.on_off_time));
        }
        if distance == 0.0 {
            return Ok((0.0, 0.0));
        }
        if record.feed_rate <= 0.0 {
            return Err(ConversionError::NonPositiveFeedRate {
                line_number: record.line_number,
                feed_rate: record.feed_rate,
            });
        }

        let speed = record.feed_rate / SECONDS_PER_MINUTE;
        Ok((distance, distance / speed))
    }

    /// Trim to the first laser event and time the remaining records
    ///
    /// The record immediately preceding the first switch becomes the start of
    /// the series at `time = 0`.
    ///
    /// # Errors
    /// [`ConversionError::NoExtrusionTransition`] when the sequence holds no
    /// switch record.
    pub fn apply(&self, events: Vec<TimedRecord>) -> Result<Vec<TimedRecord>, ConversionError> {
        let first_switch = events
            .iter()
            .position(|event| event.kind.is_switch())
            .ok_or(ConversionError::NoExtrusionTransition)?;

        // A switch always follows the record it copies
        let start = first_switch.saturating_sub(1);

        let mut timed: Vec<TimedRecord> = events.into_iter().skip(start).collect();
        let mut time = 0.0;
        for i in 0..timed.len() {
            let (distance, dt) = if i == 0 {
                (0.0, 0.0)
            } else {
                self.duration(&timed[i - 1], &timed[i])?
            };
            time += dt;

            let record = &mut timed[i];
            record.distance = distance;
            record.dt = dt;
            record.time = time;
        }

        tracing::debug!(
            "Dropped {} setup records, timed {} records over {:.3}s",
            start,
            timed.len(),
            time
        );

        Ok(timed)
    }
}

impl Default for EventTimer {
    fn default() -> Self {
        Self::new()
    }
}
