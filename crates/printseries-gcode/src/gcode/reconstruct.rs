//! State reconstructor
//!
//! G-code omits any field that did not change since the previous line. This
//! stage restores the full machine state on every record: feed rate and
//! position carry forward, extrusion defaults to zero, and the change in
//! extrusion is derived from consecutive records.

use printseries_core::{ConversionError, MotionRecord, ParsedRecord, Position3};

use super::trimmer::TrimmedProgram;

/// Fill every unset value with the nearest preceding set value
pub fn forward_fill<T: Copy>(values: &mut [Option<T>]) {
    let mut last = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
}

/// Fill every unset value with the nearest following set value
pub fn backward_fill<T: Copy>(values: &mut [Option<T>]) {
    let mut next = None;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}

/// Restores implicit machine state across records
#[derive(Debug, Clone, Default)]
pub struct StateReconstructor;

impl StateReconstructor {
    /// Create a new reconstructor
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct complete motion records
    ///
    /// # Errors
    /// [`ConversionError::MissingFeedRate`] when neither the retained records
    /// nor the preamble declare a feed rate, [`ConversionError::EmptyInput`]
    /// when no record carries position or extrusion.
    pub fn reconstruct(
        &self,
        program: TrimmedProgram,
    ) -> Result<Vec<MotionRecord>, ConversionError> {
        let TrimmedProgram {
            records,
            inherited_feed_rate,
            ..
        } = program;

        let feed_rates = Self::fill_feed_rates(&records, inherited_feed_rate)?;

        let mut position = Position3::ORIGIN;
        let mut previous_extrusion: Option<f64> = None;
        let mut motion = Vec::with_capacity(records.len());

        for (record, feed_rate) in records.iter().zip(feed_rates) {
            if !record.has_motion() {
                continue;
            }

            position = Position3::new(
                record.x.unwrap_or(position.x),
                record.y.unwrap_or(position.y),
                record.z.unwrap_or(position.z),
            );
            let extrusion = record.extrusion.unwrap_or(0.0);
            let delta_extrusion = previous_extrusion.map_or(0.0, |prev| extrusion - prev);
            previous_extrusion = Some(extrusion);

            motion.push(MotionRecord {
                line_number: record.line_number,
                feed_rate,
                position,
                extrusion,
                delta_extrusion,
            });
        }

        if motion.is_empty() {
            return Err(ConversionError::empty("state reconstruction"));
        }

        tracing::debug!(
            "Reconstructed {} motion records from {} retained lines",
            motion.len(),
            records.len()
        );

        Ok(motion)
    }

    /// Feed rate of every record, forward then backward filled
    ///
    /// Falls back to the preamble feed rate only when the retained records
    /// declare none at all.
    fn fill_feed_rates(
        records: &[ParsedRecord],
        inherited: Option<f64>,
    ) -> Result<Vec<f64>, ConversionError> {
        let mut feeds: Vec<Option<f64>> = records.iter().map(|r| r.feed_rate).collect();
        forward_fill(&mut feeds);
        backward_fill(&mut feeds);

        feeds
            .into_iter()
            .map(|feed| feed.or(inherited).ok_or(ConversionError::MissingFeedRate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line_number: usize) -> ParsedRecord {
        ParsedRecord {
            line_number,
            ..Default::default()
        }
    }

    fn program(records: Vec<ParsedRecord>, inherited: Option<f64>) -> TrimmedProgram {
        TrimmedProgram {
            records,
            inherited_feed_rate: inherited,
            marker_line: 1,
            discarded: 0,
        }
    }

    fn home(line_number: usize) -> ParsedRecord {
        ParsedRecord {
            x: Some(0.0),
            y: Some(0.0),
            z: Some(0.0),
            ..record(line_number)
        }
    }

    #[test]
    fn test_forward_fill() {
        let mut values = vec![None, Some(1), None, None, Some(4), None];
        forward_fill(&mut values);
        assert_eq!(values, vec![None, Some(1), Some(1), Some(1), Some(4), Some(4)]);
    }

    #[test]
    fn test_backward_fill() {
        let mut values = vec![None, None, Some(3), None, Some(5), None];
        backward_fill(&mut values);
        assert_eq!(values, vec![Some(3), Some(3), Some(3), Some(5), Some(5), None]);
    }

    #[test]
    fn test_feed_rate_back_filled_to_leading_lines() {
        let records = vec![
            home(1),
            ParsedRecord {
                x: Some(5.0),
                ..record(2)
            },
            ParsedRecord {
                feed_rate: Some(1800.0),
                x: Some(10.0),
                ..record(3)
            },
            ParsedRecord {
                y: Some(2.0),
                ..record(4)
            },
        ];

        let motion = StateReconstructor::new()
            .reconstruct(program(records, Some(600.0)))
            .unwrap();
        assert!(motion.iter().all(|m| m.feed_rate == 1800.0));
    }

    #[test]
    fn test_inherited_feed_rate_used_when_none_declared() {
        let records = vec![
            home(1),
            ParsedRecord {
                x: Some(5.0),
                ..record(2)
            },
        ];
        let motion = StateReconstructor::new()
            .reconstruct(program(records, Some(1200.0)))
            .unwrap();
        assert_eq!(motion[1].feed_rate, 1200.0);
    }

    #[test]
    fn test_missing_feed_rate() {
        let err = StateReconstructor::new()
            .reconstruct(program(vec![home(1)], None))
            .unwrap_err();
        assert_eq!(err, ConversionError::MissingFeedRate);
    }

    #[test]
    fn test_position_forward_filled() {
        let records = vec![
            ParsedRecord {
                feed_rate: Some(1200.0),
                ..home(1)
            },
            ParsedRecord {
                x: Some(5.0),
                ..record(2)
            },
            ParsedRecord {
                z: Some(0.3),
                ..record(3)
            },
        ];
        let motion = StateReconstructor::new()
            .reconstruct(program(records, None))
            .unwrap();
        assert_eq!(motion[2].position, Position3::new(5.0, 0.0, 0.3));
    }

    #[test]
    fn test_feed_only_records_dropped() {
        let records = vec![
            home(1),
            ParsedRecord {
                feed_rate: Some(900.0),
                ..record(2)
            },
            ParsedRecord {
                x: Some(1.0),
                ..record(3)
            },
        ];
        let motion = StateReconstructor::new()
            .reconstruct(program(records, None))
            .unwrap();
        assert_eq!(motion.len(), 2);
        assert_eq!(motion[1].line_number, 3);
        assert_eq!(motion[0].feed_rate, 900.0);
    }

    #[test]
    fn test_delta_extrusion() {
        let records = vec![
            ParsedRecord {
                feed_rate: Some(1200.0),
                ..home(1)
            },
            ParsedRecord {
                x: Some(1.0),
                extrusion: Some(0.5),
                ..record(2)
            },
            ParsedRecord {
                x: Some(2.0),
                extrusion: Some(1.25),
                ..record(3)
            },
            ParsedRecord {
                x: Some(3.0),
                ..record(4)
            },
        ];
        let motion = StateReconstructor::new()
            .reconstruct(program(records, None))
            .unwrap();

        let deltas: Vec<f64> = motion.iter().map(|m| m.delta_extrusion).collect();
        assert_eq!(deltas, vec![0.0, 0.5, 0.75, -1.25]);
        assert_eq!(motion[3].extrusion, 0.0);
    }
}
