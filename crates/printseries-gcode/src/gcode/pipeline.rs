//! Conversion pipeline
//!
//! Runs the conversion stages in order over the whole program. Each
//! stage consumes the complete output of the previous one; a failure in any
//! stage aborts the run.

use serde::{Deserialize, Serialize};

use printseries_core::{
    ConversionError, EventRow, LaserState, MotionRecord, RecordKind, TimedRecord, TokenizedLine,
};
use printseries_settings::ConverterConfig;

use super::events::EventSynthesizer;
use super::reconstruct::StateReconstructor;
use super::timing::EventTimer;
use super::tokenizer::LineTokenizer;
use super::trimmer::{StartupTrimmer, TrimmedProgram};

/// A step of the conversion
///
/// Stages are applied in a fixed order; each consumes the full output of the
/// previous stage.
pub trait Stage {
    /// What the stage consumes
    type Input;
    /// What the stage produces
    type Output;

    /// Get the name/identifier of this stage
    fn name(&self) -> &str;

    /// Get a description of what this stage does
    fn description(&self) -> &str;

    /// Run the stage over the whole sequence
    fn run(&self, input: Self::Input) -> Result<Self::Output, ConversionError>;
}

impl Stage for LineTokenizer {
    type Input = String;
    type Output = Vec<TokenizedLine>;

    fn name(&self) -> &str {
        "tokenizer"
    }

    fn description(&self) -> &str {
        "Extracts feed rate, position and extrusion fields from each line"
    }

    fn run(&self, input: String) -> Result<Self::Output, ConversionError> {
        Ok(self.tokenize(&input))
    }
}

impl Stage for StartupTrimmer {
    type Input = Vec<TokenizedLine>;
    type Output = TrimmedProgram;

    fn name(&self) -> &str {
        "startup_trimmer"
    }

    fn description(&self) -> &str {
        "Discards the preamble before the first layer and parses field values"
    }

    fn run(&self, input: Self::Input) -> Result<Self::Output, ConversionError> {
        self.trim(input)
    }
}

impl Stage for StateReconstructor {
    type Input = TrimmedProgram;
    type Output = Vec<MotionRecord>;

    fn name(&self) -> &str {
        "state_reconstructor"
    }

    fn description(&self) -> &str {
        "Fills omitted feed rate, position and extrusion from neighbouring lines"
    }

    fn run(&self, input: Self::Input) -> Result<Self::Output, ConversionError> {
        self.reconstruct(input)
    }
}

impl Stage for EventSynthesizer {
    type Input = Vec<MotionRecord>;
    type Output = Vec<TimedRecord>;

    fn name(&self) -> &str {
        "event_synthesizer"
    }

    fn description(&self) -> &str {
        "Inserts laser switch records where extrusion starts or stops"
    }

    fn run(&self, input: Self::Input) -> Result<Self::Output, ConversionError> {
        Ok(self.synthesize(&input))
    }
}

impl Stage for EventTimer {
    type Input = Vec<TimedRecord>;
    type Output = Vec<TimedRecord>;

    fn name(&self) -> &str {
        "event_timer"
    }

    fn description(&self) -> &str {
        "Trims setup moves and integrates time from distance and feed rate"
    }

    fn run(&self, input: Self::Input) -> Result<Self::Output, ConversionError> {
        self.apply(input)
    }
}

/// Run one stage, logging failures with the stage name
fn run_stage<S: Stage>(stage: &S, input: S::Input) -> Result<S::Output, ConversionError> {
    let _span = tracing::debug_span!("stage", name = stage.name()).entered();
    stage.run(input).map_err(|e| {
        tracing::warn!("Stage '{}' failed: {}", stage.name(), e);
        e
    })
}

/// Statistics of a finished conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Lines in the source program
    pub input_lines: usize,
    /// Preamble lines dropped before the layer marker
    pub preamble_lines: usize,
    /// Records with complete motion state
    pub motion_records: usize,
    /// Setup records dropped before the first laser event
    pub setup_records: usize,
    /// Switch-on records in the series
    pub switch_on_events: usize,
    /// Switch-off records in the series
    pub switch_off_events: usize,
    /// Rows in the exported table
    pub output_rows: usize,
    /// Absolute time of the last row, in seconds
    pub total_time: f64,
    /// Time spent with the laser on, in seconds
    pub laser_on_time: f64,
    /// Distance covered while depositing
    pub extrusion_distance: f64,
    /// Distance covered while travelling
    pub travel_distance: f64,
}

impl ConversionSummary {
    fn collect(records: &[TimedRecord]) -> Self {
        let mut summary = Self {
            output_rows: records.len(),
            total_time: records.last().map_or(0.0, |r| r.time),
            ..Default::default()
        };

        for record in records {
            match record.kind {
                RecordKind::SwitchOn => summary.switch_on_events += 1,
                RecordKind::SwitchOff => summary.switch_off_events += 1,
                RecordKind::Motion => {}
            }
            match record.laser {
                LaserState::On => {
                    summary.laser_on_time += record.dt;
                    summary.extrusion_distance += record.distance;
                }
                LaserState::Off => summary.travel_distance += record.distance,
            }
        }

        summary
    }

    /// Share of the print time with the laser on
    pub fn laser_duty_cycle(&self) -> f64 {
        if self.total_time > 0.0 {
            self.laser_on_time / self.total_time
        } else {
            0.0
        }
    }
}

/// The time-stamped event series of a program
#[derive(Debug, Clone, PartialEq)]
pub struct EventSeries {
    records: Vec<TimedRecord>,
    summary: ConversionSummary,
}

impl EventSeries {
    /// Timed records, in time order
    pub fn records(&self) -> &[TimedRecord] {
        &self.records
    }

    /// Rows of the amplitude table
    pub fn rows(&self) -> Vec<EventRow> {
        self.records.iter().map(EventRow::from).collect()
    }

    /// Conversion statistics
    pub fn summary(&self) -> &ConversionSummary {
        &self.summary
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Converts a G-code program into an event series
///
/// # Example
/// ```ignore
/// let pipeline = ConversionPipeline::new();
/// let series = pipeline.convert(&program)?;
/// AmplitudeTableWriter::new().write_to_file(&series.rows(), &output)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversionPipeline {
    tokenizer: LineTokenizer,
    trimmer: StartupTrimmer,
    reconstructor: StateReconstructor,
    synthesizer: EventSynthesizer,
    timer: EventTimer,
}

impl ConversionPipeline {
    /// Create a pipeline with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from a converter configuration
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            trimmer: StartupTrimmer::new()
                .with_marker(config.parsing.layer_marker.clone())
                .with_decimal_places(config.parsing.decimal_places),
            timer: EventTimer::new().with_on_off_time(config.timing.on_off_time),
            ..Self::default()
        }
    }

    /// Names and descriptions of the stages, in execution order
    pub fn list_stages(&self) -> Vec<(&str, &str)> {
        vec![
            (self.tokenizer.name(), self.tokenizer.description()),
            (self.trimmer.name(), self.trimmer.description()),
            (self.reconstructor.name(), self.reconstructor.description()),
            (self.synthesizer.name(), self.synthesizer.description()),
            (self.timer.name(), self.timer.description()),
        ]
    }

    /// Convert a whole program
    ///
    /// # Errors
    /// Any [`ConversionError`] raised by a stage.
    pub fn convert(&self, program: &str) -> Result<EventSeries, ConversionError> {
        let lines = run_stage(&self.tokenizer, program.to_string())?;
        let input_lines = lines.len();

        let trimmed = run_stage(&self.trimmer, lines)?;
        let preamble_lines = trimmed.discarded;

        let motion = run_stage(&self.reconstructor, trimmed)?;
        let motion_records = motion.len();

        let events = run_stage(&self.synthesizer, motion)?;
        let event_count = events.len();

        let records = run_stage(&self.timer, events)?;
        if records.is_empty() {
            return Err(ConversionError::empty("event timing"));
        }

        let summary = ConversionSummary {
            input_lines,
            preamble_lines,
            motion_records,
            setup_records: event_count - records.len(),
            ..ConversionSummary::collect(&records)
        };

        tracing::info!(
            "Converted {} lines into {} events ({} on / {} off) spanning {:.3}s",
            summary.input_lines,
            summary.output_rows,
            summary.switch_on_events,
            summary.switch_off_events,
            summary.total_time
        );

        Ok(EventSeries { records, summary })
    }
}
