//! # PrintSeries G-code
//!
//! Conversion of slicer G-code into a time-stamped laser event series.
//! Includes the line tokenizer, the conversion stages, the pipeline that
//! runs them, and file reading and amplitude table export.

pub mod gcode;
pub mod utils;

pub use gcode::{
    backward_fill, forward_fill, ConversionPipeline, ConversionSummary, EventSeries,
    EventSynthesizer, EventTimer, ExtrusionPhase, LineTokenizer, Stage, StartupTrimmer,
    StateReconstructor, TrimmedProgram,
};

pub use utils::{AmplitudeTableWriter, GcodeFileReader};
