//! File reading and amplitude table export

pub mod export;
pub mod file_io;

pub use export::AmplitudeTableWriter;
pub use file_io::GcodeFileReader;
