//! G-code to event series conversion
//!
//! This module provides:
//! - Line tokenizing (field extraction by pattern)
//! - Startup trimming (preamble removal, numeric parsing)
//! - State reconstruction (implicit field carry-over)
//! - Laser switch event synthesis
//! - Event timing and the conversion pipeline

pub mod events;
pub mod pipeline;
pub mod reconstruct;
pub mod timing;
pub mod tokenizer;
pub mod trimmer;

pub use events::*;
pub use pipeline::*;
pub use reconstruct::*;
pub use timing::*;
pub use tokenizer::*;
pub use trimmer::*;
