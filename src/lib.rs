//! # stepdoc
//!
//! Extracts step-by-step procedures from PDF exports of screen-recording
//! documentation tools and emits a stable JSON record, per-step screenshot
//! PNGs, a validation report, and an optional styled HTML page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stepdoc::convert_file;
//!
//! fn main() -> stepdoc::Result<()> {
//!     let outcome = convert_file("procedure.pdf", "procedure_out")?;
//!     println!(
//!         "{}: {} steps, {} images",
//!         outcome.record.title,
//!         outcome.record.total_steps,
//!         outcome.record.total_images()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Conversion is a fixed three-stage pipeline over a loaded document:
//!
//! 1. **Segment** — detect step markers and pair them with descriptions,
//!    merging three independent strategies deterministically.
//! 2. **Associate** — filter decorative images and assign the survivors to
//!    the steps on their page, persisting them as PNGs.
//! 3. **Correct & validate** — apply document-family override rules from a
//!    data table, deduplicate, then compute a pure validation result.
//!
//! The emitted JSON contains no timestamps: converting the same input twice
//! produces byte-identical output.

pub mod detect;
pub mod error;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{ConversionRecord, Document, ImageEncoding, Page, PageImage, Step, StepImage};
pub use pipeline::{
    convert_file, ConversionLog, ConversionOutcome, Converter, ConvertOptions, CorrectionSet,
    DetectionMethod, ImageFilterConfig, LogEntry, LogLevel, Segmenter, StepCandidate,
    ValidationResult,
};
pub use render::BatchEntry;

/// Validate a finished record; pure function, no I/O.
pub use pipeline::validate::validate;
