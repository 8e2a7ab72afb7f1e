//! Data model for procedure extraction.
//!
//! Split into the source side (what the loader produced from the PDF) and
//! the output side (the step record the pipeline builds and serializes).
//! Source types are immutable after load; the record is built once per
//! document and never mutated after serialization.

mod document;
mod record;

pub use document::{Document, ImageEncoding, Page, PageImage};
pub use record::{ConversionRecord, Step, StepImage};
