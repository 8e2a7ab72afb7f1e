//! The conversion pipeline: segment, associate, correct, validate.
//!
//! Stages run sequentially per document and communicate only through their
//! inputs and outputs plus an explicit [`ConversionLog`] context — no shared
//! mutable state. The orchestrator owns all file writes; stages below it
//! touch the filesystem only where their contract says so (image
//! persistence in the associator).

pub mod assoc;
pub mod correct;
pub mod segment;
pub mod validate;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader;
use crate::model::ConversionRecord;
use crate::render;

pub use assoc::ImageFilterConfig;
pub use correct::{CorrectionSet, DescriptionRule, FamilyRules, TailStepRule};
pub use segment::{DetectionMethod, Segmenter, StepCandidate};
pub use validate::ValidationResult;

/// Severity of a conversion log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One timestamped log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub time: DateTime<Utc>,
}

/// Explicit log context threaded through the pipeline stages.
///
/// Entries end up in the validation report. Timestamps make the report the
/// only non-deterministic artifact; the JSON record never carries them.
#[derive(Debug, Default)]
pub struct ConversionLog {
    entries: Vec<LogEntry>,
}

impl ConversionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    fn push(&mut self, level: LogLevel, message: String) {
        match level {
            LogLevel::Info => log::info!("{}", message),
            LogLevel::Warning => log::warn!("{}", message),
            LogLevel::Error => log::error!("{}", message),
        }
        self.entries.push(LogEntry {
            level,
            message,
            time: Utc::now(),
        });
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Decorative-image filter settings.
    pub filter: ImageFilterConfig,

    /// Document-family correction rules.
    pub corrections: CorrectionSet,

    /// Whether to render the HTML step page.
    pub write_html: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the image filter settings.
    pub fn with_filter(mut self, filter: ImageFilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the correction rule table.
    pub fn with_corrections(mut self, corrections: CorrectionSet) -> Self {
        self.corrections = corrections;
        self
    }

    /// Enable or disable HTML output.
    pub fn with_html(mut self, write_html: bool) -> Self {
        self.write_html = write_html;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            filter: ImageFilterConfig::default(),
            corrections: CorrectionSet::builtin(),
            write_html: true,
        }
    }
}

/// Result of converting one document.
#[derive(Debug)]
pub struct ConversionOutcome {
    /// The finalized record, as serialized to JSON.
    pub record: ConversionRecord,

    /// Validation of the record.
    pub validation: ValidationResult,

    /// The full conversion log.
    pub log: Vec<LogEntry>,

    /// Path of the written JSON file.
    pub json_path: PathBuf,

    /// Path of the written report.
    pub report_path: PathBuf,

    /// Path of the written HTML page, if enabled.
    pub html_path: Option<PathBuf>,
}

/// One document's conversion: input path, output name, options.
///
/// ```no_run
/// use stepdoc::Converter;
///
/// let outcome = Converter::new("guide.pdf", "guide_out").convert()?;
/// println!("{} steps", outcome.record.total_steps);
/// # Ok::<(), stepdoc::Error>(())
/// ```
pub struct Converter {
    input: PathBuf,
    output_name: String,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter for one document.
    pub fn new(input: impl Into<PathBuf>, output_name: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output_name: output_name.into(),
            options: ConvertOptions::default(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Disable HTML output.
    pub fn without_html(mut self) -> Self {
        self.options.write_html = false;
        self
    }

    /// Directory the step screenshots are written to.
    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}_images", self.output_name))
    }

    /// Run the pipeline and write all outputs.
    ///
    /// Fatal input errors (missing/corrupt document) abort before anything
    /// is written. Extraction gaps degrade to warnings on the record.
    pub fn convert(&self) -> Result<ConversionOutcome> {
        let mut log = ConversionLog::new();
        log.info(format!("Starting conversion of {}", self.input.display()));

        let doc = loader::load(&self.input)?;

        log.info("Extracting steps...");
        let segments = Segmenter::new().extract(&doc, &mut log);
        let mut steps = segments.steps;

        log.info("Extracting images for steps...");
        let images_dir = self.images_dir();
        assoc::attach_images(&doc, &mut steps, &images_dir, &self.options.filter, &mut log)?;

        log.info("Applying corrections...");
        let steps = correct::apply(steps, &doc, &self.options.corrections, &mut log);

        let record = ConversionRecord::new(segments.title, steps);

        log.info("Validating conversion...");
        let validation = validate::validate(&record);
        if validation.is_valid {
            log.info("Validation passed");
        } else {
            log.error(format!(
                "Validation failed with {} errors",
                validation.errors.len()
            ));
        }

        let json_path = PathBuf::from(format!("{}.json", self.output_name));
        fs::write(&json_path, record.to_json()?)?;
        log.info(format!("Saved JSON to {}", json_path.display()));

        let report_path = PathBuf::from(format!("{}_report.txt", self.output_name));
        let report = render::report::render(
            &self.input.display().to_string(),
            &record,
            &validation,
            log.entries(),
        );
        fs::write(&report_path, report)?;
        log.info(format!("Generated report: {}", report_path.display()));

        let html_path = if self.options.write_html {
            let path = PathBuf::from(format!("{}.html", self.output_name));
            fs::write(&path, render::html::render_record(&record))?;
            log.info(format!("Generated HTML: {}", path.display()));
            Some(path)
        } else {
            None
        };

        Ok(ConversionOutcome {
            record,
            validation,
            log: log.entries().to_vec(),
            json_path,
            report_path,
            html_path,
        })
    }
}

/// Convert one document with default options.
pub fn convert_file<P: AsRef<Path>>(input: P, output_name: &str) -> Result<ConversionOutcome> {
    Converter::new(input.as_ref(), output_name).convert()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_levels() {
        let mut log = ConversionLog::new();
        log.info("starting");
        log.warn("odd input");
        log.error("broken");

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[2].level, LogLevel::Error);
        assert_eq!(entries[2].message, "broken");
    }

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new().with_html(false);
        assert!(!options.write_html);
        assert_eq!(options.filter.min_dimension, 100);
        assert_eq!(options.corrections.families.len(), 2);
    }

    #[test]
    fn test_converter_paths() {
        let converter = Converter::new("in.pdf", "out/result");
        assert_eq!(converter.images_dir(), PathBuf::from("out/result_images"));
    }

    #[test]
    fn test_convert_missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output_name = dir.path().join("out").to_string_lossy().to_string();

        let err = Converter::new("no/such/file.pdf", &output_name)
            .convert()
            .unwrap_err();
        assert!(err.is_fatal_input());
        assert!(!PathBuf::from(format!("{}.json", output_name)).exists());
    }
}
