//! The serializable conversion record.
//!
//! Field names and types are a stable contract with downstream renderers;
//! changing them breaks every consumer of the emitted JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One instruction unit of the extracted procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step number, unique within the record.
    pub step_number: u32,

    /// Instruction text. Empty when no description was found (warned, never
    /// silently dropped).
    pub description: String,

    /// Source page number (1-indexed).
    pub page: u32,

    /// Screenshots assigned to this step.
    #[serde(default)]
    pub images: Vec<StepImage>,

    /// Detection confidence in [0, 1].
    pub confidence: f64,

    /// Non-fatal oddities attached during extraction and correction.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Step {
    /// Create a step with no images or warnings.
    pub fn new(step_number: u32, description: impl Into<String>, page: u32, confidence: f64) -> Self {
        Self {
            step_number,
            description: description.into(),
            page,
            images: Vec::new(),
            confidence,
            warnings: Vec::new(),
        }
    }

    /// Append a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// A persisted screenshot referenced by a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepImage {
    /// File name, e.g. `step_3_page_2_img_1.png`.
    pub filename: String,

    /// Path relative to the renderer's working directory.
    pub path: String,

    /// Pixel width.
    pub width: u32,

    /// Pixel height.
    pub height: u32,
}

/// The finalized, serializable result of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRecord {
    /// Procedure title.
    pub title: String,

    /// Derived count; always equals `steps.len()`.
    pub total_steps: usize,

    /// Ordered steps.
    pub steps: Vec<Step>,
}

impl ConversionRecord {
    /// Build a record from a title and steps, deriving `total_steps`.
    pub fn new(title: impl Into<String>, steps: Vec<Step>) -> Self {
        let total_steps = steps.len();
        Self {
            title: title.into(),
            total_steps,
            steps,
        }
    }

    /// Total number of assigned images across all steps.
    pub fn total_images(&self) -> usize {
        self.steps.iter().map(|s| s.images.len()).sum()
    }

    /// Total number of step-level warnings.
    pub fn total_warnings(&self) -> usize {
        self.steps.iter().map(|s| s.warnings.len()).sum()
    }

    /// Mean step confidence, or 0.0 for an empty record.
    pub fn average_confidence(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.steps.iter().map(|s| s.confidence).sum::<f64>() / self.steps.len() as f64
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// Output contains no timestamps, so re-running the pipeline on the same
    /// input produces byte-identical JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }

    /// Parse a record back from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Render(format!("JSON deserialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ConversionRecord {
        let mut step1 = Step::new(1, "Navigate to Admin Console", 1, 0.9);
        step1.images.push(StepImage {
            filename: "step_1_page_1_img_1.png".into(),
            path: "out_images/step_1_page_1_img_1.png".into(),
            width: 600,
            height: 800,
        });
        let step2 = Step::new(2, "Click OK", 1, 0.9);
        ConversionRecord::new("Setup Call Forwarding", vec![step1, step2])
    }

    #[test]
    fn test_total_steps_derived() {
        let record = sample_record();
        assert_eq!(record.total_steps, record.steps.len());
        assert_eq!(record.total_images(), 1);
        assert_eq!(record.total_warnings(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let record = sample_record();
        let json = record.to_json().unwrap();
        let parsed = ConversionRecord::from_json(&json).unwrap();

        assert_eq!(parsed.total_steps, record.total_steps);
        assert_eq!(parsed.title, record.title);
        for (a, b) in parsed.steps.iter().zip(record.steps.iter()) {
            assert_eq!(a.step_number, b.step_number);
            assert_eq!(a.description, b.description);
            assert_eq!(a.images, b.images);
        }
    }

    #[test]
    fn test_json_is_deterministic() {
        let record = sample_record();
        assert_eq!(record.to_json().unwrap(), record.to_json().unwrap());
    }

    #[test]
    fn test_schema_field_names() {
        let json = sample_record().to_json().unwrap();
        for field in [
            "\"title\"",
            "\"total_steps\"",
            "\"steps\"",
            "\"step_number\"",
            "\"description\"",
            "\"page\"",
            "\"images\"",
            "\"filename\"",
            "\"path\"",
            "\"width\"",
            "\"height\"",
            "\"confidence\"",
            "\"warnings\"",
        ] {
            assert!(json.contains(field), "missing schema field {}", field);
        }
    }

    #[test]
    fn test_average_confidence_empty() {
        let record = ConversionRecord::new("Empty", Vec::new());
        assert_eq!(record.average_confidence(), 0.0);
    }
}
