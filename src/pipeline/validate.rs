//! Validation of a finished conversion record.
//!
//! Pure function over the record: no I/O, no mutation. Errors make the
//! record unusable; warnings are oddities worth review; suggestions are
//! follow-up hints derived from the other two.

use serde::{Deserialize, Serialize};

use crate::model::ConversionRecord;

/// Step confidence below which a warning is raised.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Outcome of validating a [`ConversionRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no errors were found.
    pub is_valid: bool,
    /// Conditions that make the record unusable.
    pub errors: Vec<String>,
    /// Non-fatal oddities.
    pub warnings: Vec<String>,
    /// Follow-up hints.
    pub suggestions: Vec<String>,
}

/// Validate a finished record.
pub fn validate(record: &ConversionRecord) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    if record.title.is_empty() {
        errors.push("No title found".to_string());
    } else if record.title.len() < 5 {
        warnings.push("Title seems too short".to_string());
    }

    if record.steps.is_empty() {
        errors.push("No steps found".to_string());
    } else {
        let step_numbers: Vec<u32> = record.steps.iter().map(|s| s.step_number).collect();
        let expected: Vec<u32> = (1..=record.steps.len() as u32).collect();
        if step_numbers != expected {
            warnings.push(format!(
                "Step numbers are not sequential: {:?}",
                step_numbers
            ));
        }

        for step in &record.steps {
            if step.description.is_empty() {
                errors.push(format!("Step {} has no description", step.step_number));
            } else if step.description.len() < 3 {
                warnings.push(format!(
                    "Step {} description is very short",
                    step.step_number
                ));
            }

            if step.images.is_empty() {
                warnings.push(format!("Step {} has no images", step.step_number));
            }

            if step.confidence < LOW_CONFIDENCE_THRESHOLD {
                warnings.push(format!(
                    "Step {} has low confidence ({:.2})",
                    step.step_number, step.confidence
                ));
            }
        }
    }

    if record.steps.len() < 3 {
        suggestions.push("Very few steps detected. Check if PDF is complete.".to_string());
    }
    if !warnings.is_empty() {
        suggestions.push("Review warnings and manually verify the conversion.".to_string());
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Step, StepImage};

    fn image() -> StepImage {
        StepImage {
            filename: "step_1_page_1_img_1.png".into(),
            path: "out_images/step_1_page_1_img_1.png".into(),
            width: 600,
            height: 800,
        }
    }

    #[test]
    fn test_clean_record_is_valid() {
        let steps: Vec<Step> = (1..=3)
            .map(|n| {
                let mut s = Step::new(n, "Navigate to the console page", 1, 0.9);
                s.images.push(image());
                s
            })
            .collect();
        let record = ConversionRecord::new("Setup Forwarding", steps);

        let result = validate(&record);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_empty_record_errors() {
        let record = ConversionRecord::new("", Vec::new());
        let result = validate(&record);

        assert!(!result.is_valid);
        assert!(result.errors.contains(&"No title found".to_string()));
        assert!(result.errors.contains(&"No steps found".to_string()));
        assert!(result
            .suggestions
            .contains(&"Very few steps detected. Check if PDF is complete.".to_string()));
    }

    #[test]
    fn test_missing_description_is_error() {
        let record = ConversionRecord::new(
            "Setup Forwarding",
            vec![Step::new(1, "", 1, 0.9)],
        );
        let result = validate(&record);
        assert!(!result.is_valid);
        assert!(result
            .errors
            .contains(&"Step 1 has no description".to_string()));
    }

    #[test]
    fn test_gap_and_low_confidence_warn() {
        let mut s1 = Step::new(1, "Open the settings menu", 1, 0.9);
        s1.images.push(image());
        let mut s3 = Step::new(3, "Close the settings menu", 2, 0.6);
        s3.images.push(image());
        let record = ConversionRecord::new("Setup Forwarding", vec![s1, s3]);

        let result = validate(&record);
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Step numbers are not sequential")));
        assert!(result
            .warnings
            .contains(&"Step 3 has low confidence (0.60)".to_string()));
        assert!(result
            .suggestions
            .contains(&"Review warnings and manually verify the conversion.".to_string()));
    }

    #[test]
    fn test_missing_images_warn() {
        let steps: Vec<Step> = (1..=3)
            .map(|n| Step::new(n, "Click through the wizard", 1, 0.9))
            .collect();
        let record = ConversionRecord::new("Setup Forwarding", steps);

        let result = validate(&record);
        assert!(result.is_valid);
        assert_eq!(
            result
                .warnings
                .iter()
                .filter(|w| w.ends_with("has no images"))
                .count(),
            3
        );
    }
}
