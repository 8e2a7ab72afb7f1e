//! Plain-text validation report.
//!
//! One file per conversion, keyed to the output name. Carries everything a
//! reviewer needs: status, errors, warnings, suggestions, the step table,
//! and the conversion log. This is the only timestamped artifact.

use crate::model::ConversionRecord;
use crate::pipeline::{LogEntry, ValidationResult};

/// Render the report for one conversion.
pub fn render(
    input: &str,
    record: &ConversionRecord,
    validation: &ValidationResult,
    log: &[LogEntry],
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    out.push_str(&rule);
    out.push_str("\nConversion Report\n");
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("File:   {}\n", input));
    out.push_str(&format!("Title:  {}\n", record.title));
    out.push_str(&format!(
        "Status: {}\n",
        if validation.is_valid { "VALID" } else { "INVALID" }
    ));
    out.push('\n');

    push_section(&mut out, "Errors", &validation.errors);
    push_section(&mut out, "Warnings", &validation.warnings);
    push_section(&mut out, "Suggestions", &validation.suggestions);

    out.push_str(&format!("Extracted Steps ({})\n", record.total_steps));
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for step in &record.steps {
        out.push_str(&format!(
            "  {:>2}. {}  [{} images, confidence {:.2}]\n",
            step.step_number,
            if step.description.is_empty() {
                "(no description)"
            } else {
                &step.description
            },
            step.images.len(),
            step.confidence
        ));
        for warning in &step.warnings {
            out.push_str(&format!("      ! {}\n", warning));
        }
    }
    out.push('\n');

    out.push_str("Conversion Log\n");
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for entry in log {
        out.push_str(&format!(
            "  [{}] {} ({})\n",
            entry.level,
            entry.message,
            entry.time.to_rfc3339()
        ));
    }

    out
}

fn push_section(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{}\n", heading));
    out.push_str(&"-".repeat(60));
    out.push('\n');
    for item in items {
        out.push_str(&format!("  - {}\n", item));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;
    use crate::pipeline::validate::validate;

    #[test]
    fn test_report_contains_sections() {
        let mut step = Step::new(1, "Navigate to the console", 1, 0.9);
        step.warn("Description corrected for Twilio step 1");
        let record = ConversionRecord::new("Setup Forwarding", vec![step]);
        let validation = validate(&record);

        let report = render("input.pdf", &record, &validation, &[]);
        assert!(report.contains("File:   input.pdf"));
        assert!(report.contains("Status: VALID"));
        assert!(report.contains("Extracted Steps (1)"));
        assert!(report.contains("Navigate to the console"));
        assert!(report.contains("! Description corrected for Twilio step 1"));
        // Steps without images yield warnings, so suggestions appear.
        assert!(report.contains("Review warnings and manually verify the conversion."));
    }

    #[test]
    fn test_invalid_report_status() {
        let record = ConversionRecord::new("", Vec::new());
        let validation = validate(&record);
        let report = render("broken.pdf", &record, &validation, &[]);
        assert!(report.contains("Status: INVALID"));
        assert!(report.contains("- No steps found"));
    }
}
