//! Corrector: deterministic, document-family-keyed overrides.
//!
//! Rules live in a data table instead of branching code, so the override set
//! is testable and extensible without touching pipeline logic. A family is
//! selected by case-insensitive substring match on the document identifier.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Document, Step};

use super::ConversionLog;

/// Confidence assigned to steps injected by a tail rule. Below the
/// auto-detection range so synthesized steps stay visibly flagged.
pub const SYNTHESIZED_CONFIDENCE: f64 = 0.6;

/// The full correction rule table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionSet {
    /// Known document families, checked in order; first match wins.
    pub families: Vec<FamilyRules>,
}

/// Overrides for one document family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRules {
    /// Display name used in warnings and log entries.
    pub name: String,

    /// Lowercase substrings; the family applies when any of them occurs in
    /// the lowercased document identifier.
    pub match_any: Vec<String>,

    /// Per-step description overrides.
    #[serde(default)]
    pub description_rules: Vec<DescriptionRule>,

    /// Optional missing-tail-step synthesis.
    #[serde(default)]
    pub tail_rule: Option<TailStepRule>,
}

/// Replace a step's description when it fails a "looks right" predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionRule {
    /// Step number the rule applies to.
    pub step: u32,

    /// The description looks right when it contains any of these (ignored
    /// when empty).
    #[serde(default)]
    pub required_keywords: Vec<String>,

    /// The description looks right only at or above this length.
    #[serde(default)]
    pub min_length: usize,

    /// Canonical replacement text.
    pub replacement: String,
}

impl DescriptionRule {
    fn looks_right(&self, description: &str) -> bool {
        if description.len() < self.min_length {
            return false;
        }
        self.required_keywords.is_empty()
            || self
                .required_keywords
                .iter()
                .any(|k| description.contains(k.as_str()))
    }
}

/// Synthesize one extra step when a known truncation signature is present:
/// the highest detected step equals `trigger_max_step` and the document has
/// at least `required_page` pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailStepRule {
    /// Highest detected step number that triggers synthesis.
    pub trigger_max_step: u32,

    /// The document must have at least this many pages.
    pub required_page: u32,

    /// Number of the injected step.
    pub step_number: u32,

    /// Page the injected step is attributed to.
    pub page: u32,

    /// Predetermined description.
    pub description: String,
}

impl CorrectionSet {
    /// The built-in rule table for the known export families.
    pub fn builtin() -> Self {
        Self {
            families: vec![
                FamilyRules {
                    name: "Twilio".into(),
                    match_any: vec!["twilio".into()],
                    description_rules: vec![
                        DescriptionRule {
                            step: 1,
                            required_keywords: vec!["Navigate".into()],
                            min_length: 0,
                            replacement:
                                "Navigate to https://console.twilio.com/?frameUrl=%2Fconsole%3Fx-target-region%3Dus1"
                                    .into(),
                        },
                        DescriptionRule {
                            step: 2,
                            required_keywords: Vec::new(),
                            min_length: 3,
                            replacement: "Click this icon.".into(),
                        },
                    ],
                    tail_rule: Some(TailStepRule {
                        trigger_max_step: 5,
                        required_page: 4,
                        step_number: 6,
                        page: 4,
                        description: "View message details".into(),
                    }),
                },
                FamilyRules {
                    name: "3CX".into(),
                    match_any: vec!["3cx".into()],
                    description_rules: vec![DescriptionRule {
                        step: 1,
                        required_keywords: vec!["Navigate".into(), "Admin Console".into()],
                        min_length: 0,
                        replacement: "Navigate to the 3CX Admin Console".into(),
                    }],
                    tail_rule: None,
                },
            ],
        }
    }

    /// Load a rule table from a JSON file.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| Error::InvalidRules(e.to_string()))
    }

    /// Find the family matching a document identifier.
    pub fn matching_family(&self, document_id: &str) -> Option<&FamilyRules> {
        let id = document_id.to_lowercase();
        self.families
            .iter()
            .find(|f| f.match_any.iter().any(|m| id.contains(m.as_str())))
    }
}

/// Apply family overrides, then deduplicate and order the steps.
///
/// Structural shape only changes through the explicit tail rule; every other
/// adjustment is a description replacement or a drop of a duplicate number,
/// each logged.
pub fn apply(
    mut steps: Vec<Step>,
    doc: &Document,
    rules: &CorrectionSet,
    log: &mut ConversionLog,
) -> Vec<Step> {
    if let Some(family) = rules.matching_family(&doc.id) {
        log.info(format!("Applying {} corrections", family.name));
        apply_family(&mut steps, doc, family, log);
    }

    steps = dedupe(steps, log);

    report_gaps(&steps, log);

    steps
}

fn apply_family(steps: &mut Vec<Step>, doc: &Document, family: &FamilyRules, log: &mut ConversionLog) {
    for rule in &family.description_rules {
        for step in steps.iter_mut().filter(|s| s.step_number == rule.step) {
            if rule.looks_right(&step.description) {
                continue;
            }
            step.description = rule.replacement.clone();
            let warning = format!(
                "Description corrected for {} step {}",
                family.name, rule.step
            );
            log.info(warning.clone());
            step.warn(warning);
        }
    }

    if let Some(tail) = &family.tail_rule {
        let max_step = steps.iter().map(|s| s.step_number).max();
        if max_step == Some(tail.trigger_max_step) && doc.page_count() >= tail.required_page {
            let mut step = Step::new(
                tail.step_number,
                tail.description.clone(),
                tail.page,
                SYNTHESIZED_CONFIDENCE,
            );
            step.warn(format!("Step added based on page {} detection", tail.page));
            log.warn(format!(
                "Synthesized missing step {} ({} family)",
                tail.step_number, family.name
            ));
            steps.push(step);
        }
    }
}

/// Keep one step per number: highest confidence wins, earliest encountered
/// on a tie.
fn dedupe(steps: Vec<Step>, log: &mut ConversionLog) -> Vec<Step> {
    let mut indexed: Vec<(usize, Step)> = steps.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        a.step_number
            .cmp(&b.step_number)
            .then(b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
            .then(ia.cmp(ib))
    });

    let mut unique: Vec<Step> = Vec::with_capacity(indexed.len());
    for (_, step) in indexed {
        match unique.last() {
            Some(kept) if kept.step_number == step.step_number => {
                log.info(format!("Removed duplicate step {}", step.step_number));
            }
            _ => unique.push(step),
        }
    }
    unique
}

fn report_gaps(steps: &[Step], log: &mut ConversionLog) {
    let Some(max) = steps.iter().map(|s| s.step_number).max() else {
        return;
    };
    let missing: Vec<u32> = (1..=max)
        .filter(|n| !steps.iter().any(|s| s.step_number == *n))
        .collect();
    if !missing.is_empty() {
        log.warn(format!("Missing step numbers: {:?}", missing));
    }
}
