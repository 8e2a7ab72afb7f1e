//! Text Segmenter: finds step markers and their descriptions.
//!
//! Three detection strategies run independently over the page lines and are
//! reconciled by a deterministic merge. A strategy never sees another
//! strategy's output; all cross-strategy policy lives in [`merge_candidates`].

use regex::Regex;

use crate::model::{Document, Step};

use super::ConversionLog;

/// Highest line value accepted as a step marker. Excludes page numbers and
/// unrelated digits elsewhere in the document.
pub const MAX_STEP_NUMBER: u32 = 20;

/// How many lines past a marker to search for its description.
pub const DESCRIPTION_WINDOW: usize = 10;

/// Minimum length of a usable description.
pub const MIN_DESCRIPTION_LEN: usize = 3;

/// Boilerplate footer prefix emitted by the exporting tool.
const BOILERPLATE_PREFIX: &str = "Made with";

/// Leading verbs that mark instruction lines for the action-verb strategy.
const ACTION_VERBS: &[&str] = &[
    "Click", "Navigate", "Select", "Choose", "Enter", "Type", "Open", "Close", "View", "Download",
    "Upload", "Save",
];

/// Title keywords scanned for on the first page.
const TITLE_KEYWORDS: &[&str] = &["Setup", "View", "Create", "Configure", "Install"];

/// How a candidate was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// A line that is solely a small integer, paired with a following line.
    NumberPattern,
    /// An inline `N. description` / `N) description` span.
    LayoutSpan,
    /// A line starting with a known action verb.
    ActionVerb,
    /// Injected by a document-family correction rule.
    Synthesized,
}

impl DetectionMethod {
    /// Precedence used only as the final merge tie-break.
    fn rank(self) -> u8 {
        match self {
            DetectionMethod::NumberPattern => 3,
            DetectionMethod::LayoutSpan => 2,
            DetectionMethod::ActionVerb => 1,
            DetectionMethod::Synthesized => 0,
        }
    }
}

/// A tentative step detection, consumed by merging.
#[derive(Debug, Clone)]
pub struct StepCandidate {
    /// Claimed step number.
    pub number: u32,
    /// Description text, if a usable line was found.
    pub description: Option<String>,
    /// Source page (1-indexed).
    pub page: u32,
    /// Which strategy produced this candidate.
    pub method: DetectionMethod,
    /// Heuristic confidence in [0, 1].
    pub confidence: f64,
}

/// Segmenter output: the document title plus merged steps.
#[derive(Debug)]
pub struct Segments {
    /// Extracted procedure title.
    pub title: String,
    /// Merged steps ordered by step number, images not yet attached.
    pub steps: Vec<Step>,
}

/// Line scanner with the marker patterns compiled once.
pub struct Segmenter {
    bare_number: Regex,
    inline_span: Regex,
    trailing_digits: Regex,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            bare_number: Regex::new(r"^[1-9]\d?$").unwrap(),
            inline_span: Regex::new(r"^(\d{1,2})[.)]\s+(.+)$").unwrap(),
            trailing_digits: Regex::new(r"\s+\d+$").unwrap(),
        }
    }

    /// Run all strategies over the document and merge the results.
    ///
    /// A document without any step markers yields an empty step list; the
    /// validator reports it, this stage does not fail.
    pub fn extract(&self, doc: &Document, log: &mut ConversionLog) -> Segments {
        let mut candidates = self.scan_number_pattern(doc);
        candidates.extend(self.scan_action_verbs(doc));
        candidates.extend(self.scan_layout_spans(doc));

        log.info(format!(
            "Collected {} step candidates across {} pages",
            candidates.len(),
            doc.page_count()
        ));

        let steps = merge_candidates(candidates, log);
        let title = self.extract_title(doc);

        log.info(format!(
            "Segmented {} steps, title: {}",
            steps.len(),
            title
        ));

        Segments { title, steps }
    }

    /// Strategy 1: standalone small-integer lines paired with the nearest
    /// following non-trivial line.
    fn scan_number_pattern(&self, doc: &Document) -> Vec<StepCandidate> {
        let mut candidates = Vec::new();

        for page in &doc.pages {
            let mut seen_on_page: Vec<u32> = Vec::new();

            for (i, line) in page.lines.iter().enumerate() {
                if !self.bare_number.is_match(line) {
                    continue;
                }
                let number: u32 = match line.parse() {
                    Ok(n) => n,
                    Err(_) => continue,
                };
                if number > MAX_STEP_NUMBER || seen_on_page.contains(&number) {
                    continue;
                }
                seen_on_page.push(number);

                candidates.push(StepCandidate {
                    number,
                    description: self.find_description(&page.lines, i),
                    page: page.number,
                    method: DetectionMethod::NumberPattern,
                    confidence: 0.9,
                });
            }
        }

        candidates
    }

    /// Strategy 2: lines that open with a known action verb. The step number
    /// comes from a bare-number line immediately above when present, else a
    /// running counter.
    fn scan_action_verbs(&self, doc: &Document) -> Vec<StepCandidate> {
        let mut candidates = Vec::new();
        let mut counter = 0u32;

        for page in &doc.pages {
            for (i, line) in page.lines.iter().enumerate() {
                if !ACTION_VERBS
                    .iter()
                    .any(|v| line.starts_with(v) && line.len() > v.len() + 2)
                {
                    continue;
                }
                counter += 1;

                let number = i
                    .checked_sub(1)
                    .map(|p| page.lines[p].as_str())
                    .filter(|prev| self.bare_number.is_match(prev))
                    .and_then(|prev| prev.parse().ok())
                    .filter(|n| *n <= MAX_STEP_NUMBER)
                    .unwrap_or(counter);

                candidates.push(StepCandidate {
                    number,
                    description: Some(line.clone()),
                    page: page.number,
                    method: DetectionMethod::ActionVerb,
                    confidence: 0.7,
                });
            }
        }

        candidates
    }

    /// Strategy 3: inline `N. description` / `N) description` spans.
    fn scan_layout_spans(&self, doc: &Document) -> Vec<StepCandidate> {
        let mut candidates = Vec::new();

        for page in &doc.pages {
            for line in &page.lines {
                let Some(caps) = self.inline_span.captures(line) else {
                    continue;
                };
                let number: u32 = match caps[1].parse() {
                    Ok(n) => n,
                    Err(_) => continue,
                };
                let description = caps[2].trim().to_string();
                if number == 0 || number > MAX_STEP_NUMBER {
                    continue;
                }
                if !self.is_valid_description(&description) {
                    continue;
                }

                candidates.push(StepCandidate {
                    number,
                    description: Some(description),
                    page: page.number,
                    method: DetectionMethod::LayoutSpan,
                    confidence: 0.8,
                });
            }
        }

        candidates
    }

    /// Look ahead from a marker line for the first usable description.
    ///
    /// A "Navigate to" line immediately followed by a URL joins into a
    /// single description.
    fn find_description(&self, lines: &[String], marker_idx: usize) -> Option<String> {
        let end = (marker_idx + 1 + DESCRIPTION_WINDOW).min(lines.len());
        for j in marker_idx + 1..end {
            let line = lines[j].as_str();
            if !self.is_valid_description(line) {
                continue;
            }
            if line == "Navigate to" {
                if let Some(url) = lines.get(j + 1).filter(|u| u.starts_with("http")) {
                    return Some(format!("Navigate to {}", url));
                }
            }
            return Some(line.to_string());
        }
        None
    }

    /// Whether a line can serve as a step description.
    fn is_valid_description(&self, text: &str) -> bool {
        if text.len() < MIN_DESCRIPTION_LEN {
            return false;
        }
        if text.starts_with(BOILERPLATE_PREFIX) {
            return false;
        }
        if self.bare_number.is_match(text) {
            return false;
        }
        // A lone URL is a target, not an instruction.
        if text.starts_with("http") && text.split_whitespace().count() == 1 {
            return false;
        }
        true
    }

    /// Pull the procedure title from the first page.
    fn extract_title(&self, doc: &Document) -> String {
        if let Some(first) = doc.pages.first() {
            for line in first.lines.iter().take(15) {
                if TITLE_KEYWORDS.iter().any(|k| line.contains(k))
                    && !line.contains(BOILERPLATE_PREFIX)
                {
                    return self.trailing_digits.replace(line.trim(), "").to_string();
                }
            }
        }
        "Procedure".to_string()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconcile candidates from all strategies into final steps.
///
/// The reducer is commutative over its input: higher confidence wins, ties
/// prefer the longer description, then the lexicographically smaller
/// description, then the lower page, then method precedence. No candidate
/// pair compares equal under this chain unless they are interchangeable.
pub fn merge_candidates(candidates: Vec<StepCandidate>, log: &mut ConversionLog) -> Vec<Step> {
    use std::collections::BTreeMap;

    let mut merged: BTreeMap<u32, StepCandidate> = BTreeMap::new();

    for candidate in candidates {
        let replace = match merged.get(&candidate.number) {
            Some(current) => beats(&candidate, current),
            None => true,
        };
        if replace {
            merged.insert(candidate.number, candidate);
        } else {
            log.info(format!(
                "Discarded lower-quality candidate for step {} (page {})",
                candidate.number, candidate.page
            ));
        }
    }

    merged
        .into_values()
        .map(|candidate| {
            let description = candidate.description.unwrap_or_default();
            let mut step = Step::new(
                candidate.number,
                description,
                candidate.page,
                candidate.confidence,
            );
            if step.description.is_empty() {
                step.warn("No description found");
            } else if step.description.len() < 5 {
                step.warn("Description seems too short");
            }
            step
        })
        .collect()
}

/// Strict "is strictly better" ordering between two candidates for the same
/// step number.
fn beats(a: &StepCandidate, b: &StepCandidate) -> bool {
    if a.confidence != b.confidence {
        return a.confidence > b.confidence;
    }
    let (da, db) = (
        a.description.as_deref().unwrap_or(""),
        b.description.as_deref().unwrap_or(""),
    );
    if da.len() != db.len() {
        return da.len() > db.len();
    }
    if da != db {
        return da < db;
    }
    if a.page != b.page {
        return a.page < b.page;
    }
    a.method.rank() > b.method.rank()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    fn doc_from_pages(pages: Vec<Vec<&str>>) -> Document {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, lines)| {
                Page::from_lines(i as u32 + 1, lines.into_iter().map(String::from).collect())
            })
            .collect();
        Document::new("test.pdf", pages)
    }

    #[test]
    fn test_two_steps_on_one_page() {
        // Scenario: marker lines immediately followed by their descriptions.
        let doc = doc_from_pages(vec![
            vec!["1", "Navigate to Admin Console", "2", "Click OK"],
            vec!["Made with ScribeTool"],
        ]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);

        assert_eq!(segments.steps.len(), 2);
        let s1 = &segments.steps[0];
        assert_eq!(s1.step_number, 1);
        assert_eq!(s1.description, "Navigate to Admin Console");
        assert_eq!(s1.confidence, 0.9);
        assert!(s1.warnings.is_empty());

        let s2 = &segments.steps[1];
        assert_eq!(s2.step_number, 2);
        assert_eq!(s2.description, "Click OK");
        assert_eq!(s2.confidence, 0.9);
        assert!(s2.warnings.is_empty());
    }

    #[test]
    fn test_marker_without_description_surfaces_warning() {
        // Scenario: only boilerplate follows the marker.
        let doc = doc_from_pages(vec![vec!["2", "Made with ScribeTool"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);

        assert_eq!(segments.steps.len(), 1);
        let step = &segments.steps[0];
        assert_eq!(step.step_number, 2);
        assert_eq!(step.description, "");
        assert_eq!(step.warnings, vec!["No description found".to_string()]);
    }

    #[test]
    fn test_page_numbers_are_not_steps() {
        // 21 exceeds the marker cap; nothing should be detected from it.
        let doc = doc_from_pages(vec![vec!["21", "Some body text on the page"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert!(segments.steps.is_empty());
    }

    #[test]
    fn test_navigate_url_join() {
        let doc = doc_from_pages(vec![vec![
            "1",
            "Navigate to",
            "https://console.example.com/login",
        ]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert_eq!(
            segments.steps[0].description,
            "Navigate to https://console.example.com/login"
        );
    }

    #[test]
    fn test_lone_url_is_not_a_description() {
        let doc = doc_from_pages(vec![vec!["1", "https://example.com/x"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert_eq!(segments.steps[0].description, "");
    }

    #[test]
    fn test_duplicate_marker_on_page_counted_once() {
        let doc = doc_from_pages(vec![vec!["3", "Open the menu", "3", "Close the menu"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert_eq!(segments.steps.len(), 1);
        assert_eq!(segments.steps[0].description, "Open the menu");
    }

    #[test]
    fn test_layout_span_detection() {
        let doc = doc_from_pages(vec![vec!["4. Select the export format"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert_eq!(segments.steps.len(), 1);
        assert_eq!(segments.steps[0].step_number, 4);
        assert_eq!(segments.steps[0].confidence, 0.8);
    }

    #[test]
    fn test_title_extraction_strips_trailing_digits() {
        let doc = doc_from_pages(vec![vec!["Setup Call Forwarding 1", "1", "Click Admin"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert_eq!(segments.title, "Setup Call Forwarding");
    }

    #[test]
    fn test_title_fallback() {
        let doc = doc_from_pages(vec![vec!["1", "Click the button"]]);
        let mut log = ConversionLog::new();
        let segments = Segmenter::new().extract(&doc, &mut log);
        assert_eq!(segments.title, "Procedure");
    }

    #[test]
    fn test_merge_is_order_independent() {
        let c1 = StepCandidate {
            number: 1,
            description: Some("Click the gear icon".into()),
            page: 1,
            method: DetectionMethod::ActionVerb,
            confidence: 0.7,
        };
        let c2 = StepCandidate {
            number: 1,
            description: Some("Navigate to the settings page".into()),
            page: 1,
            method: DetectionMethod::NumberPattern,
            confidence: 0.9,
        };
        let c3 = StepCandidate {
            number: 1,
            description: Some("1. Navigate to settings".into()),
            page: 1,
            method: DetectionMethod::LayoutSpan,
            confidence: 0.8,
        };

        let mut log = ConversionLog::new();
        let forward = merge_candidates(vec![c1.clone(), c2.clone(), c3.clone()], &mut log);
        let reverse = merge_candidates(vec![c3, c1, c2], &mut log);

        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].description, reverse[0].description);
        assert_eq!(forward[0].confidence, reverse[0].confidence);
        assert_eq!(forward[0].description, "Navigate to the settings page");
    }

    #[test]
    fn test_merge_tie_prefers_longer_description() {
        let short = StepCandidate {
            number: 2,
            description: Some("Click OK".into()),
            page: 1,
            method: DetectionMethod::NumberPattern,
            confidence: 0.9,
        };
        let long = StepCandidate {
            number: 2,
            description: Some("Click OK to confirm the dialog".into()),
            page: 2,
            method: DetectionMethod::NumberPattern,
            confidence: 0.9,
        };

        let mut log = ConversionLog::new();
        let merged = merge_candidates(vec![short, long], &mut log);
        assert_eq!(merged[0].description, "Click OK to confirm the dialog");
    }
}
