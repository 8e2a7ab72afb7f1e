//! Batch conversion dashboard.
//!
//! One card per processed document, including failed ones; a failed
//! document never halts a batch, it just shows up red here.

use super::escape;

/// Summary of one document in a batch run.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Source document path.
    pub source: String,
    /// Extracted title, or a failure marker.
    pub title: String,
    /// Output base name.
    pub output_name: String,
    /// Steps extracted (0 on failure).
    pub total_steps: usize,
    /// Images assigned across all steps.
    pub total_images: usize,
    /// Step-level warnings.
    pub warnings: usize,
    /// Mean step confidence.
    pub average_confidence: f64,
    /// False when the conversion failed outright.
    pub succeeded: bool,
}

impl BatchEntry {
    /// Placeholder entry for a document whose conversion failed.
    pub fn failed(source: impl Into<String>, output_name: impl Into<String>) -> Self {
        let source = source.into();
        let stem = std::path::Path::new(&source)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| source.clone());
        Self {
            title: format!("Failed: {}", stem),
            source,
            output_name: output_name.into(),
            total_steps: 0,
            total_images: 0,
            warnings: 0,
            average_confidence: 0.0,
            succeeded: false,
        }
    }
}

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            margin: 0;
            padding: 20px;
        }
        .container { max-width: 1200px; margin: 0 auto; }
        .header {
            background: white;
            border-radius: 15px;
            padding: 30px;
            margin-bottom: 30px;
            box-shadow: 0 10px 40px rgba(0,0,0,0.2);
        }
        h1 { margin: 0 0 10px 0; color: #333; }
        .summary { display: flex; gap: 20px; margin-top: 20px; }
        .stat-card {
            flex: 1;
            background: #f8f9fa;
            padding: 20px;
            border-radius: 10px;
            text-align: center;
        }
        .stat-value { font-size: 2em; font-weight: bold; color: #667eea; }
        .stat-label { color: #666; margin-top: 5px; }
        .grid {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(320px, 1fr));
            gap: 20px;
        }
        .card {
            background: white;
            border-radius: 15px;
            overflow: hidden;
            box-shadow: 0 5px 20px rgba(0,0,0,0.15);
        }
        .card-header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 20px;
        }
        .card-header.failed { background: #dc3545; }
        .card-title { font-weight: bold; }
        .card-source { opacity: 0.9; font-size: 0.85em; }
        .card-body { padding: 20px; color: #333; }
        .card-body div { margin-bottom: 5px; }
        .links a { color: #667eea; text-decoration: none; margin-right: 10px; }
"#;

/// Render the dashboard for a batch run.
pub fn render_dashboard(entries: &[BatchEntry]) -> String {
    let successful = entries.iter().filter(|e| e.succeeded).count();
    let failed = entries.len() - successful;
    let total_steps: usize = entries.iter().map(|e| e.total_steps).sum();

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("    <meta charset=\"UTF-8\">\n");
    out.push_str("    <title>Batch Conversion Dashboard</title>\n");
    out.push_str("    <style>");
    out.push_str(STYLE);
    out.push_str("    </style>\n</head>\n<body>\n");
    out.push_str("    <div class=\"container\">\n        <div class=\"header\">\n");
    out.push_str("            <h1>Batch Conversion Dashboard</h1>\n");
    out.push_str("            <div class=\"summary\">\n");
    for (value, label) in [
        (entries.len(), "Documents"),
        (successful, "Successful"),
        (failed, "Failed"),
        (total_steps, "Total steps"),
    ] {
        out.push_str(&format!(
            "                <div class=\"stat-card\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">{}</div></div>\n",
            value, label
        ));
    }
    out.push_str("            </div>\n        </div>\n        <div class=\"grid\">\n");

    for entry in entries {
        push_card(&mut out, entry);
    }

    out.push_str("        </div>\n    </div>\n</body>\n</html>\n");
    out
}

fn push_card(out: &mut String, entry: &BatchEntry) {
    let header_class = if entry.succeeded {
        "card-header"
    } else {
        "card-header failed"
    };
    out.push_str("            <div class=\"card\">\n");
    out.push_str(&format!(
        "                <div class=\"{}\">\n                    <div class=\"card-title\">{}</div>\n                    <div class=\"card-source\">{}</div>\n                </div>\n",
        header_class,
        escape(&entry.title),
        escape(&entry.source)
    ));
    out.push_str("                <div class=\"card-body\">\n");
    if entry.succeeded {
        out.push_str(&format!(
            "                    <div>Steps: {}</div>\n                    <div>Images: {}</div>\n                    <div>Warnings: {}</div>\n                    <div>Avg confidence: {:.2}</div>\n",
            entry.total_steps, entry.total_images, entry.warnings, entry.average_confidence
        ));
        out.push_str(&format!(
            "                    <div class=\"links\"><a href=\"{0}.html\">View</a><a href=\"{0}.json\">JSON</a><a href=\"{0}_report.txt\">Report</a></div>\n",
            escape(&entry.output_name)
        ));
    } else {
        out.push_str("                    <div>Conversion failed; see the run log.</div>\n");
    }
    out.push_str("                </div>\n            </div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_counts_and_cards() {
        let entries = vec![
            BatchEntry {
                source: "guide.pdf".into(),
                title: "Setup Forwarding".into(),
                output_name: "out_guide".into(),
                total_steps: 5,
                total_images: 4,
                warnings: 1,
                average_confidence: 0.88,
                succeeded: true,
            },
            BatchEntry::failed("broken.pdf", "out_broken"),
        ];

        let html = render_dashboard(&entries);
        assert!(html.contains("Setup Forwarding"));
        assert!(html.contains("Failed: broken"));
        assert!(html.contains("card-header failed"));
        assert!(html.contains("out_guide.json"));
    }

    #[test]
    fn test_failed_entry_placeholder() {
        let entry = BatchEntry::failed("dir/broken.pdf", "out");
        assert!(!entry.succeeded);
        assert_eq!(entry.title, "Failed: broken");
        assert_eq!(entry.total_steps, 0);
    }
}
