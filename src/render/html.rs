//! Styled HTML page for one converted procedure.
//!
//! Consumes the finished record only; image `path` values are emitted as-is
//! and must stay resolvable relative to where the page is written.

use crate::model::{ConversionRecord, Step};

use super::escape;

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            margin: 0;
            padding: 20px;
        }
        .container {
            max-width: 900px;
            margin: 0 auto;
            background: white;
            border-radius: 15px;
            overflow: hidden;
            box-shadow: 0 10px 40px rgba(0,0,0,0.2);
        }
        .header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
        }
        h1 { margin: 0 0 10px 0; }
        .step-count { opacity: 0.9; }
        .steps-container { padding: 30px; }
        .step {
            padding: 20px;
            margin-bottom: 20px;
            background: #f8f9fa;
            border-radius: 10px;
            border-left: 4px solid #667eea;
        }
        .step-number {
            display: inline-block;
            background: #667eea;
            color: white;
            width: 32px;
            height: 32px;
            line-height: 32px;
            text-align: center;
            border-radius: 50%;
            font-weight: bold;
            margin-bottom: 10px;
        }
        .step-description { font-size: 1.05em; color: #333; }
        .step-warning { color: #b8860b; font-size: 0.85em; margin-top: 5px; }
        .step-images { margin-top: 15px; }
        .step-image {
            max-width: 100%;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.15);
            margin-bottom: 10px;
        }
"#;

/// Render the record as a complete HTML document.
pub fn render_record(record: &ConversionRecord) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("    <meta charset=\"UTF-8\">\n");
    out.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str(&format!("    <title>{}</title>\n", escape(&record.title)));
    out.push_str("    <style>");
    out.push_str(STYLE);
    out.push_str("    </style>\n</head>\n<body>\n");
    out.push_str("    <div class=\"container\">\n");
    out.push_str("        <div class=\"header\">\n");
    out.push_str(&format!("            <h1>{}</h1>\n", escape(&record.title)));
    out.push_str(&format!(
        "            <div class=\"step-count\">Total Steps: {}</div>\n",
        record.total_steps
    ));
    out.push_str("        </div>\n");
    out.push_str("        <div class=\"steps-container\">\n");

    for step in &record.steps {
        push_step(&mut out, step);
    }

    out.push_str("        </div>\n    </div>\n</body>\n</html>\n");
    out
}

fn push_step(out: &mut String, step: &Step) {
    out.push_str("            <div class=\"step\">\n");
    out.push_str(&format!(
        "                <div class=\"step-number\">{}</div>\n",
        step.step_number
    ));
    out.push_str(&format!(
        "                <div class=\"step-description\">{}</div>\n",
        escape(&step.description)
    ));
    for warning in &step.warnings {
        out.push_str(&format!(
            "                <div class=\"step-warning\">&#9888; {}</div>\n",
            escape(warning)
        ));
    }
    if !step.images.is_empty() {
        out.push_str("                <div class=\"step-images\">\n");
        for image in &step.images {
            out.push_str(&format!(
                "                    <img src=\"{}\" alt=\"Step {}\" class=\"step-image\">\n",
                escape(&image.path),
                step.step_number
            ));
        }
        out.push_str("                </div>\n");
    }
    out.push_str("            </div>\n");
}
