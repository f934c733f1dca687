//! HTML exporter for quiz reports
//!
//! This module renders a ReportOutline to a single HTML page with:
//! - Numbered badges for titled sections (top-level sections stay neutral)
//! - Tone-coloured subsections (strength, weakness, neutral)
//! - Bold runs rendered as `<strong>`

use crate::report::{parse_inline, ReportMeta, ReportOutline, ReportSection, ReportSubsection, TextRun};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during HTML export
#[derive(Error, Debug)]
pub enum HtmlExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Export a report outline to an HTML file
///
/// # Parameters
/// * `outline` - The parsed report
/// * `meta` - Title and score shown above the report
/// * `output_path` - Path where the HTML file will be written
///
/// # Returns
/// * `Ok(())` - Successfully exported to HTML
/// * `Err(HtmlExportError)` - Error during export
pub fn to_html(
    outline: &ReportOutline,
    meta: &ReportMeta,
    output_path: &Path,
) -> Result<(), HtmlExportError> {
    let output = render_html(outline, meta);

    // Create parent directories if they don't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(output_path)?;
    file.write_all(output.as_bytes())?;

    log::info!("Wrote HTML report to {}", output_path.display());
    Ok(())
}

/// Render a report outline to an HTML string
pub fn render_html(outline: &ReportOutline, meta: &ReportMeta) -> String {
    let mut output = String::new();

    write_html_header(&mut output, &meta.title);

    output.push_str("<body>\n");
    output.push_str("<div class=\"container\">\n");

    if !meta.title.is_empty() {
        output.push_str(&format!(
            "<h1 class=\"report-title\">{}</h1>\n",
            escape_html(&meta.title)
        ));
    }

    write_score(&mut output, meta);

    for (index, section) in outline.sections.iter().enumerate() {
        // Separator before every titled section except the very first one
        if index > 0 && section.number.is_some() {
            output.push_str("<div class=\"section-separator\"><span>&#9679;</span></div>\n");
        }
        write_section(&mut output, section);
    }

    output.push_str("</div>\n");
    output.push_str("</body>\n");
    output.push_str("</html>\n");

    output
}

/// Write HTML header with CSS styling
fn write_html_header(output: &mut String, title: &str) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"ko\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    output.push_str("<style>\n");
    output.push_str(CSS_STYLES);
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

/// Write the score banner if the report belongs to a graded quiz
fn write_score(output: &mut String, meta: &ReportMeta) {
    let Some((score, total)) = meta.score else {
        return;
    };

    output.push_str("<div class=\"score\">\n");
    output.push_str(&format!(
        "<span class=\"score-value\">{} / {}</span>\n",
        score, total
    ));
    if let Some(percent) = meta.percentage() {
        output.push_str(&format!("<span class=\"score-percent\">{}%</span>\n", percent));
    }
    if let Some(ref created) = meta.created_at {
        output.push_str(&format!(
            "<span class=\"score-date\">{}</span>\n",
            escape_html(created)
        ));
    }
    output.push_str("</div>\n");
}

/// Write a single top-level section
fn write_section(output: &mut String, section: &ReportSection) {
    let class = if section.number.is_some() {
        "section numbered neutral"
    } else {
        "section"
    };
    output.push_str(&format!("<section class=\"{}\">\n", class));

    if let Some(number) = section.number {
        output.push_str(&format!("<div class=\"badge\">{}</div>\n", number));
    }

    if let Some(title) = section.display_title() {
        output.push_str(&format!(
            "<h3 class=\"section-title\">{}</h3>\n",
            escape_html(&title)
        ));
    }

    write_paragraphs(output, &section.content);
    write_list_groups(output, &section.list_groups);

    if !section.subsections.is_empty() {
        output.push_str("<div class=\"subsections\">\n");
        for subsection in &section.subsections {
            write_subsection(output, subsection);
        }
        output.push_str("</div>\n");
    }

    output.push_str("</section>\n");
}

/// Write a subsection coloured by its tone
fn write_subsection(output: &mut String, subsection: &ReportSubsection) {
    output.push_str(&format!(
        "<div class=\"subsection {}\">\n",
        subsection.tone.as_str()
    ));

    if let Some(badge) = subsection.badge() {
        output.push_str(&format!("<div class=\"badge\">{}</div>\n", badge));
    }

    output.push_str(&format!(
        "<h4 class=\"subsection-title\">{}</h4>\n",
        escape_html(&subsection.title)
    ));

    write_paragraphs(output, &subsection.content);
    write_list_groups(output, &subsection.list_groups);

    output.push_str("</div>\n");
}

fn write_paragraphs(output: &mut String, paragraphs: &[String]) {
    for paragraph in paragraphs {
        if paragraph.trim().is_empty() {
            continue;
        }
        output.push_str(&format!(
            "<p>{}</p>\n",
            runs_to_html(&parse_inline(paragraph.trim()))
        ));
    }
}

fn write_list_groups(output: &mut String, groups: &[Vec<String>]) {
    for group in groups.iter().filter(|g| !g.is_empty()) {
        output.push_str("<ul>\n");
        for item in group {
            output.push_str(&format!("<li>{}</li>\n", runs_to_html(&parse_inline(item))));
        }
        output.push_str("</ul>\n");
    }
}

/// Convert text runs to HTML string with formatting
fn runs_to_html(runs: &[TextRun]) -> String {
    let mut result = String::new();

    for run in runs {
        let text = escape_html(&run.text);
        if run.bold {
            result.push_str(&format!("<strong>{}</strong>", text));
        } else {
            result.push_str(&text);
        }
    }

    result
}

/// Escape HTML special characters
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Report page styles
const CSS_STYLES: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto',
                 'Apple SD Gothic Neo', 'Noto Sans KR', sans-serif;
    line-height: 1.6;
    color: #374151;
    background-color: #f5f5f5;
    padding: 20px;
}

.container {
    max-width: 900px;
    margin: 0 auto;
    background: white;
    padding: 40px 60px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    border-radius: 8px;
}

.report-title {
    font-size: 2em;
    font-weight: 700;
    margin-bottom: 16px;
    color: #1f2937;
}

.score {
    display: flex;
    gap: 16px;
    align-items: baseline;
    margin-bottom: 32px;
}

.score-value {
    font-size: 1.5em;
    font-weight: 700;
}

.score-date {
    color: #9ca3af;
    font-size: 0.9em;
}

.section {
    position: relative;
    padding: 8px 0 8px 16px;
}

.section.numbered {
    padding-left: 32px;
    border-left: 4px solid #9ca3af;
}

.section-title {
    font-size: 1.25em;
    font-weight: 700;
    margin-bottom: 16px;
    color: #1f2937;
}

.section-separator {
    display: flex;
    align-items: center;
    margin: 32px 0;
    color: #9ca3af;
    font-size: 0.8em;
}

.section-separator::before,
.section-separator::after {
    content: "";
    flex: 1;
    border-top: 1px solid #d1d5db;
}

.section-separator span {
    margin: 0 16px;
}

.badge {
    position: absolute;
    left: -20px;
    top: 8px;
    width: 40px;
    height: 40px;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    font-weight: 700;
    color: white;
    background-color: #9ca3af;
    border: 2px solid #6b7280;
}

p {
    margin-bottom: 12px;
}

ul {
    margin: 0 0 16px 24px;
}

li {
    margin-bottom: 8px;
}

strong {
    color: #111827;
}

.subsections {
    margin-top: 24px;
}

.subsection {
    position: relative;
    margin: 0 0 24px 24px;
    padding: 16px 16px 16px 40px;
    border-left: 4px solid #9ca3af;
    border-radius: 0 8px 8px 0;
    box-shadow: 0 1px 2px rgba(0, 0, 0, 0.05);
}

.subsection .badge {
    left: -24px;
    top: 16px;
}

.subsection-title {
    font-size: 1.1em;
    font-weight: 600;
    margin-bottom: 16px;
    color: #1f2937;
}

.subsection.strength {
    border-left-color: #22c55e;
}

.subsection.strength .subsection-title {
    color: #15803d;
}

.subsection.strength .badge {
    background-color: #22c55e;
    border-color: #16a34a;
}

.subsection.weakness {
    border-left-color: #ef4444;
}

.subsection.weakness .subsection-title {
    color: #b91c1c;
}

.subsection.weakness .badge {
    background-color: #ef4444;
    border-color: #dc2626;
}
"#;
