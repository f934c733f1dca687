//! Markdown exporter for quiz reports
//!
//! This module renders a ReportOutline back to clean markdown, which also
//! reads well in a terminal:
//! - Numbered `##` headings for titled sections
//! - `###` headings for subsections, tagged with their tone
//! - Bold runs re-emitted as `**bold**`

use crate::report::{parse_inline, ReportMeta, ReportOutline, ReportSection, SectionTone, TextRun};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during markdown export
#[derive(Error, Debug)]
pub enum MarkdownExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Export a report outline to a markdown file
///
/// # Parameters
/// * `outline` - The parsed report
/// * `meta` - Title and score written above the report
/// * `output_path` - Path where the markdown file will be written
///
/// # Returns
/// * `Ok(())` - Successfully exported to markdown
/// * `Err(MarkdownExportError)` - Error during export
pub fn to_markdown(
    outline: &ReportOutline,
    meta: &ReportMeta,
    output_path: &Path,
) -> Result<(), MarkdownExportError> {
    let output = render_markdown(outline, meta);

    let mut file = fs::File::create(output_path)?;
    file.write_all(output.as_bytes())?;

    log::info!("Wrote markdown report to {}", output_path.display());
    Ok(())
}

/// Render a report outline to a markdown string
pub fn render_markdown(outline: &ReportOutline, meta: &ReportMeta) -> String {
    let mut output = String::new();

    if !meta.title.is_empty() {
        output.push_str(&format!("# {}\n\n", meta.title));
    }

    if let Some((score, total)) = meta.score {
        match meta.percentage() {
            Some(percent) => {
                output.push_str(&format!("Score: {}/{} ({}%)\n\n", score, total, percent))
            }
            None => output.push_str(&format!("Score: {}/{}\n\n", score, total)),
        }
    }

    for section in &outline.sections {
        write_section(&mut output, section);
    }

    output
}

/// Write a single section to the output
fn write_section(output: &mut String, section: &ReportSection) {
    if let Some(title) = section.display_title() {
        output.push_str(&format!("## {}\n\n", title));
    }

    write_body(output, &section.content, &section.list_groups);

    for subsection in &section.subsections {
        let marker = match subsection.tone {
            SectionTone::Strength => " [+]",
            SectionTone::Weakness => " [-]",
            SectionTone::Neutral => "",
        };
        output.push_str(&format!("### {}{}\n\n", subsection.title, marker));
        write_body(output, &subsection.content, &subsection.list_groups);
    }
}

/// Write paragraphs, then list groups, separated by blank lines
fn write_body(output: &mut String, content: &[String], list_groups: &[Vec<String>]) {
    for paragraph in content {
        output.push_str(&runs_to_markdown(&parse_inline(paragraph)));
        output.push_str("\n\n");
    }

    for group in list_groups {
        for item in group {
            output.push_str(&format!("- {}\n", runs_to_markdown(&parse_inline(item))));
        }
        output.push('\n');
    }
}

/// Convert text runs to markdown string with formatting
fn runs_to_markdown(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|run| {
            if run.bold {
                format!("**{}**", run.text)
            } else {
                run.text.clone()
            }
        })
        .collect()
}
