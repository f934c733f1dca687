//! Structured view of AI-generated quiz reports
//!
//! Quiz reports arrive as loosely markdown-like prose. This module turns one
//! report string into a numbered outline of sections and subsections that
//! the exporters can render, without a general markdown parser.

// Submodules
mod line;
mod outline;
mod parser;
mod text_run;
mod tone;

// Re-export public types
pub use line::{classify_line, ReportLine};
pub use outline::{ReportOutline, ReportSection, ReportSubsection};
pub use parser::ReportParser;
pub use text_run::{parse_inline, TextRun};
pub use tone::{classify_title, SectionTone};

/// Parse a report string into its outline
///
/// Convenience wrapper around [`ReportParser::parse`].
pub fn parse_report(text: &str) -> ReportOutline {
    ReportParser::parse(text)
}

/// Header information shown above a rendered report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportMeta {
    /// Page title (quiz name or file name)
    pub title: String,

    /// Score and question count, when the report belongs to a graded quiz
    pub score: Option<(u32, u32)>,

    /// Creation timestamp as sent by the server
    pub created_at: Option<String>,
}

impl ReportMeta {
    /// Metadata with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Score as a rounded percentage
    pub fn percentage(&self) -> Option<u32> {
        let (score, total) = self.score?;
        if total == 0 {
            return None;
        }
        Some(((f64::from(score) / f64::from(total)) * 100.0).round() as u32)
    }
}
