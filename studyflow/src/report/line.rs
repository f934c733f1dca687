//! Line classification for report text
//!
//! Every line of a report is classified before the parser sees it. The
//! order of checks matters: dividers first, then headings, then list items,
//! then blank lines. Anything left over is plain text.

use regex::Regex;
use std::sync::OnceLock;

/// Classification of a single (trimmed) report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    /// A run of three or more `-` or `=` characters
    Divider,

    /// A heading with its resolved depth (1 or 2) and cleaned title
    Heading {
        /// 1 for `#` and `<n>.` headings, 2 for `##` and deeper
        depth: usize,
        /// Title with hash runs, bold markers and the `<n>.` prefix removed
        title: String,
    },

    /// A `*` or `-` bullet with the marker and bold markers removed
    ListItem(String),

    /// An empty or whitespace-only line
    Blank,

    /// Anything else, trimmed
    Text(String),
}

fn divider_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-=]{3,}$").expect("valid divider regex"))
}

fn hash_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#+)\s*(.+)$").expect("valid heading regex"))
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*(.+)$").expect("valid numbered regex"))
}

fn list_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[*-]\s+").expect("valid list marker regex"))
}

fn leading_hashes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#+\s*").expect("valid leading hash regex"))
}

fn stray_hashes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*#+\s*").expect("valid stray hash regex"))
}

/// Classify one line of report text
///
/// # Parameters
/// * `raw` - The line as it appears in the report (untrimmed)
///
/// # Returns
/// * `ReportLine` - The classification; never fails
pub fn classify_line(raw: &str) -> ReportLine {
    let trimmed = raw.trim();

    if divider_re().is_match(trimmed) {
        return ReportLine::Divider;
    }

    if let Some(heading) = classify_heading(trimmed) {
        return heading;
    }

    if list_marker_re().is_match(trimmed) {
        let item = list_marker_re().replace(trimmed, "");
        return ReportLine::ListItem(item.replace("**", "").trim().to_string());
    }

    if trimmed.is_empty() {
        return ReportLine::Blank;
    }

    ReportLine::Text(trimmed.to_string())
}

/// Detect `#`/`##` headings and bare `<n>.` headings
fn classify_heading(trimmed: &str) -> Option<ReportLine> {
    if let Some(caps) = hash_heading_re().captures(trimmed) {
        let depth = if caps[1].len() >= 2 { 2 } else { 1 };
        let mut title = clean_title(&caps[2]);

        // "# 2. Results" restates its own number
        if let Some(numbered) = numbered_re().captures(&title) {
            title = numbered[1].trim().to_string();
        }

        return Some(ReportLine::Heading {
            depth,
            title: strip_stray_hashes(&title),
        });
    }

    let caps = numbered_re().captures(trimmed)?;
    let title = clean_title(&caps[1]);
    Some(ReportLine::Heading {
        depth: 1,
        title: strip_stray_hashes(&title),
    })
}

/// Remove bold markers and any leading hash run
fn clean_title(text: &str) -> String {
    let without_bold = text.replace("**", "");
    leading_hashes_re()
        .replace(without_bold.trim(), "")
        .trim()
        .to_string()
}

/// Collapse hash runs left anywhere inside a malformed title
fn strip_stray_hashes(title: &str) -> String {
    stray_hashes_re().replace_all(title, " ").trim().to_string()
}
