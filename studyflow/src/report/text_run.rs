//! Inline formatting for report paragraphs and list items
//!
//! Only `**bold**` spans are recognised. Everything else, including stray or
//! unterminated markers, stays literal text.

use regex::Regex;
use std::sync::OnceLock;

/// A span of text with consistent formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Bold formatting
    pub bold: bool,
}

impl TextRun {
    /// Create a new plain text run
    pub fn new(text: String) -> Self {
        Self { text, bold: false }
    }

    /// Create a new bold text run
    pub fn bold(text: String) -> Self {
        Self { text, bold: true }
    }
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"))
}

/// Split a string into plain and bold runs
///
/// # Parameters
/// * `text` - One paragraph or list item
///
/// # Returns
/// * `Vec<TextRun>` - Runs in source order; a single plain run when no
///   bold span is present
pub fn parse_inline(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in bold_re().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.push(TextRun::new(text[last..whole.start()].to_string()));
        }
        runs.push(TextRun::bold(inner.as_str().to_string()));
        last = whole.end();
    }

    if last < text.len() {
        runs.push(TextRun::new(text[last..].to_string()));
    }

    if runs.is_empty() {
        runs.push(TextRun::new(text.to_string()));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_inline("그냥 문장"), vec![TextRun::new("그냥 문장".to_string())]);
    }

    #[test]
    fn test_bold_span_with_surrounding_text() {
        // Arrange
        let item = "앞 **굵은 글씨** 뒤";

        // Act
        let runs = parse_inline(item);

        // Assert: literal text preserved verbatim and in order
        assert_eq!(
            runs,
            vec![
                TextRun::new("앞 ".to_string()),
                TextRun::bold("굵은 글씨".to_string()),
                TextRun::new(" 뒤".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiple_bold_spans() {
        let runs = parse_inline("**a** and **b**");
        assert_eq!(
            runs,
            vec![
                TextRun::bold("a".to_string()),
                TextRun::new(" and ".to_string()),
                TextRun::bold("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_bold_stays_literal() {
        assert_eq!(
            parse_inline("**열린 채로 끝남"),
            vec![TextRun::new("**열린 채로 끝남".to_string())]
        );
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(parse_inline(""), vec![TextRun::new(String::new())]);
    }
}
