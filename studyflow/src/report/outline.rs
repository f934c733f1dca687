//! Outline produced by the report parser

use super::tone::SectionTone;
use regex::Regex;
use std::sync::OnceLock;

/// A parsed report: sections in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOutline {
    /// Retained sections; empty artifacts are never present
    pub sections: Vec<ReportSection>,
}

/// A level-1 section of a report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSection {
    /// Heading title; `None` for leading prose before the first heading
    pub title: Option<String>,

    /// Keyword classification of the title
    ///
    /// Top-level sections always render neutral; this is kept so callers
    /// can inspect it, not to colour the section.
    pub tone: SectionTone,

    /// Paragraphs in source order
    pub content: Vec<String>,

    /// Groups of consecutive list items in source order
    pub list_groups: Vec<Vec<String>>,

    /// Level-2 subsections in source order
    pub subsections: Vec<ReportSubsection>,

    /// Badge number, assigned after parsing to titled sections only
    pub number: Option<u32>,
}

/// A level-2 subsection nested inside a section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSubsection {
    /// Heading title
    pub title: String,

    /// Keyword classification that drives the subsection colour
    pub tone: SectionTone,

    /// Paragraphs in source order
    pub content: Vec<String>,

    /// Groups of consecutive list items in source order
    pub list_groups: Vec<Vec<String>>,
}

fn numbered_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").expect("valid numbered title regex"))
}

fn subsection_badge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\((\d+)\)").expect("valid badge regex"))
}

impl ReportOutline {
    /// Number of sections that carry a badge number
    pub fn numbered_count(&self) -> usize {
        self.sections.iter().filter(|s| s.number.is_some()).count()
    }

    /// Whether the report produced nothing to render
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Assign badge numbers to titled sections in output order
    pub(crate) fn assign_numbers(&mut self) {
        let mut next = 0;
        for section in &mut self.sections {
            section.number = match section.title {
                Some(_) => {
                    next += 1;
                    Some(next)
                }
                None => None,
            };
        }
    }
}

impl ReportSection {
    /// Create an empty section with the given title
    pub fn new(title: Option<String>, tone: SectionTone) -> Self {
        Self {
            title,
            tone,
            ..Self::default()
        }
    }

    /// True when nothing at all was collected into this section
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_empty()
            && self.list_groups.is_empty()
            && self.subsections.is_empty()
    }

    /// Title as shown to the user
    ///
    /// The badge number is prepended unless the title already starts with
    /// its own `<n>. ` prefix.
    pub fn display_title(&self) -> Option<String> {
        let title = self.title.as_deref()?;
        if numbered_title_re().is_match(title) {
            return Some(title.to_string());
        }
        Some(match self.number {
            Some(n) => format!("{}. {}", n, title),
            None => title.to_string(),
        })
    }
}

impl ReportSubsection {
    /// Create an empty subsection with the given title
    pub fn new(title: String, tone: SectionTone) -> Self {
        Self {
            title,
            tone,
            content: Vec::new(),
            list_groups: Vec::new(),
        }
    }

    /// The `n` of a leading `(n)` in the title, used as the subsection badge
    pub fn badge(&self) -> Option<u32> {
        subsection_badge_re()
            .captures(&self.title)
            .and_then(|caps| caps[1].parse().ok())
    }
}
