//! Line-driven report parser
//!
//! The parser is an explicit accumulator folded over the report lines. Its
//! cursor is always in one of three states: no section open, a section open,
//! or a subsection open inside a section. A pending list buffer sits beside
//! the cursor and is flushed into whichever container is active whenever a
//! blank line, a heading, a plain text line or the end of input is reached.

use super::line::{classify_line, ReportLine};
use super::outline::{ReportOutline, ReportSection, ReportSubsection};
use super::tone::{classify_title, SectionTone};

/// Where new content currently lands
#[derive(Debug, Default)]
enum Cursor {
    /// Nothing has been opened yet (or the last section was just closed)
    #[default]
    NoSection,
    /// Content goes straight into the section
    InSection(ReportSection),
    /// Content goes into the subsection; the section is its parent
    InSubsection(ReportSection, ReportSubsection),
}

/// Parser state for converting report text into an outline
#[derive(Debug, Default)]
pub struct ReportParser {
    /// Currently open container(s)
    cursor: Cursor,

    /// List items waiting to be grouped
    pending_list: Vec<String>,

    /// Completed, non-empty sections
    sections: Vec<ReportSection>,
}

impl ReportParser {
    /// Create a new parser
    ///
    /// # Returns
    /// * `ReportParser` - A new parser with no open section
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole report into an outline
    ///
    /// Never fails: malformed input degrades into best-effort grouping.
    ///
    /// # Parameters
    /// * `text` - Raw report text, newline delimited
    ///
    /// # Returns
    /// * `ReportOutline` - Numbered sections in source order
    pub fn parse(text: &str) -> ReportOutline {
        let mut parser = Self::new();
        for line in text.lines() {
            parser.feed(classify_line(line));
        }
        parser.finish()
    }

    /// Apply one classified line
    pub fn feed(&mut self, line: ReportLine) {
        match line {
            ReportLine::Divider => {}
            ReportLine::Heading { depth: 1, title } => self.open_section(title),
            ReportLine::Heading { title, .. } => self.open_subsection(title),
            ReportLine::ListItem(item) => {
                if !item.is_empty() {
                    self.pending_list.push(item);
                }
            }
            ReportLine::Blank => self.flush_list(),
            ReportLine::Text(text) => self.push_text(text),
        }
    }

    /// Flush everything still open and number the result
    pub fn finish(mut self) -> ReportOutline {
        self.close_section();

        let mut outline = ReportOutline {
            sections: self.sections,
        };
        outline.assign_numbers();
        outline
    }

    /// Level-1 heading: close whatever is open, then start a new section
    fn open_section(&mut self, title: String) {
        self.close_section();

        let tone = classify_title(&title);
        let title = if title.is_empty() { None } else { Some(title) };
        self.cursor = Cursor::InSection(ReportSection::new(title, tone));
    }

    /// Level-2 heading: replace the open subsection with a new one
    fn open_subsection(&mut self, title: String) {
        self.flush_list();
        self.close_subsection();

        let section = match std::mem::take(&mut self.cursor) {
            Cursor::InSection(section) => section,
            // A subsection before any section gets a title-less parent
            _ => ReportSection::new(None, SectionTone::Neutral),
        };
        let tone = classify_title(&title);
        self.cursor = Cursor::InSubsection(section, ReportSubsection::new(title, tone));
    }

    /// Plain text: flush the pending list, then append a paragraph
    fn push_text(&mut self, text: String) {
        self.flush_list();

        match &mut self.cursor {
            Cursor::InSubsection(_, subsection) => subsection.content.push(text),
            Cursor::InSection(section) => section.content.push(text),
            Cursor::NoSection => {
                let mut section = ReportSection::new(None, SectionTone::Neutral);
                section.content.push(text);
                self.cursor = Cursor::InSection(section);
            }
        }
    }

    /// Move the pending list, as one group, into the active container
    fn flush_list(&mut self) {
        if self.pending_list.is_empty() {
            return;
        }
        let group = std::mem::take(&mut self.pending_list);

        match &mut self.cursor {
            Cursor::InSubsection(_, subsection) => subsection.list_groups.push(group),
            Cursor::InSection(section) => section.list_groups.push(group),
            Cursor::NoSection => {
                let mut section = ReportSection::new(None, SectionTone::Neutral);
                section.list_groups.push(group);
                self.cursor = Cursor::InSection(section);
            }
        }
    }

    /// Store the open subsection onto its parent section
    fn close_subsection(&mut self) {
        self.flush_list();

        self.cursor = match std::mem::take(&mut self.cursor) {
            Cursor::InSubsection(mut section, subsection) => {
                section.subsections.push(subsection);
                Cursor::InSection(section)
            }
            other => other,
        };
    }

    /// Store the open section into the output if it holds anything
    fn close_section(&mut self) {
        self.close_subsection();

        if let Cursor::InSection(section) = std::mem::take(&mut self.cursor) {
            if !section.is_empty() {
                self.sections.push(section);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_plain_text_only() {
        // Arrange: no headings, no list markers, some blank lines
        let report = "첫 줄\n\n둘째 줄\n   \n셋째 줄";

        // Act
        let outline = ReportParser::parse(report);

        // Assert: exactly one title-less section holding the non-blank lines
        assert_eq!(outline.sections.len(), 1);
        let section = &outline.sections[0];
        assert_eq!(section.title, None);
        assert_eq!(section.number, None);
        assert_eq!(section.content, strings(&["첫 줄", "둘째 줄", "셋째 줄"]));
        assert!(section.list_groups.is_empty());
        assert!(section.subsections.is_empty());
    }

    #[test]
    fn test_parse_dividers_only() {
        let outline = ReportParser::parse("---\n=====\n----------");
        assert!(outline.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(ReportParser::parse("").is_empty());
        assert!(ReportParser::parse("\n\n  \n").is_empty());
    }

    #[test]
    fn test_subsection_before_any_section() {
        // Arrange: depth-2 heading first
        let report = "## 세부 내용\n설명";

        // Act
        let outline = ReportParser::parse(report);

        // Assert: a title-less parent is synthesised
        assert_eq!(outline.sections.len(), 1);
        let section = &outline.sections[0];
        assert_eq!(section.title, None);
        assert_eq!(section.number, None);
        assert_eq!(section.subsections.len(), 1);
        assert_eq!(section.subsections[0].title, "세부 내용");
        assert_eq!(section.subsections[0].content, strings(&["설명"]));
    }

    #[test]
    fn test_blank_line_splits_list_groups() {
        // Arrange: same marker style on both sides of a blank line
        let report = "# 목록\n* a\n* b\n\n* c";

        // Act
        let outline = ReportParser::parse(report);

        // Assert
        assert_eq!(outline.sections.len(), 1);
        assert_eq!(
            outline.sections[0].list_groups,
            vec![strings(&["a", "b"]), strings(&["c"])]
        );
    }

    #[test]
    fn test_text_line_flushes_pending_list() {
        let outline = ReportParser::parse("# T\n- a\n- b\n문단\n- c");
        let section = &outline.sections[0];
        assert_eq!(section.list_groups, vec![strings(&["a", "b"]), strings(&["c"])]);
        assert_eq!(section.content, strings(&["문단"]));
    }

    #[test]
    fn test_numbering_skips_untitled_section() {
        // Arrange: greeting, then two titled sections
        let report = "안녕하세요\n# 첫째\n내용\n# 둘째\n내용";

        // Act
        let outline = ReportParser::parse(report);

        // Assert
        assert_eq!(outline.sections.len(), 3);
        assert_eq!(outline.sections[0].number, None);
        assert_eq!(outline.sections[1].number, Some(1));
        assert_eq!(outline.sections[2].number, Some(2));
        assert_eq!(
            outline.sections[2].display_title().as_deref(),
            Some("2. 둘째")
        );
    }

    #[test]
    fn test_full_example_report() {
        // Arrange
        let report = "환영합니다\n# 1. 강점\n* 정확한 풀이\n* 빠른 속도\n\n## (1) 세부 강점\n설명입니다";

        // Act
        let outline = ReportParser::parse(report);

        // Assert: greeting section
        assert_eq!(outline.sections.len(), 2);
        let greeting = &outline.sections[0];
        assert_eq!(greeting.title, None);
        assert_eq!(greeting.content, strings(&["환영합니다"]));

        // Assert: titled strength section with one list group and a subsection
        let strengths = &outline.sections[1];
        assert_eq!(strengths.title.as_deref(), Some("강점"));
        assert_eq!(strengths.tone, SectionTone::Strength);
        assert_eq!(strengths.number, Some(1));
        assert_eq!(
            strengths.list_groups,
            vec![strings(&["정확한 풀이", "빠른 속도"])]
        );
        assert_eq!(strengths.subsections.len(), 1);

        let sub = &strengths.subsections[0];
        assert_eq!(sub.title, "(1) 세부 강점");
        assert_eq!(sub.content, strings(&["설명입니다"]));
        assert_eq!(sub.badge(), Some(1));
        // "강점" is a strength keyword, so the keyword scan marks it
        assert_eq!(sub.tone, SectionTone::Strength);
    }

    #[test]
    fn test_pending_list_goes_to_section_before_new_subsection() {
        // Arrange: list items directly followed by a depth-2 heading
        let report = "# 분석\n* 항목\n## 하위\n본문";

        // Act
        let outline = ReportParser::parse(report);

        // Assert: the list belongs to the section, not the new subsection
        let section = &outline.sections[0];
        assert_eq!(section.list_groups, vec![strings(&["항목"])]);
        assert!(section.subsections[0].list_groups.is_empty());
        assert_eq!(section.subsections[0].content, strings(&["본문"]));
    }

    #[test]
    fn test_new_section_closes_open_subsection() {
        let report = "# A\n## a1\n* x\n# B\n내용";
        let outline = ReportParser::parse(report);

        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[0].subsections.len(), 1);
        assert_eq!(
            outline.sections[0].subsections[0].list_groups,
            vec![strings(&["x"])]
        );
        assert_eq!(outline.sections[1].content, strings(&["내용"]));
        assert!(outline.sections[1].subsections.is_empty());
    }

    #[test]
    fn test_subsections_keep_source_order() {
        let report = "# 분석\n## (1) 첫째\n## (2) 둘째\n## (3) 취약점";
        let outline = ReportParser::parse(report);

        let titles: Vec<&str> = outline.sections[0]
            .subsections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["(1) 첫째", "(2) 둘째", "(3) 취약점"]);
        assert_eq!(outline.sections[0].subsections[2].tone, SectionTone::Weakness);
    }

    #[test]
    fn test_leading_list_is_not_lost() {
        let outline = ReportParser::parse("* a\n* b\n# 제목");
        assert_eq!(outline.sections.len(), 2);
        assert_eq!(outline.sections[0].title, None);
        assert_eq!(outline.sections[0].list_groups, vec![strings(&["a", "b"])]);
        assert_eq!(outline.sections[1].number, Some(1));
    }

    #[test]
    fn test_divider_does_not_become_list_item() {
        let outline = ReportParser::parse("# A\n- a\n---\n- b");
        assert_eq!(outline.sections[0].list_groups, vec![strings(&["a", "b"])]);
    }

    #[test]
    fn test_titled_section_without_content_is_kept() {
        let outline = ReportParser::parse("# 제목만");
        assert_eq!(outline.sections.len(), 1);
        assert_eq!(outline.sections[0].number, Some(1));
    }

    #[test]
    fn test_empty_heading_title_is_untitled() {
        // "##" is a depth-1 heading whose title is only a hash run
        let outline = ReportParser::parse("##\n본문");
        assert_eq!(outline.sections.len(), 1);
        assert_eq!(outline.sections[0].title, None);
        assert_eq!(outline.sections[0].number, None);
    }

    #[test]
    fn test_section_tone_is_computed() {
        let outline = ReportParser::parse("# 약점 분석\n내용");
        assert_eq!(outline.sections[0].tone, SectionTone::Weakness);
    }
}
