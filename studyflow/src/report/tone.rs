//! Strength / weakness classification of report headings

use std::fmt;

/// Keywords that mark a heading as describing strengths
const STRENGTH_KEYWORDS: &[&str] = &[
    "강점", "잘한", "우수", "정확", "완벽", "훌륭", "탁월", "뛰어난", "발전", "개선된", "향상",
];

/// Keywords that mark a heading as describing weaknesses
const WEAKNESS_KEYWORDS: &[&str] = &[
    "약점",
    "취약점",
    "부족",
    "미흡",
    "개선이 필요한",
    "보완",
    "어려움",
    "틀린",
    "실수",
    "부족한",
];

/// Visual tone of a section or subsection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionTone {
    /// Heading talks about what went well
    Strength,
    /// Heading talks about what needs work
    Weakness,
    /// No keyword matched
    #[default]
    Neutral,
}

impl SectionTone {
    /// CSS-friendly name of the tone
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Weakness => "weakness",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SectionTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a heading title by keyword
///
/// Case-insensitive substring match. Strength keywords are checked before
/// weakness keywords and the first hit wins.
pub fn classify_title(title: &str) -> SectionTone {
    let lower = title.to_lowercase();

    if STRENGTH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return SectionTone::Strength;
    }

    if WEAKNESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return SectionTone::Weakness;
    }

    SectionTone::Neutral
}
